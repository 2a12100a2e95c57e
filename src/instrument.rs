//! Instruments available at the observatory and their file-naming conventions.

use std::fmt;

use chrono::NaiveDate;
use strum::{EnumIter, EnumString, IntoStaticStr};

use crate::timewindow::CalendarStep;

/// Instruments with data in the archive.
#[derive(Clone, Copy, PartialEq, Eq, Debug, EnumString, IntoStaticStr, EnumIter, Hash)]
pub enum Instrument {
    /// The CORAL cloud radar (MBR in the data paths).
    #[strum(to_string = "coral", serialize = "CORAL", serialize = "Coral")]
    Coral,
    /// The KATRIN cloud radar.
    #[strum(to_string = "katrin", serialize = "KATRIN", serialize = "Katrin")]
    Katrin,
    /// The ceilometer, stored in monthly files.
    #[strum(
        to_string = "ceilometer",
        serialize = "CEILOMETER",
        serialize = "Ceilometer"
    )]
    Ceilometer,
    /// The downwelling radiation sensors.
    #[strum(
        to_string = "radiation",
        serialize = "RADIATION",
        serialize = "Radiation"
    )]
    Radiation,
    /// The surface weather station.
    #[strum(to_string = "weather", serialize = "WEATHER", serialize = "Weather")]
    Weather,
    /// The vertically staring wind lidar.
    #[strum(
        to_string = "windlidar",
        serialize = "WINDLIDAR",
        serialize = "Windlidar",
        serialize = "WindLidar"
    )]
    Windlidar,
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use Instrument::*;

        match *self {
            Coral => write!(f, "{}", stringify!(CORAL)),
            Katrin => write!(f, "{}", stringify!(KATRIN)),
            Ceilometer => write!(f, "{}", stringify!(Ceilometer)),
            Radiation => write!(f, "{}", stringify!(Radiation)),
            Weather => write!(f, "{}", stringify!(Weather)),
            Windlidar => write!(f, "{}", stringify!(WindLidar)),
        }
    }
}

impl Instrument {
    /// The default file-naming and path convention of this instrument.
    ///
    /// The returned configuration matches the directory layout used on the archive
    /// server and its FTP mirror. Override pieces of it (or the whole thing) through
    /// [`crate::Config::with_instrument`] when working with a copied subset of the
    /// archive.
    pub fn default_config(self) -> InstrumentConfig {
        match self {
            Instrument::Coral => InstrumentConfig {
                local_root: "/pool/OBS/BARBADOS_CLOUD_OBSERVATORY/Level_1/B_Reflectivity"
                    .to_string(),
                remote_root: "/B_Reflectivity".to_string(),
                name_scheme: "MMCR__MBR__Spectral_Moments__*__#.nc*".to_string(),
                date_format: "%y%m%d".to_string(),
                path_addition: None,
                data_version: Some("Version_2".to_string()),
                step: CalendarStep::Day,
            },
            Instrument::Katrin => InstrumentConfig {
                local_root: "/pool/OBS/BARBADOS_CLOUD_OBSERVATORY/Level_1/K_Reflectivity"
                    .to_string(),
                remote_root: "/K_Reflectivity".to_string(),
                name_scheme: "MMCR__KATRIN__Spectral_Moments__*__#.nc*".to_string(),
                date_format: "%y%m%d".to_string(),
                path_addition: None,
                data_version: Some("Version_2".to_string()),
                step: CalendarStep::Day,
            },
            Instrument::Ceilometer => InstrumentConfig {
                local_root: "/pool/OBS/BARBADOS_CLOUD_OBSERVATORY/Level_1/B_CloudHeight"
                    .to_string(),
                remote_root: "/B_CloudHeight".to_string(),
                name_scheme: "CEILO__*__#.nc*".to_string(),
                date_format: "%Y%m".to_string(),
                path_addition: None,
                data_version: None,
                step: CalendarStep::Month,
            },
            Instrument::Radiation => InstrumentConfig {
                local_root: "/pool/OBS/BARBADOS_CLOUD_OBSERVATORY/Level_1/B_Radiation"
                    .to_string(),
                remote_root: "/B_Radiation".to_string(),
                name_scheme: "Radiation__Deebles_Point__DownwellingRadiation__1s__#.nc.bz2"
                    .to_string(),
                date_format: "%Y%m%d".to_string(),
                path_addition: Some("%Y%m".to_string()),
                data_version: None,
                step: CalendarStep::Day,
            },
            Instrument::Weather => InstrumentConfig {
                local_root: "/pool/OBS/BARBADOS_CLOUD_OBSERVATORY/Level_1/B_Surface_Weather"
                    .to_string(),
                remote_root: "/B_Surface_Weather".to_string(),
                name_scheme: "Meteorology__Deebles_Point__2m__1s__#.nc.bz2".to_string(),
                date_format: "%Y%m%d".to_string(),
                path_addition: Some("%Y%m".to_string()),
                data_version: None,
                step: CalendarStep::Day,
            },
            Instrument::Windlidar => InstrumentConfig {
                local_root: "/pool/OBS/BARBADOS_CLOUD_OBSERVATORY/Level_1/B_VerticalVelocity"
                    .to_string(),
                remote_root: "/B_VerticalVelocity".to_string(),
                name_scheme: "WindLidar__Deebles_Point__VerticalVelocity__STARE__1s__#.nc*"
                    .to_string(),
                date_format: "%Y%m%d".to_string(),
                path_addition: None,
                data_version: None,
                step: CalendarStep::Day,
            },
        }
    }
}

/// The file-naming and path convention of one instrument.
///
/// This value object fully describes where one calendar unit of data lives: a storage
/// root (local and remote variants), an optional data-version subdirectory, an
/// optional nested-by-date subdirectory, and a filename scheme where `#` marks the
/// spot for the date string. The scheme may contain glob wildcards because filename
/// suffixes (version tags, processing revisions) vary while the date token is fixed.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct InstrumentConfig {
    /// Root directory of this instrument's files on the local filesystem.
    pub local_root: String,
    /// Root directory of this instrument's files on the FTP mirror.
    pub remote_root: String,
    /// Filename scheme with a `#` date-substitution token, may contain wildcards.
    pub name_scheme: String,
    /// strftime format for the date string substituted for `#`.
    pub date_format: String,
    /// Optional strftime pattern for a nested-by-date subdirectory, e.g. `%Y%m`.
    pub path_addition: Option<String>,
    /// Optional data-version subdirectory, e.g. `Version_2`.
    pub data_version: Option<String>,
    /// Whether this instrument stores one file per day or per month.
    pub step: CalendarStep,
}

impl InstrumentConfig {
    /// Select another data version, e.g. `3` for the beta reprocessing.
    pub fn with_data_version(mut self, version: u8) -> Self {
        self.data_version = Some(format!("Version_{}", version));
        self
    }

    /// Build the search pattern for the file of one calendar unit under `root`.
    pub fn file_pattern(&self, date: NaiveDate, root: &str) -> String {
        let mut pattern = root.trim_end_matches('/').to_string();

        if let Some(version) = &self.data_version {
            pattern.push('/');
            pattern.push_str(version.trim_matches('/'));
        }

        if let Some(addition) = &self.path_addition {
            pattern.push('/');
            pattern.push_str(&date.format(addition).to_string());
        }

        pattern.push('/');
        let date_str = date.format(&self.date_format).to_string();
        pattern.push_str(&self.name_scheme.replace('#', &date_str));

        pattern
    }
}

/*--------------------------------------------------------------------------------------------------
                                          Unit Tests
--------------------------------------------------------------------------------------------------*/
