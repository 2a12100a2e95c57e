//! Time-windowed assembly of records that span several files.

use chrono::NaiveDate;
use log::{debug, warn};

use super::{dataset::Dataset, remote::FtpSession, resolve, Archive};
use crate::{
    config::AccessMode,
    convert,
    errors::BcoDataErr,
    instrument::{Instrument, InstrumentConfig},
    timewindow::TimeWindow,
};

/// One contiguous, chronological array covering a time window, possibly drawn from
/// many files.
#[derive(Clone, PartialEq, Debug)]
pub struct Assembly {
    /// Sample values, flattened row major, `rows() * columns` values long.
    pub data: Vec<f64>,
    /// Values per sample, 1 for plain time series.
    pub columns: usize,
    /// Calendar units inside the window that contributed nothing, in order.
    pub skipped: Vec<NaiveDate>,
}

impl Assembly {
    /// Number of samples in the assembled window.
    pub fn rows(&self) -> usize {
        self.data.len() / self.columns
    }
}

/// Which ends of one unit's records get clipped to the window.
struct Bounds {
    clip_start: bool,
    clip_end: bool,
}

impl Archive {
    /// Load a variable over the whole window and concatenate the per-file pieces
    /// into one array.
    ///
    /// For each calendar unit the window touches, the unit's file is resolved,
    /// opened, and its record range selected by nearest timestamp: the first unit
    /// starts at the sample closest to the window start, the last unit ends just
    /// before the sample closest to the window end, interior units contribute all
    /// their records. A unit that cannot be resolved, opened, or read is skipped
    /// with a warning and listed in [`Assembly::skipped`]; only when every unit is
    /// skipped does the whole request fail with [`BcoDataErr::NoDataAvailable`].
    pub fn assemble(
        &self,
        instrument: Instrument,
        field: &str,
        window: &TimeWindow,
    ) -> Result<Assembly, BcoDataErr> {
        let config = self.config().instrument(instrument);
        let units = window.calendar_units(config.step);
        let mut session = self.session()?;

        let mut data: Vec<f64> = vec![];
        let mut columns: Option<usize> = None;
        let mut skipped: Vec<NaiveDate> = vec![];

        let last = units.len().saturating_sub(1);
        for (position, unit) in units.iter().enumerate() {
            let bounds = Bounds {
                clip_start: position == 0,
                clip_end: position == last,
            };

            match load_unit(&config, session.as_mut(), *unit, field, window, bounds) {
                Ok((batch, batch_columns)) => {
                    match columns {
                        None => columns = Some(batch_columns),
                        Some(expected) if expected != batch_columns => {
                            warn!(
                                "{}: {} for {} has {} columns, expected {}, skipping",
                                instrument, field, unit, batch_columns, expected
                            );
                            skipped.push(*unit);
                            continue;
                        }
                        Some(_) => {}
                    }
                    data.extend(batch);
                }
                Err(err) => {
                    warn!("no {} data for {}: {}", instrument, unit, err);
                    skipped.push(*unit);
                }
            }
        }

        if let Some(session) = session {
            session.quit();
        }

        match columns {
            Some(columns) => Ok(Assembly {
                data,
                columns,
                skipped,
            }),
            None => Err(BcoDataErr::NoDataAvailable),
        }
    }

    /// Read a whole variable that does not vary over the window, e.g. a range grid,
    /// from the first file of the window that can be opened.
    pub fn constant(
        &self,
        instrument: Instrument,
        field: &str,
        window: &TimeWindow,
    ) -> Result<Vec<f64>, BcoDataErr> {
        self.with_first_dataset(instrument, window, |dataset| {
            dataset.field_all(field).map(|(values, _)| values)
        })
    }

    /// Read a global string attribute from the first file of the window that can be
    /// opened.
    pub fn global_attribute(
        &self,
        instrument: Instrument,
        name: &str,
        window: &TimeWindow,
    ) -> Result<String, BcoDataErr> {
        self.with_first_dataset(instrument, window, |dataset| dataset.global_attribute(name))
    }

    fn with_first_dataset<T>(
        &self,
        instrument: Instrument,
        window: &TimeWindow,
        read: impl Fn(&Dataset) -> Result<T, BcoDataErr>,
    ) -> Result<T, BcoDataErr> {
        let config = self.config().instrument(instrument);
        let mut session = self.session()?;

        for unit in window.calendar_units(config.step) {
            match open_unit(&config, session.as_mut(), unit) {
                Ok(dataset) => return read(&dataset),
                Err(err) => debug!("no {} file for {}: {}", instrument, unit, err),
            }
        }

        Err(BcoDataErr::NoDataAvailable)
    }

    fn session(&self) -> Result<Option<FtpSession>, BcoDataErr> {
        match self.config().access() {
            AccessMode::Local => Ok(None),
            AccessMode::Ftp => Ok(Some(FtpSession::connect(self.config().ftp_config()?)?)),
        }
    }
}

fn load_unit(
    config: &InstrumentConfig,
    session: Option<&mut FtpSession>,
    unit: NaiveDate,
    field: &str,
    window: &TimeWindow,
    bounds: Bounds,
) -> Result<(Vec<f64>, usize), BcoDataErr> {
    let dataset = open_unit(config, session, unit)?;

    let times = dataset.times()?;
    let records = times.len();

    let first_row = if bounds.clip_start {
        nearest_index(&times, convert::time_to_num(window.start())).unwrap_or(0)
    } else {
        0
    };
    let last_row = if bounds.clip_end {
        nearest_index(&times, convert::time_to_num(window.end())).unwrap_or(records)
    } else {
        records
    };
    // A window entirely before the unit's records would put the end ahead of the
    // start, which collapses to an empty selection.
    let last_row = last_row.max(first_row);

    dataset.field_rows(field, first_row..last_row)
}

fn open_unit(
    config: &InstrumentConfig,
    session: Option<&mut FtpSession>,
    unit: NaiveDate,
) -> Result<Dataset, BcoDataErr> {
    match session {
        None => {
            let path = resolve::resolve_local(config, unit)?;
            Dataset::open(&path)
        }
        Some(session) => {
            let path = resolve::resolve_remote(session, config, unit)?;
            let bytes = session.retrieve(&path)?;
            Dataset::from_bytes(&path, &bytes)
        }
    }
}

/// Index of the sample closest to `target`, the earliest one on ties. Non-finite
/// samples are ignored.
fn nearest_index(times: &[f64], target: f64) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;

    for (i, &time) in times.iter().enumerate() {
        let dist = (time - target).abs();
        if !dist.is_finite() {
            continue;
        }

        match best {
            Some((_, best_dist)) if dist >= best_dist => {}
            _ => best = Some((i, dist)),
        }
    }

    best.map(|(i, _)| i)
}

/*--------------------------------------------------------------------------------------------------
                                          Unit Tests
--------------------------------------------------------------------------------------------------*/
#[cfg(test)]
mod unit {
    use super::*;

    use std::{fs, io::Write, path::Path};

    use chrono::NaiveDateTime;

    use crate::{config::Config, timewindow::CalendarStep};

    const HOUR: f64 = 3600.0;

    struct TestArchive {
        archive: Archive,
        _dir: tempfile::TempDir,
    }

    fn daily_config(root: &Path) -> InstrumentConfig {
        InstrumentConfig {
            local_root: root.to_string_lossy().to_string(),
            remote_root: "/unused".to_string(),
            name_scheme: "MMCR__MBR__Spectral_Moments__*__#.nc*".to_string(),
            date_format: "%y%m%d".to_string(),
            path_addition: None,
            data_version: None,
            step: CalendarStep::Day,
        }
    }

    fn monthly_config(root: &Path) -> InstrumentConfig {
        InstrumentConfig {
            local_root: root.to_string_lossy().to_string(),
            remote_root: "/unused".to_string(),
            name_scheme: "CEILO__TEST__#.nc*".to_string(),
            date_format: "%Y%m".to_string(),
            path_addition: None,
            data_version: None,
            step: CalendarStep::Month,
        }
    }

    fn hms(date: NaiveDate, hour: u32) -> NaiveDateTime {
        date.and_hms_opt(hour, 0, 0).unwrap()
    }

    // Writes a file with `hours` hourly samples starting at midnight of `start`.
    // "T" counts the samples, "Zf" is 2-D over a 3 bin range grid with the value
    // row * 10 + column, "lat" and "range" do not vary between files.
    fn write_file(dir: &Path, name: &str, start: NaiveDate, hours: usize) {
        let path = dir.join(name);
        let start_num = convert::time_to_num(hms(start, 0));

        let times: Vec<f64> = (0..hours).map(|i| start_num + i as f64 * HOUR).collect();
        let temperature: Vec<f64> = (0..hours).map(|i| i as f64).collect();
        let reflectivity: Vec<f64> = (0..hours)
            .flat_map(|row| (0..3).map(move |col| (row * 10 + col) as f64))
            .collect();

        let mut file = netcdf::create(&path).expect("Failed to create test file.");
        file.add_dimension("time", hours).unwrap();
        file.add_dimension("range", 3).unwrap();
        file.add_attribute("location", "Deebles Point, Barbados")
            .unwrap();

        let mut var = file.add_variable::<f64>("time", &["time"]).unwrap();
        var.put_values(&times, ..).unwrap();

        let mut var = file.add_variable::<f64>("T", &["time"]).unwrap();
        var.put_values(&temperature, ..).unwrap();

        let mut var = file.add_variable::<f64>("Zf", &["time", "range"]).unwrap();
        var.put_values(&reflectivity, ..).unwrap();

        let mut var = file.add_variable::<f64>("range", &["range"]).unwrap();
        var.put_values(&[100.0, 200.0, 300.0], ..).unwrap();

        let mut var = file.add_variable::<f64>("lat", &[]).unwrap();
        var.put_values(&[13.16], ..).unwrap();
    }

    fn daily_file_name(date: NaiveDate) -> String {
        format!(
            "MMCR__MBR__Spectral_Moments__155__{}.nc",
            date.format("%y%m%d")
        )
    }

    // One full day of hourly samples per date.
    fn daily_archive(dates: &[NaiveDate]) -> TestArchive {
        let dir = tempfile::tempdir().expect("Failed to create temp dir.");
        for &date in dates {
            write_file(dir.path(), &daily_file_name(date), date, 24);
        }

        let config =
            Config::local().with_instrument(Instrument::Coral, daily_config(dir.path()));

        TestArchive {
            archive: Archive::new(config),
            _dir: dir,
        }
    }

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn test_nearest_index() {
        let times = [0.0, 10.0, 20.0, 30.0];

        assert_eq!(nearest_index(&times, 9.0), Some(1));
        assert_eq!(nearest_index(&times, 30.0), Some(3));
        assert_eq!(nearest_index(&times, -100.0), Some(0));
        assert_eq!(nearest_index(&times, 1000.0), Some(3));
        // Equidistant picks the earlier sample.
        assert_eq!(nearest_index(&times, 5.0), Some(0));

        assert_eq!(nearest_index(&[], 5.0), None);
        assert_eq!(nearest_index(&[f64::NAN, 10.0], 9.0), Some(1));
    }

    #[test]
    fn test_bounds_stay_within_window() {
        let test = daily_archive(&[date(2017, 1, 1), date(2017, 1, 2)]);
        let window = TimeWindow::parse("201701010630", "201701021800").unwrap();

        let time = test
            .archive
            .assemble(Instrument::Coral, "time", &window)
            .expect("Failed to assemble.");

        assert_eq!(time.columns, 1);
        assert!(time.skipped.is_empty());

        let start_num = convert::time_to_num(window.start());
        let end_num = convert::time_to_num(window.end());
        let first = time.data[0];
        let last = *time.data.last().unwrap();

        // Within one native sampling interval of the requested bounds.
        assert!(first >= start_num - HOUR && first <= start_num + HOUR);
        assert!(last >= end_num - HOUR && last <= end_num + HOUR);

        // 06:30 is equidistant to 06:00 and 07:00, the earlier sample wins; the end
        // index is exclusive, so the last sample is the hour before 18:00.
        assert_eq!(first, convert::time_to_num(hms(date(2017, 1, 1), 6)));
        assert_eq!(last, convert::time_to_num(hms(date(2017, 1, 2), 17)));
        assert_eq!(time.rows(), 18 + 18);
    }

    #[test]
    fn test_single_file_window() {
        let test = daily_archive(&[date(2017, 1, 1)]);
        let window = TimeWindow::parse("2017010102", "2017010105").unwrap();

        let time = test
            .archive
            .assemble(Instrument::Coral, "time", &window)
            .expect("Failed to assemble.");

        assert_eq!(
            time.data,
            vec![
                convert::time_to_num(hms(date(2017, 1, 1), 2)),
                convert::time_to_num(hms(date(2017, 1, 1), 3)),
                convert::time_to_num(hms(date(2017, 1, 1), 4)),
            ]
        );
    }

    #[test]
    fn test_idempotent() {
        let test = daily_archive(&[date(2017, 1, 1), date(2017, 1, 2)]);
        let window = TimeWindow::parse("201701010630", "201701021800").unwrap();

        let first = test
            .archive
            .assemble(Instrument::Coral, "Zf", &window)
            .expect("Failed to assemble.");
        let second = test
            .archive
            .assemble(Instrument::Coral, "Zf", &window)
            .expect("Failed to assemble.");

        assert_eq!(first, second);
    }

    #[test]
    fn test_gap_is_skipped_and_recorded() {
        // The file for January 2nd is missing.
        let test = daily_archive(&[date(2017, 1, 1), date(2017, 1, 3)]);
        let window = TimeWindow::parse("20170101", "2017010323").unwrap();

        let time = test
            .archive
            .assemble(Instrument::Coral, "time", &window)
            .expect("Failed to assemble.");

        assert_eq!(time.skipped, vec![date(2017, 1, 2)]);
        assert_eq!(time.rows(), 24 + 23);

        // Still chronological across the gap.
        for pair in time.data.windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn test_no_data_available() {
        let test = daily_archive(&[]);
        let window = TimeWindow::parse("20170101", "20170103").unwrap();

        match test.archive.assemble(Instrument::Coral, "time", &window) {
            Err(BcoDataErr::NoDataAvailable) => {}
            other => panic!("expected NoDataAvailable, got {:?}", other),
        }
    }

    #[test]
    fn test_two_dimensional_field() {
        let test = daily_archive(&[date(2017, 1, 1)]);
        let window = TimeWindow::parse("2017010102", "2017010105").unwrap();

        let reflectivity = test
            .archive
            .assemble(Instrument::Coral, "Zf", &window)
            .expect("Failed to assemble.");

        assert_eq!(reflectivity.columns, 3);
        assert_eq!(reflectivity.rows(), 3);
        assert_eq!(
            reflectivity.data,
            vec![20.0, 21.0, 22.0, 30.0, 31.0, 32.0, 40.0, 41.0, 42.0]
        );
    }

    #[test]
    fn test_compressed_matches_plain() {
        let plain = daily_archive(&[date(2017, 1, 1)]);

        let dir = tempfile::tempdir().expect("Failed to create temp dir.");
        let name = daily_file_name(date(2017, 1, 1));
        write_file(dir.path(), &name, date(2017, 1, 1), 24);

        let bytes = fs::read(dir.path().join(&name)).unwrap();
        let compressed = fs::File::create(dir.path().join(format!("{}.bz2", name))).unwrap();
        let mut encoder =
            bzip2::write::BzEncoder::new(compressed, bzip2::Compression::default());
        encoder.write_all(&bytes).unwrap();
        encoder.finish().unwrap();
        fs::remove_file(dir.path().join(&name)).unwrap();

        let config =
            Config::local().with_instrument(Instrument::Coral, daily_config(dir.path()));
        let archive = Archive::new(config);

        let window = TimeWindow::parse("2017010102", "2017010105").unwrap();
        let from_plain = plain
            .archive
            .assemble(Instrument::Coral, "Zf", &window)
            .expect("Failed to assemble.");
        let from_compressed = archive
            .assemble(Instrument::Coral, "Zf", &window)
            .expect("Failed to assemble.");

        assert_eq!(from_plain, from_compressed);
    }

    #[test]
    fn test_monthly_window_not_starting_on_the_first() {
        // Three days of hourly samples per month, the window starts on the 2nd.
        let dir = tempfile::tempdir().expect("Failed to create temp dir.");
        write_file(dir.path(), "CEILO__TEST__201701.nc", date(2017, 1, 1), 72);
        write_file(dir.path(), "CEILO__TEST__201702.nc", date(2017, 2, 1), 72);

        let config =
            Config::local().with_instrument(Instrument::Ceilometer, monthly_config(dir.path()));
        let archive = Archive::new(config);

        let window = TimeWindow::parse("20170102", "20170203").unwrap();
        let time = archive
            .assemble(Instrument::Ceilometer, "time", &window)
            .expect("Failed to assemble.");

        assert!(time.skipped.is_empty());
        assert_eq!(time.data[0], convert::time_to_num(hms(date(2017, 1, 2), 0)));
        assert_eq!(time.rows(), 48 + 48);
    }

    #[test]
    fn test_constant() {
        let test = daily_archive(&[date(2017, 1, 1)]);
        let window = TimeWindow::parse("20170101", "20170103").unwrap();

        let range = test
            .archive
            .constant(Instrument::Coral, "range", &window)
            .expect("Failed to read constant.");
        assert_eq!(range, vec![100.0, 200.0, 300.0]);

        let lat = test
            .archive
            .constant(Instrument::Coral, "lat", &window)
            .expect("Failed to read constant.");
        assert_eq!(lat, vec![13.16]);
    }

    #[test]
    fn test_global_attribute() {
        let test = daily_archive(&[date(2017, 1, 1)]);
        let window = TimeWindow::parse("20170101", "20170103").unwrap();

        let location = test
            .archive
            .global_attribute(Instrument::Coral, "location", &window)
            .expect("Failed to read attribute.");
        assert_eq!(location, "Deebles Point, Barbados");

        match test
            .archive
            .global_attribute(Instrument::Coral, "no_such_attribute", &window)
        {
            Err(BcoDataErr::MissingAttribute(name)) => assert_eq!(name, "no_such_attribute"),
            other => panic!("expected MissingAttribute, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_variable_counts_as_skipped() {
        let test = daily_archive(&[date(2017, 1, 1)]);
        let window = TimeWindow::parse("20170101", "20170102").unwrap();

        match test.archive.assemble(Instrument::Coral, "no_such_field", &window) {
            Err(BcoDataErr::NoDataAvailable) => {}
            other => panic!("expected NoDataAvailable, got {:?}", other),
        }
    }
}
