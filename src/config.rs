//! Explicit configuration passed to an [`crate::Archive`] at construction.
//!
//! There is no process-wide state: which instruments live where, and whether files
//! are read from the local filesystem or the FTP mirror, is all carried by a
//! [`Config`] value.

use std::{
    collections::HashMap,
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use crate::{
    errors::BcoDataErr,
    instrument::{Instrument, InstrumentConfig},
};

/// Where the archive files are read from.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AccessMode {
    /// Read files from the local filesystem (on-site use).
    Local,
    /// Read files from the FTP mirror (off-site use).
    Ftp,
}

/// Connection details for the FTP mirror.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct FtpConfig {
    /// Host name of the FTP server, optionally with a port.
    pub server: String,
    /// User name for the login.
    pub user: String,
    /// Password for the login.
    pub passwd: String,
}

impl FtpConfig {
    /// Load credentials from a plain-text file with `user=...` and `passwd=...` lines.
    ///
    /// Keep this file outside of version control.
    pub fn from_credentials_file(
        server: &str,
        path: &dyn AsRef<Path>,
    ) -> Result<Self, BcoDataErr> {
        let file = File::open(path.as_ref())?;

        let mut user = None;
        let mut passwd = None;

        for line in BufReader::new(file).lines() {
            let line = line?;
            if let Some(value) = line.strip_prefix("user=") {
                user = Some(value.trim_end().to_string());
            } else if let Some(value) = line.strip_prefix("passwd=") {
                passwd = Some(value.trim_end().to_string());
            }
        }

        match (user, passwd) {
            (Some(user), Some(passwd)) => Ok(FtpConfig {
                server: server.to_string(),
                user,
                passwd,
            }),
            _ => Err(BcoDataErr::MissingCredentials),
        }
    }
}

/// The full configuration of a data-access session.
#[derive(Clone, Debug)]
pub struct Config {
    access: AccessMode,
    ftp: Option<FtpConfig>,
    // Only instruments with overridden conventions are stored, the rest fall back to
    // their defaults.
    instruments: HashMap<Instrument, InstrumentConfig>,
}

impl Config {
    /// Configuration for on-site use, reading from the local filesystem.
    pub fn local() -> Self {
        Config {
            access: AccessMode::Local,
            ftp: None,
            instruments: HashMap::new(),
        }
    }

    /// Configuration for off-site use, reading from the FTP mirror.
    pub fn ftp(ftp: FtpConfig) -> Self {
        Config {
            access: AccessMode::Ftp,
            ftp: Some(ftp),
            instruments: HashMap::new(),
        }
    }

    /// Override the file-naming and path convention of one instrument.
    pub fn with_instrument(mut self, instrument: Instrument, config: InstrumentConfig) -> Self {
        self.instruments.insert(instrument, config);
        self
    }

    /// How the archive files are accessed.
    pub fn access(&self) -> AccessMode {
        self.access
    }

    /// The FTP connection details, if remote access is configured.
    pub fn ftp_config(&self) -> Result<&FtpConfig, BcoDataErr> {
        self.ftp.as_ref().ok_or(BcoDataErr::NoFtpConfigured)
    }

    /// The file-naming and path convention of one instrument.
    pub fn instrument(&self, instrument: Instrument) -> InstrumentConfig {
        self.instruments
            .get(&instrument)
            .cloned()
            .unwrap_or_else(|| instrument.default_config())
    }
}

/*--------------------------------------------------------------------------------------------------
                                          Unit Tests
--------------------------------------------------------------------------------------------------*/
