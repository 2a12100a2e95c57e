//! Module for errors.
use std::{error::Error, fmt::Display};

/// Error from the archive interface.
#[derive(Debug)]
pub enum BcoDataErr {
    // Inherited errors from std
    /// Error forwarded from std
    IO(::std::io::Error),

    // Other forwarded errors
    /// Error forwarded from the netcdf crate
    NetCdf(netcdf::Error),
    /// Error forwarded from the suppaftp crate
    Ftp(suppaftp::FtpError),
    /// Invalid glob pattern built from an instrument's naming scheme
    GlobPattern(glob::PatternError),
    /// Error forwarded from the strum crate
    StrumError(strum::ParseError),
    /// General error with any cause information erased and replaced by a string
    GeneralError(String),

    // My own errors from this crate
    /// A time string that could not be parsed, even after zero-padding.
    InvalidTimeString(String),
    /// A time window whose start lies after its end.
    InvalidWindow {
        /// Requested start of the window.
        start: chrono::NaiveDateTime,
        /// Requested end of the window.
        end: chrono::NaiveDateTime,
    },
    /// A file pattern that resolved to zero or more than one file.
    NoUniqueMatch {
        /// The glob/FTP pattern that was searched for.
        pattern: String,
        /// How many files actually matched.
        matches: usize,
    },
    /// A field name not present in a data file.
    MissingVariable(String),
    /// A global attribute not present in a data file.
    MissingAttribute(String),
    /// The credential file did not contain both a user and a password.
    MissingCredentials,
    /// Remote access was requested but no FTP configuration was provided.
    NoFtpConfigured,
    /// Every calendar unit of the window was missing, nothing to return.
    NoDataAvailable,
}

impl Display for BcoDataErr {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        use crate::errors::BcoDataErr::*;

        match self {
            IO(err) => write!(f, "std lib io error: {}", err),

            NetCdf(err) => write!(f, "netcdf error: {}", err),
            Ftp(err) => write!(f, "ftp error: {}", err),
            GlobPattern(err) => write!(f, "invalid file pattern: {}", err),
            StrumError(err) => write!(f, "error forwarded from strum crate: {}", err),
            GeneralError(msg) => write!(f, "general error forwarded: {}", msg),

            InvalidTimeString(time_str) => write!(
                f,
                "{} is not a valid time, use YYYYMMDDhhmmss or a prefix of it",
                time_str
            ),
            InvalidWindow { start, end } => {
                write!(f, "window start {} is after window end {}", start, end)
            }
            NoUniqueMatch { pattern, matches } => {
                write!(f, "{} files matched pattern {}", matches, pattern)
            }
            MissingVariable(name) => write!(f, "no variable {} in data file", name),
            MissingAttribute(name) => write!(f, "no global attribute {} in data file", name),
            MissingCredentials => write!(f, "credential file is missing user or password"),
            NoFtpConfigured => write!(f, "remote access requested without ftp configuration"),
            NoDataAvailable => write!(f, "no data available for the requested time window"),
        }
    }
}

impl Error for BcoDataErr {}

impl From<::std::io::Error> for BcoDataErr {
    fn from(err: ::std::io::Error) -> BcoDataErr {
        BcoDataErr::IO(err)
    }
}

impl From<netcdf::Error> for BcoDataErr {
    fn from(err: netcdf::Error) -> BcoDataErr {
        BcoDataErr::NetCdf(err)
    }
}

impl From<suppaftp::FtpError> for BcoDataErr {
    fn from(err: suppaftp::FtpError) -> BcoDataErr {
        BcoDataErr::Ftp(err)
    }
}

impl From<glob::PatternError> for BcoDataErr {
    fn from(err: glob::PatternError) -> BcoDataErr {
        BcoDataErr::GlobPattern(err)
    }
}

impl From<strum::ParseError> for BcoDataErr {
    fn from(err: strum::ParseError) -> BcoDataErr {
        BcoDataErr::StrumError(err)
    }
}

impl From<Box<dyn Error>> for BcoDataErr {
    fn from(err: Box<dyn Error>) -> BcoDataErr {
        BcoDataErr::GeneralError(err.to_string())
    }
}
