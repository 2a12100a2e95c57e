#![deny(missing_docs)]

//! Access the archive of atmospheric observations from the Barbados Cloud
//! Observatory.
//!
//! The archive stores one netCDF file per instrument per calendar unit (day or
//! month), some of them bz2 compressed, reachable either on the local filesystem of
//! the analysis servers or through an FTP mirror. This crate hides that layout: ask
//! for a variable over a time window and get one contiguous array back, no matter
//! how many files the window spans or how they are compressed.
//!
//! ```no_run
//! use bco_data::{Archive, Config, Instrument, TimeWindow};
//!
//! # fn main() -> Result<(), bco_data::BcoDataErr> {
//! let archive = Archive::new(Config::local());
//! let window = TimeWindow::parse("20170101", "201701021530")?;
//!
//! let reflectivity = archive.assemble(Instrument::Coral, "Zf", &window)?;
//! let time = archive.assemble(Instrument::Coral, "time", &window)?;
//!
//! assert_eq!(reflectivity.rows(), time.rows());
//! # Ok(())
//! # }
//! ```
//!
//! Days with no usable file are skipped and reported in the result rather than
//! failing the whole request; see [`Assembly::skipped`].

//
// API
//
pub use crate::archive::{Archive, Assembly, FtpSession, ResolvedFile};
pub use crate::config::{AccessMode, Config, FtpConfig};
pub use crate::errors::BcoDataErr;
pub use crate::instrument::{Instrument, InstrumentConfig};
pub use crate::timewindow::{CalendarStep, TimeWindow};

pub mod convert;

//
// Implementation
//
mod archive;
mod config;
mod errors;
mod instrument;
mod timewindow;
