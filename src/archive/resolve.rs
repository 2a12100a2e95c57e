//! Mapping a calendar unit to the one file that holds its records.

use std::path::PathBuf;

use chrono::NaiveDate;

use super::{remote::FtpSession, Archive};
use crate::{
    config::AccessMode,
    errors::BcoDataErr,
    instrument::{Instrument, InstrumentConfig},
};

/// The location of one calendar unit's file.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum ResolvedFile {
    /// A path on the local filesystem.
    Local(PathBuf),
    /// A path on the FTP mirror.
    Remote(String),
}

impl Archive {
    /// Locate the file holding one calendar unit of an instrument's data.
    ///
    /// The naming patterns contain wildcards, so resolution searches the archive and
    /// demands exactly one match. Zero matches means the unit was never recorded (or
    /// not copied to this mirror), more than one means the pattern is too loose to
    /// pick a file from; both cases are [`BcoDataErr::NoUniqueMatch`].
    pub fn resolve(
        &self,
        instrument: Instrument,
        date: NaiveDate,
    ) -> Result<ResolvedFile, BcoDataErr> {
        let config = self.config().instrument(instrument);

        match self.config().access() {
            AccessMode::Local => resolve_local(&config, date).map(ResolvedFile::Local),
            AccessMode::Ftp => {
                let mut session = FtpSession::connect(self.config().ftp_config()?)?;
                let resolved = resolve_remote(&mut session, &config, date);
                session.quit();
                resolved.map(ResolvedFile::Remote)
            }
        }
    }
}

pub(crate) fn resolve_local(
    config: &InstrumentConfig,
    date: NaiveDate,
) -> Result<PathBuf, BcoDataErr> {
    let pattern = config.file_pattern(date, &config.local_root);
    let mut matches: Vec<PathBuf> = glob::glob(&pattern)?
        .filter_map(|entry| entry.ok())
        .collect();

    if matches.len() == 1 {
        Ok(matches.remove(0))
    } else {
        Err(BcoDataErr::NoUniqueMatch {
            pattern,
            matches: matches.len(),
        })
    }
}

pub(crate) fn resolve_remote(
    session: &mut FtpSession,
    config: &InstrumentConfig,
    date: NaiveDate,
) -> Result<String, BcoDataErr> {
    let pattern = config.file_pattern(date, &config.remote_root);
    let mut matches = session.list(&pattern)?;

    if matches.len() == 1 {
        Ok(matches.remove(0))
    } else {
        Err(BcoDataErr::NoUniqueMatch {
            pattern,
            matches: matches.len(),
        })
    }
}

/*--------------------------------------------------------------------------------------------------
                                          Unit Tests
--------------------------------------------------------------------------------------------------*/
