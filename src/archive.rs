//! An archive of atmospheric-observation files.

use crate::config::Config;

/// The archive interface.
///
/// Given a time window it locates the dated files the records span, opens each one
/// (decompressing where needed), slices out the requested range and concatenates the
/// pieces into one array. Construction is cheap; files are resolved and opened lazily
/// per data request and nothing is cached between requests.
#[derive(Debug)]
pub struct Archive {
    config: Config,
}

mod assemble;
mod dataset;
mod remote;
mod resolve;

pub use assemble::Assembly;
pub use remote::FtpSession;
pub use resolve::ResolvedFile;

impl Archive {
    /// Create an archive interface from an explicit configuration.
    pub fn new(config: Config) -> Self {
        Archive { config }
    }

    /// The configuration this archive was constructed with.
    pub fn config(&self) -> &Config {
        &self.config
    }
}
