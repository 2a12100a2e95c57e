//! A blocking session with the FTP mirror.

use suppaftp::FtpStream;

use crate::{config::FtpConfig, errors::BcoDataErr};

/// An open, logged-in connection to the FTP mirror.
///
/// One session serves a whole multi-file request; it is not shared between requests.
pub struct FtpSession {
    stream: FtpStream,
}

impl FtpSession {
    /// Connect to the server and log in. Falls back to port 21 when the configured
    /// server string carries no port.
    pub fn connect(config: &FtpConfig) -> Result<Self, BcoDataErr> {
        let address = if config.server.contains(':') {
            config.server.clone()
        } else {
            format!("{}:21", config.server)
        };

        let mut stream = FtpStream::connect(address)?;
        stream.login(config.user.as_str(), config.passwd.as_str())?;

        Ok(FtpSession { stream })
    }

    /// List the remote paths matching a glob pattern via NLST.
    pub fn list(&mut self, pattern: &str) -> Result<Vec<String>, BcoDataErr> {
        Ok(self.stream.nlst(Some(pattern))?)
    }

    /// Download one remote file into memory.
    pub fn retrieve(&mut self, path: &str) -> Result<Vec<u8>, BcoDataErr> {
        Ok(self.stream.retr_as_buffer(path)?.into_inner())
    }

    /// Politely end the session. Dropping the session closes the socket anyway, so
    /// a failed QUIT is not worth reporting.
    pub fn quit(mut self) {
        let _ = self.stream.quit();
    }
}
