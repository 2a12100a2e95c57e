//! Download archive files for a time window from the FTP mirror.
//!
//! Resolves the file of every calendar unit the window touches and stores it in the
//! output directory, keeping the remote file name. Files already present are not
//! downloaded again, and a unit that fails does not stop the rest of the window.

use std::{fs, path::PathBuf, str::FromStr};

use clap::Parser;
use log::{info, warn, LevelFilter};
use simple_logger::SimpleLogger;

use bco_data::{BcoDataErr, FtpConfig, FtpSession, Instrument, TimeWindow};

#[derive(Debug, Parser)]
#[clap(bin_name = "bcodn")]
#[clap(author, version, about)]
struct BcodnOptions {
    /// The instrument to download files for.
    ///
    /// Allowed values are CORAL, KATRIN, CEILOMETER, RADIATION, WEATHER and
    /// WINDLIDAR.
    #[clap(parse(try_from_str = parse_instrument))]
    instrument: Instrument,

    /// Start of the time window, YYYYMMDDhhmmss or any prefix of it.
    start: String,

    /// End of the time window, YYYYMMDDhhmmss or any prefix of it.
    end: String,

    /// Host name of the FTP server, optionally with a port.
    #[clap(short, long)]
    #[clap(env = "BCO_FTP_SERVER")]
    server: String,

    /// Path to a plain-text credentials file with user= and passwd= lines.
    #[clap(short, long)]
    #[clap(env = "BCO_FTP_CREDENTIALS")]
    credentials: PathBuf,

    /// Directory to store the downloaded files in.
    #[clap(short, long, default_value = ".")]
    output: PathBuf,

    /// Verbose output.
    #[clap(short, long)]
    verbose: bool,
}

fn parse_instrument(text: &str) -> Result<Instrument, String> {
    Instrument::from_str(text).map_err(|_| format!("not a valid instrument name: {}", text))
}

fn main() -> Result<(), BcoDataErr> {
    let opts = BcodnOptions::parse();

    let level = if opts.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    SimpleLogger::new()
        .with_level(level)
        .init()
        .map_err(|err| BcoDataErr::GeneralError(err.to_string()))?;

    let window = TimeWindow::parse(&opts.start, &opts.end)?;
    let ftp = FtpConfig::from_credentials_file(&opts.server, &opts.credentials)?;
    let config = opts.instrument.default_config();

    fs::create_dir_all(&opts.output)?;
    let mut session = FtpSession::connect(&ftp)?;

    let mut failures = 0_usize;
    for unit in window.calendar_units(config.step) {
        let pattern = config.file_pattern(unit, &config.remote_root);

        let matches = match session.list(&pattern) {
            Ok(matches) => matches,
            Err(err) => {
                warn!("listing {} failed: {}", pattern, err);
                failures += 1;
                continue;
            }
        };
        if matches.len() != 1 {
            warn!("{} files match {}, skipping {}", matches.len(), pattern, unit);
            failures += 1;
            continue;
        }

        let remote = &matches[0];
        let file_name = remote.rsplit('/').next().unwrap_or(remote);
        let target = opts.output.join(file_name);

        if target.exists() {
            info!("{} is already present, skipping", file_name);
            continue;
        }

        match session.retrieve(remote) {
            Ok(bytes) => {
                fs::write(&target, bytes)?;
                info!("downloaded {}", file_name);
            }
            Err(err) => {
                warn!("download of {} failed: {}", remote, err);
                failures += 1;
            }
        }
    }
    session.quit();

    if failures > 0 {
        warn!("{} calendar units could not be downloaded", failures);
    }

    Ok(())
}
