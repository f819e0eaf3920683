//! Data and certificate directory resolution.
//!
//! Directory resolution runs before anything else: the default log
//! destination lives under the data directory, so the logger cannot be
//! attached until these paths exist.

use std::path::PathBuf;

use crate::config::LogSection;
use crate::error::RouterError;
use crate::logging::LogDestination;

/// Default directory name under the home directory.
const DEFAULT_DIR: &str = ".lattica";

/// Subdirectory for reseed and family certificates.
const CERT_DIR: &str = "certificates";

/// Default log file name under the data directory.
const LOG_FILE: &str = "lattica.log";

/// Resolved filesystem layout for a router instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouterPaths {
    pub data_dir: PathBuf,
    pub cert_dir: PathBuf,
}

/// Resolve and create the data and certificate directories.
///
/// An explicit `data_dir` option wins; otherwise the platform default
/// `~/.lattica` is used. Both directories are created if missing.
///
/// # Note
/// This performs blocking I/O (`create_dir_all`). Call at startup before
/// any subsystem is running.
pub fn resolve(data_dir_option: Option<&str>) -> Result<RouterPaths, RouterError> {
    let data_dir = match data_dir_option {
        Some(dir) => PathBuf::from(dir),
        None => dirs::home_dir()
            .ok_or_else(|| {
                RouterError::Config("could not determine home directory".to_string())
            })?
            .join(DEFAULT_DIR),
    };
    let cert_dir = data_dir.join(CERT_DIR);

    std::fs::create_dir_all(&data_dir)?;
    std::fs::create_dir_all(&cert_dir)?;

    Ok(RouterPaths { data_dir, cert_dir })
}

/// Resolve the logger destination from the `[log]` section.
///
/// `destination = "stdout"` short-circuits; otherwise an explicit file
/// path is used, else `lattica.log` under the data directory.
pub fn log_destination(paths: &RouterPaths, log: &LogSection) -> LogDestination {
    if log.destination == "stdout" {
        return LogDestination::Stdout;
    }
    match &log.file {
        Some(file) => LogDestination::File(PathBuf::from(file)),
        None => LogDestination::File(paths.data_dir.join(LOG_FILE)),
    }
}
