//! Tracing subscriber configuration and the logger subsystem adapter.
//!
//! Log levels follow these conventions:
//! - ERROR: unrecoverable failures, operator misconfiguration
//! - WARN: recoverable fallbacks (bandwidth default, mesh disable)
//! - INFO: lifecycle phase transitions
//! - DEBUG: resolver decisions, publication plans
//! - TRACE: per-query introspection detail

use std::path::PathBuf;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::subsystems::Logger;

/// Where log output is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogDestination {
    Stdout,
    File(PathBuf),
}

/// [`Logger`] implementation backed by `tracing-subscriber`.
///
/// `send_to` only records the destination; `start` installs the global
/// subscriber. Installation uses `try_init` so a second router in the
/// same process (or a test harness subscriber) does not panic.
pub struct TracingLogger {
    destination: Mutex<LogDestination>,
    level: String,
}

impl TracingLogger {
    pub fn new(level: &str) -> Self {
        Self {
            destination: Mutex::new(LogDestination::Stdout),
            level: level.to_string(),
        }
    }

    fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(self.level.clone()))
    }
}

impl Logger for TracingLogger {
    fn send_to(&self, destination: &LogDestination) {
        *self.destination.lock().expect("logger destination lock") = destination.clone();
    }

    fn start(&self) {
        let destination = self
            .destination
            .lock()
            .expect("logger destination lock")
            .clone();

        let result = match destination {
            LogDestination::Stdout => tracing_subscriber::fmt()
                .with_env_filter(self.filter())
                .try_init(),
            LogDestination::File(path) => match std::fs::File::options()
                .create(true)
                .append(true)
                .open(&path)
            {
                Ok(file) => tracing_subscriber::fmt()
                    .with_env_filter(self.filter())
                    .with_writer(Mutex::new(file))
                    .with_ansi(false)
                    .try_init(),
                Err(e) => {
                    eprintln!("lattica: cannot open log file {}: {e}", path.display());
                    tracing_subscriber::fmt()
                        .with_env_filter(self.filter())
                        .try_init()
                }
            },
        };
        // Another subscriber being installed already is fine.
        let _ = result;
    }

    fn stop(&self) {
        // The fmt subscriber flushes on write; nothing to tear down.
    }
}

/// Initialize the tracing subscriber for tests.
///
/// Uses `try_init` to avoid panicking if called multiple times.
pub fn init_for_tests() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subsystems::Logger as _;

    #[test]
    fn send_to_updates_destination() {
        let logger = TracingLogger::new("info");
        logger.send_to(&LogDestination::File(PathBuf::from("/tmp/x.log")));
        assert_eq!(
            *logger.destination.lock().unwrap(),
            LogDestination::File(PathBuf::from("/tmp/x.log"))
        );
    }

    #[test]
    fn start_and_stop_do_not_panic() {
        init_for_tests();
        let logger = TracingLogger::new("info");
        logger.start();
        logger.stop();
    }
}
