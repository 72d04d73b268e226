//! Tracing setup.
//!
//! The terminal belongs to the UI, so log lines go to a file, and only when
//! one is configured. `RUST_LOG` takes precedence over the configured level.

use std::fs::OpenOptions;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// Install the global subscriber and report whether one was installed.
///
/// Nothing is installed without a log file, or when the file cannot be
/// opened. Only the first successful call takes effect.
pub fn init_logging(config: &Config) -> bool {
    let Some(path) = &config.log_file else {
        return false;
    };
    let file = match OpenOptions::new().create(true).append(true).open(path) {
        Ok(file) => file,
        Err(_) => return false,
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .is_ok()
}
