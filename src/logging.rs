//! Logging - `tracing-subscriber` setup.
//!
//! The terminal belongs to the renderer, so events go to a log file or
//! nowhere. `SPARK_CV_LOG` takes precedence over the configured filter.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::error::{Error, Result};

pub const LOG_ENV: &str = "SPARK_CV_LOG";

/// Build the filter from `SPARK_CV_LOG`, falling back to `default`.
pub fn filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(default))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install a subscriber appending to `log_file`. Without a file nothing is
/// installed and every event is dropped.
///
/// Returns whether a subscriber was installed.
pub fn init(log_file: Option<&Path>, default_filter: &str) -> Result<bool> {
    let Some(path) = log_file else {
        return Ok(false);
    };
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| Error::io(path, source))?;

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter(default_filter))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .is_ok();
    Ok(installed)
}
