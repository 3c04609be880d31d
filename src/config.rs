//! Configuration - Defaults, `spark-cv.toml`, then `SPARK_CV_*` overrides.
//!
//! CLI flags are applied last by the binary.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize};

use crate::components::SectionTitles;
use crate::error::{Error, Result};
use crate::transition::presets::TYPEWRITER_SPEED;

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "spark-cv.toml";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub cv_path: PathBuf,
    /// Typewriter speed in milliseconds per character.
    #[serde(deserialize_with = "deserialize_speed")]
    pub typewriter_speed_ms: f64,
    pub frame_interval_ms: u64,
    pub log_file: Option<PathBuf>,
    pub log_filter: String,
    pub titles: SectionTitles,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cv_path: PathBuf::from("cv.json"),
            typewriter_speed_ms: TYPEWRITER_SPEED,
            frame_interval_ms: 16,
            log_file: None,
            log_filter: "info".into(),
            titles: SectionTitles::default(),
        }
    }
}

/// Parse a typewriter speed: a finite, non-negative number of milliseconds.
pub fn parse_speed(raw: &str) -> std::result::Result<f64, String> {
    let speed: f64 = raw.trim().parse().map_err(|_| format!("`{raw}` is not a number"))?;
    check_speed(speed)
}

fn check_speed(speed: f64) -> std::result::Result<f64, String> {
    if speed.is_finite() && speed >= 0.0 {
        Ok(speed)
    } else {
        Err(format!("typewriter speed must be a finite, non-negative number, got {speed}"))
    }
}

fn deserialize_speed<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<f64, D::Error> {
    let speed = f64::deserialize(deserializer)?;
    check_speed(speed).map_err(serde::de::Error::custom)
}

impl Config {
    pub fn from_toml(raw: &str, path: &Path) -> Result<Self> {
        toml::from_str(raw).map_err(|source| Error::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load `path`, or [`DEFAULT_CONFIG_FILE`] when it exists, or defaults.
    ///
    /// An explicitly given file must exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, required) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };
        if !required && !path.exists() {
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(&path).map_err(|source| Error::io(&path, source))?;
        Self::from_toml(&raw, &path)
    }

    /// Apply `SPARK_CV_*` overrides from `lookup` (normally `std::env::var`).
    ///
    /// Unparseable numbers and invalid speeds are ignored.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup("SPARK_CV_PATH") {
            self.cv_path = PathBuf::from(v);
        }
        if let Some(v) = lookup("SPARK_CV_SPEED").and_then(|v| parse_speed(&v).ok()) {
            self.typewriter_speed_ms = v;
        }
        if let Some(v) = lookup("SPARK_CV_FRAME_MS").and_then(|v| v.parse().ok()) {
            self.frame_interval_ms = v;
        }
        if let Some(v) = lookup("SPARK_CV_LOG_FILE") {
            self.log_file = Some(PathBuf::from(v));
        }
        if let Some(v) = lookup("SPARK_CV_LOG") {
            self.log_filter = v;
        }
    }
}
