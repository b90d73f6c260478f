//! Runtime Configuration Module
//! Locates the source CSV for the pipeline host.

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable overriding the configured data path.
pub const DATA_PATH_ENV: &str = "CARDIO_DATA";

const DEFAULT_DATA_PATH: &str = "heart_disease_uci.csv";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] io::Error),
    #[error("malformed config file: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Location of the heart disease CSV.
    #[serde(default = "default_data_path")]
    pub data_path: PathBuf,
}

fn default_data_path() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_PATH)
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_path: default_data_path(),
        }
    }
}

impl AppConfig {
    /// Read the optional JSON config file, then apply environment overrides.
    /// A missing file falls back to the defaults; a malformed one is an
    /// error.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = match fs::read_to_string(path) {
            Ok(contents) => serde_json::from_str(&contents)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => Self::default(),
            Err(e) => return Err(e.into()),
        };
        if let Ok(path) = env::var(DATA_PATH_ENV) {
            config.data_path = PathBuf::from(path);
        }
        Ok(config)
    }
}
