//! Storage configuration and environment variable handling.

use std::env;
use std::path::PathBuf;

/// Default location of the data file, relative to the working directory.
pub const DEFAULT_DATA_FILE: &str = "data/incubator.json";

/// Settings for the JSON-document repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonFileConfig {
    /// Path of the JSON document holding the whole dataset
    pub path: PathBuf,
}

impl JsonFileConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load the configuration from environment variables.
    ///
    /// # Environment Variables
    /// - `DATA_FILE` (optional, default: `data/incubator.json`): data file path
    pub fn from_env() -> Self {
        let path = env::var("DATA_FILE")
            .ok()
            .filter(|p| !p.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DATA_FILE.to_string());
        Self::new(path)
    }
}

impl Default for JsonFileConfig {
    fn default() -> Self {
        Self::new(DEFAULT_DATA_FILE)
    }
}
