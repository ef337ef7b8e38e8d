//! Repository configuration file support.
//!
//! This module provides utilities for reading repository configuration from
//! TOML configuration files.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use super::config::{JsonFileConfig, DEFAULT_DATA_FILE};
use super::factory::RepositoryType;
use super::repository::RepositoryError;

/// Repository configuration from file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryConfig {
    pub repository: RepositorySettings,
    #[serde(default)]
    pub json: JsonSettings,
}

/// Repository type settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositorySettings {
    #[serde(rename = "type")]
    pub repo_type: String,
}

/// JSON data file settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonSettings {
    #[serde(default = "default_data_file")]
    pub path: String,
}

impl Default for JsonSettings {
    fn default() -> Self {
        Self {
            path: default_data_file(),
        }
    }
}

fn default_data_file() -> String {
    DEFAULT_DATA_FILE.to_string()
}

impl RepositoryConfig {
    /// Load repository configuration from a TOML file.
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    /// * `Ok(RepositoryConfig)` if successful
    /// * `Err(RepositoryError)` if file cannot be read or parsed
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, RepositoryError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            RepositoryError::configuration(format!("Failed to read config file: {}", e))
        })?;

        toml::from_str(&content).map_err(|e| {
            RepositoryError::configuration(format!("Failed to parse config file: {}", e))
        })
    }

    /// Load repository configuration from the default location.
    ///
    /// Searches for `repository.toml` in:
    /// 1. Current directory
    /// 2. `backend/` directory
    /// 3. Parent directory
    pub fn from_default_location() -> Result<Self, RepositoryError> {
        let search_paths = [
            PathBuf::from("repository.toml"),
            PathBuf::from("backend/repository.toml"),
            PathBuf::from("../repository.toml"),
        ];

        for path in search_paths {
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        Err(RepositoryError::configuration(
            "No repository.toml found in standard locations",
        ))
    }

    /// Get the repository type from configuration.
    pub fn repository_type(&self) -> Result<RepositoryType, String> {
        RepositoryType::from_str(&self.repository.repo_type)
    }

    /// JSON file settings, or `None` for other repository types.
    pub fn to_json_config(&self) -> Result<Option<JsonFileConfig>, RepositoryError> {
        let repo_type = self.repository_type().map_err(|e| {
            RepositoryError::configuration(format!("Invalid repository type: {}", e))
        })?;

        if repo_type != RepositoryType::JsonFile {
            return Ok(None);
        }

        if self.json.path.trim().is_empty() {
            return Err(RepositoryError::configuration(
                "JSON repository requires a non-empty 'json.path' setting",
            ));
        }

        Ok(Some(JsonFileConfig::new(&self.json.path)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_local_config() {
        let toml = r#"
[repository]
type = "local"
"#;

        let config: RepositoryConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.repository.repo_type, "local");
        assert_eq!(config.repository_type().unwrap(), RepositoryType::Local);
        assert!(config.to_json_config().unwrap().is_none());
    }

    #[test]
    fn test_parse_json_config() {
        let toml = r#"
[repository]
type = "json"

[json]
path = "/var/lib/incubator/db.json"
"#;

        let config: RepositoryConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.repository_type().unwrap(), RepositoryType::JsonFile);
        let json = config.to_json_config().unwrap().unwrap();
        assert_eq!(json.path, PathBuf::from("/var/lib/incubator/db.json"));
    }

    #[test]
    fn test_json_path_defaults() {
        let config: RepositoryConfig = toml::from_str("[repository]\ntype = \"json\"\n").unwrap();
        let json = config.to_json_config().unwrap().unwrap();
        assert_eq!(json.path, PathBuf::from(DEFAULT_DATA_FILE));
    }

    #[test]
    fn test_json_requires_path() {
        let toml = r#"
[repository]
type = "json"

[json]
path = ""
"#;

        let config: RepositoryConfig = toml::from_str(toml).unwrap();
        assert!(config.to_json_config().is_err());
    }
}
