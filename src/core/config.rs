//! Application configuration management

use std::path::PathBuf;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use super::persistence::DEFAULT_STORAGE_KEY;

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Where saved content lives
    pub storage: StorageConfig,
    /// Editor settings
    pub editor: EditorConfig,
    /// Log level for the terminal host
    pub log_level: LogLevel,
}

/// Storage settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory of the content store (defaults to the data directory)
    pub data_dir: Option<PathBuf>,
    /// Key the title and document are saved under
    pub storage_key: String,
}

/// Editor-specific settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Shown while the document is empty
    pub placeholder: String,
    /// Shown while the title is empty
    pub title_placeholder: String,
}

/// Log verbosity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
        }
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            placeholder: "Tell a Story...".to_string(),
            title_placeholder: "Title...".to_string(),
        }
    }
}

impl AppConfig {
    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("com", "inkblock", "Inkblock")
    }

    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Load configuration from disk
    pub fn load() -> Result<Self> {
        let path = Self::config_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        Self::from_json(&content).with_context(|| format!("Invalid config: {}", path.display()))
    }

    /// Parse configuration, filling in defaults for missing fields
    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Get the content store directory
    pub fn data_dir(&self) -> PathBuf {
        self.storage.data_dir.clone().unwrap_or_else(|| {
            Self::project_dirs()
                .map(|dirs| dirs.data_dir().to_path_buf())
                .unwrap_or_else(|| PathBuf::from("data"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let json = r#"{"log_level":"debug","storage":{"data_dir":"/tmp/ink"}}"#;
        let config = AppConfig::from_json(json).unwrap();
        assert_eq!(config.log_level, LogLevel::Debug);
        assert_eq!(config.storage.storage_key, "draftEditor");
        assert_eq!(config.data_dir(), PathBuf::from("/tmp/ink"));
        assert_eq!(config.editor, EditorConfig::default());
    }

    #[test]
    fn test_config_round_trips_through_json() {
        let config = AppConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(AppConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_rejects_unknown_log_level() {
        assert!(AppConfig::from_json(r#"{"log_level":"loud"}"#).is_err());
    }
}
