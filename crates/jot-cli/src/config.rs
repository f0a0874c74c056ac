//! Persistent CLI configuration.
//!
//! Settings resolve in order: command-line flags, then `JOT_DB_PATH` /
//! `JOT_COLLECTION` from the environment (a `.env` file is loaded first), then
//! the config file, then built-in defaults.

use std::path::{Path, PathBuf};

use jot_core::config::DEFAULT_COLLECTION;
use jot_core::ControllerConfig;
use serde::{Deserialize, Serialize};

const CONFIG_FILE_NAME: &str = "config.json";
pub const DB_PATH_ENV: &str = "JOT_DB_PATH";
pub const COLLECTION_ENV: &str = "JOT_COLLECTION";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct CliConfig {
    #[serde(default)]
    pub db_path: Option<PathBuf>,
    #[serde(default)]
    pub collection: Option<String>,
    #[serde(default)]
    pub controller: ControllerConfig,
}

/// Fully resolved settings for one invocation.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Settings {
    pub db_path: PathBuf,
    pub collection: String,
    pub controller: ControllerConfig,
}

/// Values given on the command line.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub db_path: Option<PathBuf>,
    pub collection: Option<String>,
}

pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("jot")
        .join(CONFIG_FILE_NAME)
}

pub fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("jot")
        .join("jot.db")
}

pub fn normalize_text_option(value: Option<String>) -> Option<String> {
    let value = value?;
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

impl CliConfig {
    pub fn load_from_path(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path)
            .map_err(|error| format!("Failed to read config at {}: {}", path.display(), error))?;
        serde_json::from_str::<Self>(&raw)
            .map_err(|error| format!("Failed to parse config at {}: {}", path.display(), error))
    }

    pub fn save_to_path(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|error| {
                format!(
                    "Failed to create config directory {}: {}",
                    parent.display(),
                    error
                )
            })?;
        }

        let raw = serde_json::to_string_pretty(self)
            .map_err(|error| format!("Failed to serialize config: {error}"))?;
        std::fs::write(path, raw)
            .map_err(|error| format!("Failed to write config at {}: {}", path.display(), error))
    }

    /// Combine this file with flags and environment lookups.
    pub fn resolve(
        &self,
        overrides: Overrides,
        env: impl Fn(&str) -> Option<String>,
    ) -> Settings {
        let db_path = overrides
            .db_path
            .or_else(|| normalize_text_option(env(DB_PATH_ENV)).map(PathBuf::from))
            .or_else(|| self.db_path.clone())
            .unwrap_or_else(default_db_path);

        let collection = normalize_text_option(overrides.collection)
            .or_else(|| normalize_text_option(env(COLLECTION_ENV)))
            .or_else(|| normalize_text_option(self.collection.clone()))
            .unwrap_or_else(|| DEFAULT_COLLECTION.to_string());

        Settings {
            db_path,
            collection,
            controller: self.controller,
        }
    }
}

impl From<&Settings> for CliConfig {
    fn from(settings: &Settings) -> Self {
        Self {
            db_path: Some(settings.db_path.clone()),
            collection: Some(settings.collection.clone()),
            controller: settings.controller,
        }
    }
}
