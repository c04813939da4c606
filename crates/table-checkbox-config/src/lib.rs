use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use table_checkbox_engine::ConversionPolicy;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },
}

/// Persisted settings, loaded at startup and saved whenever they change
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    #[serde(flatten)]
    pub policy: ConversionPolicy,
    /// Directory documents are resolved against
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes_path: Option<PathBuf>,
}

impl Settings {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let mut settings: Settings =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        // Expand shell variables and tilde in the loaded notes path
        settings.notes_path = settings
            .notes_path
            .map(|path| Self::expand_path(&path).unwrap_or(path));

        Ok(Some(settings))
    }

    /// Load settings, falling back to defaults when no file exists yet
    pub fn load_or_default_from_path<P: AsRef<Path>>(config_path: P) -> Result<Self, ConfigError> {
        Ok(Self::load_from_path(config_path)?.unwrap_or_default())
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    /// Apply a change and persist it; returns whether anything was written
    pub fn update_at_path<P, F>(&mut self, config_path: P, change: F) -> anyhow::Result<bool>
    where
        P: AsRef<Path>,
        F: FnOnce(&mut Settings),
    {
        let mut updated = self.clone();
        change(&mut updated);
        if updated == *self {
            return Ok(false);
        }
        updated.save_to_path(config_path)?;
        *self = updated;
        Ok(true)
    }

    pub fn convert_checkboxes_outside_tables(&self) -> bool {
        self.policy.convert_checkboxes_outside_tables
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/table-checkbox");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
            Err(_) => None,
        }
    }
}
