//! Configuration file support.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/bmi/config.toml`.

use crate::history::HISTORY_KEY;
use crate::{AgeCategory, Error, Gender, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub history: HistoryConfig,

    #[serde(default)]
    pub defaults: InputDefaults,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HistoryConfig {
    #[serde(default = "default_storage_key")]
    pub storage_key: String,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            storage_key: default_storage_key(),
        }
    }
}

/// Values used when a calculation doesn't specify them
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InputDefaults {
    #[serde(default)]
    pub age_category: AgeCategory,

    #[serde(default)]
    pub gender: Gender,

    #[serde(default = "default_use_metric")]
    pub use_metric: bool,
}

impl Default for InputDefaults {
    fn default() -> Self {
        Self {
            age_category: AgeCategory::default(),
            gender: Gender::default(),
            use_metric: default_use_metric(),
        }
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));
    base.join("bmi")
}

fn default_storage_key() -> String {
    HISTORY_KEY.to_string()
}

fn default_use_metric() -> bool {
    true
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!(
                "No config file found at {:?}, using defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .unwrap_or_else(|| PathBuf::from("."));
        base.join("bmi").join("config.toml")
    }

    /// Check values serde can't
    pub fn validate(&self) -> Result<()> {
        if self.history.storage_key.trim().is_empty() {
            return Err(Error::Config("history.storage_key must not be empty".into()));
        }
        Ok(())
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.history.storage_key, "bmi_calculation_history");
        assert_eq!(config.defaults.age_category, AgeCategory::Adult);
        assert_eq!(config.defaults.gender, Gender::Male);
        assert!(config.defaults.use_metric);
        assert!(config.data.data_dir.ends_with("bmi"));
    }

    #[test]
    fn test_config_roundtrip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("nested/config.toml");

        let mut config = Config::default();
        config.defaults.gender = Gender::Female;
        config.defaults.use_metric = false;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.defaults.gender, Gender::Female);
        assert!(!loaded.defaults.use_metric);
        assert_eq!(loaded.history.storage_key, config.history.storage_key);
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[defaults]
age_category = "child"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.defaults.age_category, AgeCategory::Child);
        assert!(config.defaults.use_metric); // default
        assert_eq!(config.history.storage_key, "bmi_calculation_history");
    }

    #[test]
    fn test_empty_storage_key_rejected() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[history]\nstorage_key = \"\"\n").unwrap();

        assert!(matches!(Config::load_from(&path), Err(Error::Config(_))));
    }
}
