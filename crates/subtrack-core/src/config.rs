use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Main configuration structure
///
/// Loaded from a TOML file in the platform config dir; anything missing
/// falls back to a sensible default, and no file at all means all
/// defaults.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub storage: StorageConfig,
    pub reminders: ReminderConfig,
    pub display: DisplayConfig,
}

impl Config {
    /// Load config from the default location, defaults if absent.
    pub fn load() -> crate::Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)?;
            let config: Config = toml::from_str(&contents)
                .map_err(|e| crate::Error::Config(format!("failed to parse config: {}", e)))?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save config to disk, creating the directory as needed.
    pub fn save(&self) -> crate::Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| crate::Error::Config(format!("failed to serialize config: {}", e)))?;

        std::fs::write(&config_path, contents)?;
        Ok(())
    }

    /// XDG config dir on Unix-like systems, AppData on Windows.
    fn config_path() -> crate::Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| crate::Error::Config("could not find config directory".into()))?
            .join("subtrack");

        Ok(config_dir.join("config.toml"))
    }

    /// Where subscription data lives: explicit override, else the
    /// platform data dir.
    pub fn data_dir(&self) -> crate::Result<PathBuf> {
        if let Some(dir) = &self.storage.data_dir {
            return Ok(dir.clone());
        }

        Ok(dirs::data_dir()
            .ok_or_else(|| crate::Error::Config("could not find data directory".into()))?
            .join("subtrack"))
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.storage.cache_ttl_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Override for the data directory (database + fallback file).
    pub data_dir: Option<PathBuf>,

    /// How long the snapshot cache stays fresh, in seconds.
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,
}

fn default_cache_ttl() -> u64 {
    60 // one minute of staleness is invisible for a personal list
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            cache_ttl_secs: default_cache_ttl(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReminderConfig {
    /// Lead days used when a new subscription doesn't specify one.
    #[serde(default = "default_lead_days")]
    pub default_lead_days: u32,

    /// Address reminder emails go to unless a subscription overrides it.
    #[serde(default)]
    pub email: Option<String>,
}

fn default_lead_days() -> u32 {
    3
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            default_lead_days: default_lead_days(),
            email: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Currency symbol used when rendering amounts.
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_currency() -> String {
    "$".to_string()
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            currency: default_currency(),
        }
    }
}
