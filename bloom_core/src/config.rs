//! Configuration file support for Bloom.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/bloom/config.toml`.

use crate::cycle::DEFAULT_CYCLE_LENGTH;
use crate::ledger::DEFAULT_STREAK_BONUS_THRESHOLD;
use crate::session::{DEFAULT_EXTEND_SECONDS, DEFAULT_STREAK_BONUS_PERCENT};
use crate::{Error, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub cycle: CycleConfig,

    #[serde(default)]
    pub session: SessionConfig,
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

impl DataConfig {
    /// Persisted ledger record
    pub fn state_path(&self) -> PathBuf {
        self.data_dir.join("state.json")
    }

    /// Workout journal
    pub fn journal_path(&self) -> PathBuf {
        self.data_dir.join("journal.jsonl")
    }
}

/// Cycle calendar configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CycleConfig {
    #[serde(default = "default_cycle_length")]
    pub length_days: u32,

    /// Anchor used when none has been recorded in the ledger
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            length_days: default_cycle_length(),
            start_date: None,
        }
    }
}

/// Workout session parameters
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    #[serde(default = "default_extend_seconds")]
    pub extend_seconds: u32,

    #[serde(default = "default_streak_bonus_threshold")]
    pub streak_bonus_threshold: u32,

    #[serde(default = "default_streak_bonus_percent")]
    pub streak_bonus_percent: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            extend_seconds: default_extend_seconds(),
            streak_bonus_threshold: default_streak_bonus_threshold(),
            streak_bonus_percent: default_streak_bonus_percent(),
        }
    }
}

impl SessionConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));
    base.join("bloom")
}

fn default_cycle_length() -> u32 {
    DEFAULT_CYCLE_LENGTH
}

fn default_tick_interval_ms() -> u64 {
    1000
}

fn default_extend_seconds() -> u32 {
    DEFAULT_EXTEND_SECONDS
}

fn default_streak_bonus_threshold() -> u32 {
    DEFAULT_STREAK_BONUS_THRESHOLD
}

fn default_streak_bonus_percent() -> u32 {
    DEFAULT_STREAK_BONUS_PERCENT
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
        base.join("bloom").join("config.toml")
    }

    /// Reject values the session and cycle code cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.cycle.length_days == 0 {
            return Err(Error::Config("cycle.length_days must be at least 1".into()));
        }
        if self.session.tick_interval_ms == 0 {
            return Err(Error::Config(
                "session.tick_interval_ms must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
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
