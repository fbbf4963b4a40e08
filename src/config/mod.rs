//! # Configuration Management Module
//!
//! Loads and writes the `config.toml` that tells darkadv where adventures live,
//! where saves go, who is playing and how to log.
//!
//! ## Configuration Structure
//!
//! - [`AdventureConfig`] - Adventure folder root and the adventure started by default
//! - [`StorageConfig`] - Save store location and key prefix
//! - [`PlayerConfig`] - Player identity and starting stats
//! - [`LoggingConfig`] - Log level and optional log file
//!
//! ## Usage
//!
//! ```rust,no_run
//! use darkadv::config::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     Config::create_default("config.toml").await?;
//!     let config = Config::load("config.toml").await?;
//!     println!("Adventures in: {}", config.adventure.root);
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration File Format
//!
//! ```toml
//! [adventure]
//! root = "adventures"
//! default_id = "adventure"
//!
//! [storage]
//! save_path = "data/saves"
//! save_prefix = "darkadv_"
//!
//! [player]
//! name = "guest"
//!
//! [player.stats]
//! hp = 12
//! attack = 2
//! defense = 1
//!
//! [logging]
//! level = "info"
//! file = "darkadv.log"
//! ```
//!
//! Every section is optional; missing values take the defaults above.
//! CLI flags override the file.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::adventure::storage::DEFAULT_SAVE_PREFIX;
use crate::adventure::types::Stats;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AdventureConfig {
    /// Folder holding one sub-folder (with a `game.json`) per adventure.
    pub root: String,
    /// Adventure used when `start`/`continue`/`reset` name none.
    pub default_id: String,
}

impl Default for AdventureConfig {
    fn default() -> Self {
        Self {
            root: "adventures".to_string(),
            default_id: "adventure".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
    /// Sled directory for save games.
    pub save_path: String,
    pub save_prefix: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            save_path: "data/saves".to_string(),
            save_prefix: DEFAULT_SAVE_PREFIX.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct PlayerConfig {
    /// Save-key identity; `guest` when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub stats: Stats,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: Some("darkadv.log".to_string()),
        }
    }
}

impl LoggingConfig {
    /// Parsed `level`; unknown names fall back to `info`.
    pub fn level_filter(&self) -> log::LevelFilter {
        self.level.parse().unwrap_or(log::LevelFilter::Info)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub adventure: AdventureConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub player: PlayerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a file
    pub async fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path, e))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| anyhow!("Failed to parse config file {}: {}", path, e))?;
        config.validate()?;

        Ok(config)
    }

    /// Create a default configuration file
    pub async fn create_default(path: &str) -> Result<()> {
        let config = Config::default();
        let content = toml::to_string_pretty(&config)
            .map_err(|e| anyhow!("Failed to serialize default config: {}", e))?;

        fs::write(path, content)
            .await
            .map_err(|e| anyhow!("Failed to write config file {}: {}", path, e))?;

        Ok(())
    }

    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.adventure.root.trim().is_empty() {
            return Err(anyhow!("adventure.root must not be empty"));
        }
        if self.adventure.default_id.trim().is_empty() {
            return Err(anyhow!("adventure.default_id must not be empty"));
        }
        if self.storage.save_path.trim().is_empty() {
            return Err(anyhow!("storage.save_path must not be empty"));
        }
        let stats = &self.player.stats;
        if stats.hp <= 0 {
            return Err(anyhow!("player.stats.hp must be positive (got {})", stats.hp));
        }
        if stats.attack < 0 || stats.defense < 0 {
            return Err(anyhow!(
                "player.stats.attack and defense must not be negative (got {}/{})",
                stats.attack,
                stats.defense
            ));
        }
        Ok(())
    }
}
