//! Configuration types for the medwatch system
//!
//! This module defines all configuration structures used throughout the
//! crate. The configuration is constructed once at process start (from the
//! environment, by the binary) and passed into the runner; core components
//! never read ambient global state.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main medwatch configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Upstream registry query configuration
    pub source: SourceConfig,

    /// Notification channel configuration
    pub notifier: NotifierConfig,

    /// Snapshot store configuration
    pub state_store: StateStoreConfig,

    /// Location cache settings
    #[serde(default)]
    pub cache: CacheConfig,
}

impl WatchConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.source.validate()?;
        self.notifier.validate()?;
        self.state_store.validate()?;
        Ok(())
    }
}

/// Upstream query mode for the registry listing.
///
/// The registry exposes two search modes: by health district or by
/// municipality. Exactly one is selected per deployment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SourceConfig {
    /// Query all doctors in a health district
    District {
        /// District identifier as used by the registry
        district_id: String,
    },

    /// Query all doctors practicing in a municipality
    Municipality {
        /// Municipality code as used by the registry
        code: String,
    },
}

impl SourceConfig {
    /// Validate the source configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            SourceConfig::District { district_id } => {
                if district_id.is_empty() {
                    return Err(crate::Error::config("district_id cannot be empty"));
                }
                Ok(())
            }
            SourceConfig::Municipality { code } => {
                if code.is_empty() {
                    return Err(crate::Error::config("municipality code cannot be empty"));
                }
                Ok(())
            }
        }
    }
}

/// Notification channel configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NotifierConfig {
    /// Telegram channel via the Bot API
    Telegram {
        /// Bot token. Never logged.
        bot_token: String,
        /// Target chat or channel id (e.g. "@my_channel" or "-100123...")
        chat_id: String,
    },
}

impl NotifierConfig {
    /// Validate the notifier configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            NotifierConfig::Telegram { bot_token, chat_id } => {
                if bot_token.is_empty() {
                    return Err(crate::Error::config("Telegram bot token cannot be empty"));
                }
                if chat_id.is_empty() {
                    return Err(crate::Error::config("Telegram chat id cannot be empty"));
                }
                Ok(())
            }
        }
    }
}

/// Snapshot store configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StateStoreConfig {
    /// File-based snapshot store
    File {
        /// Path to the snapshot file
        path: String,
    },

    /// In-memory snapshot store (not persistent; every run bootstraps)
    #[default]
    Memory,
}

impl StateStoreConfig {
    /// Validate the state store configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            StateStoreConfig::File { path } => {
                if path.is_empty() {
                    return Err(crate::Error::config("snapshot file path cannot be empty"));
                }
                Ok(())
            }
            StateStoreConfig::Memory => Ok(()),
        }
    }
}

/// Location cache settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum age of a cached location list, in days.
    ///
    /// Zero or negative forces a detail fetch on every lookup.
    #[serde(default = "default_ttl_days")]
    pub ttl_days: i64,

    /// Pause after every cache-miss detail fetch, in seconds.
    ///
    /// This bounds the outbound request rate to the upstream registry. It
    /// is an explicit rate-limit policy, not incidental.
    #[serde(default = "default_fetch_delay_secs")]
    pub fetch_delay_secs: u64,
}

impl CacheConfig {
    /// Cache TTL in seconds
    pub fn ttl_secs(&self) -> i64 {
        self.ttl_days.saturating_mul(24 * 3600)
    }

    /// Pacing delay as a Duration
    pub fn fetch_delay(&self) -> Duration {
        Duration::from_secs(self.fetch_delay_secs)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_days: default_ttl_days(),
            fetch_delay_secs: default_fetch_delay_secs(),
        }
    }
}

fn default_ttl_days() -> i64 {
    7
}

fn default_fetch_delay_secs() -> u64 {
    1
}
