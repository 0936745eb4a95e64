// File: worker/src/config/mod.rs
pub mod manager;
pub mod secrets;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

pub use manager::ConfigManager;

use crate::constants::{apify, batching, defaults, retry};
use crate::database::TrackedServer;
use crate::errors::ConfigError;
use crate::fetcher::RetryPolicy;
use crate::sync::BatchPolicy;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_database_path")]
    pub database_path: String,
    /// 6-field cron expression (sec min hour day month dow)
    #[serde(default = "default_sync_schedule")]
    pub sync_schedule: String,
    #[serde(default)]
    pub run_on_startup: bool,
    pub log_level: Option<String>,
    #[serde(default)]
    pub apify: ApifyConfig,
    #[serde(default)]
    pub sync: SyncConfig,
    /// Servers registered at startup if not tracked yet
    #[serde(default)]
    pub tracked_servers: Vec<TrackedServer>,
    // Populated from secrets.toml / environment
    #[serde(skip)]
    pub credentials: ApifyCredentials,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApifyConfig {
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

impl Default for ApifyConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

impl ApifyConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_batch_cooldown")]
    pub batch_cooldown_seconds: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_base_retry_delay")]
    pub base_retry_delay_ms: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            batch_cooldown_seconds: default_batch_cooldown(),
            max_retries: default_max_retries(),
            base_retry_delay_ms: default_base_retry_delay(),
        }
    }
}

impl SyncConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            base_delay: Duration::from_millis(self.base_retry_delay_ms),
        }
    }

    pub fn batch_policy(&self) -> BatchPolicy {
        BatchPolicy {
            group_size: self.batch_size,
            cooldown: Duration::from_secs(self.batch_cooldown_seconds),
        }
    }
}

/// Apify API credentials. The token is never printed.
#[derive(Clone, Default)]
pub struct ApifyCredentials {
    pub token: String,
    pub actor_id: String,
}

impl fmt::Debug for ApifyCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApifyCredentials")
            .field("token", &"<redacted>")
            .field("actor_id", &self.actor_id)
            .finish()
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "host".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        if self.sync_schedule.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "sync_schedule".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        if self.sync.batch_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "sync.batch_size".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if self.credentials.token.trim().is_empty() {
            return Err(ConfigError::MissingRequired {
                field: "apify.token".to_string(),
            });
        }
        if self.credentials.actor_id.trim().is_empty() {
            return Err(ConfigError::MissingRequired {
                field: "apify.actor_id".to_string(),
            });
        }
        Ok(())
    }
}

fn default_host() -> String {
    defaults::HOST.to_string()
}

fn default_port() -> u16 {
    defaults::PORT
}

fn default_database_path() -> String {
    defaults::DATABASE_PATH.to_string()
}

fn default_sync_schedule() -> String {
    defaults::SYNC_SCHEDULE.to_string()
}

fn default_api_base() -> String {
    apify::DEFAULT_API_BASE.to_string()
}

fn default_request_timeout() -> u64 {
    apify::REQUEST_TIMEOUT.as_secs()
}

fn default_batch_size() -> usize {
    batching::GROUP_SIZE
}

fn default_batch_cooldown() -> u64 {
    batching::GROUP_COOLDOWN.as_secs()
}

fn default_max_retries() -> u32 {
    retry::MAX_RETRIES
}

fn default_base_retry_delay() -> u64 {
    retry::BASE_DELAY_MS
}
