//! Custom error types for the sync worker
//!
//! Provides structured error handling with context for the three failure
//! categories of a sync cycle: upstream fetches, the store, and configuration.

use std::fmt;

/// Main error type for the sync worker
#[derive(Debug)]
pub enum SyncError {
    /// Configuration-related errors
    Config(ConfigError),

    /// Upstream fetch errors (retryable)
    Fetch(FetchError),

    /// Store read/write errors
    Store(StoreError),

    /// A cycle is already running
    CycleInProgress { cycle_id: String },

    /// Other errors with context
    Other(String),
}

/// Configuration error variants
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to load configuration file
    LoadFailed { path: String, reason: String },

    /// Invalid configuration value
    InvalidValue { field: String, reason: String },

    /// Missing required configuration
    MissingRequired { field: String },

    /// Configuration parsing error
    ParseError { reason: String },
}

/// Transient fetch error variants. All of them are retried.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchError {
    /// Request could not be sent or the body could not be read
    Transport { reason: String },

    /// Actor API answered with a non-success status
    HttpStatus { status: u16, body: String },

    /// Actor reported an error in the response body
    ActorError { message: String },

    /// Response body is not a valid metrics payload
    InvalidResponse { reason: String },
}

/// Store error variants
#[derive(Debug)]
pub enum StoreError {
    /// Connection failed
    ConnectionFailed { reason: String },

    /// Query execution failed
    QueryFailed { query: String, reason: String },

    /// Data serialization/deserialization error
    SerializationError { reason: String },
}

impl StoreError {
    pub fn query(query: &str, err: impl fmt::Display) -> Self {
        StoreError::QueryFailed {
            query: query.to_string(),
            reason: err.to_string(),
        }
    }
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncError::Config(e) => write!(f, "Configuration error: {}", e),
            SyncError::Fetch(e) => write!(f, "Fetch error: {}", e),
            SyncError::Store(e) => write!(f, "Store error: {}", e),
            SyncError::CycleInProgress { cycle_id } => {
                write!(f, "Sync cycle {} is already running", cycle_id)
            }
            SyncError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::LoadFailed { path, reason } => {
                write!(f, "Failed to load config from '{}': {}", path, reason)
            }
            ConfigError::InvalidValue { field, reason } => {
                write!(f, "Invalid value for '{}': {}", field, reason)
            }
            ConfigError::MissingRequired { field } => {
                write!(f, "Missing required field: {}", field)
            }
            ConfigError::ParseError { reason } => {
                write!(f, "Failed to parse config: {}", reason)
            }
        }
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Transport { reason } => write!(f, "Apify request failed: {}", reason),
            FetchError::HttpStatus { status, body } => {
                write!(f, "Apify API error: {} {}", status, body)
            }
            FetchError::ActorError { message } => write!(f, "Apify actor error: {}", message),
            FetchError::InvalidResponse { reason } => {
                write!(f, "Invalid API response: {}", reason)
            }
        }
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::ConnectionFailed { reason } => {
                write!(f, "Database connection failed: {}", reason)
            }
            StoreError::QueryFailed { query, reason } => {
                write!(f, "Query '{}' failed: {}", query, reason)
            }
            StoreError::SerializationError { reason } => {
                write!(f, "Serialization error: {}", reason)
            }
        }
    }
}

// Implement std::error::Error
impl std::error::Error for SyncError {}
impl std::error::Error for ConfigError {}
impl std::error::Error for FetchError {}
impl std::error::Error for StoreError {}

impl From<anyhow::Error> for SyncError {
    fn from(err: anyhow::Error) -> Self {
        SyncError::Other(err.to_string())
    }
}

impl From<ConfigError> for SyncError {
    fn from(err: ConfigError) -> Self {
        SyncError::Config(err)
    }
}

impl From<FetchError> for SyncError {
    fn from(err: FetchError) -> Self {
        SyncError::Fetch(err)
    }
}

impl From<StoreError> for SyncError {
    fn from(err: StoreError) -> Self {
        SyncError::Store(err)
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                StoreError::ConnectionFailed {
                    reason: err.to_string(),
                }
            }
            other => StoreError::QueryFailed {
                query: "<unknown>".to_string(),
                reason: other.to_string(),
            },
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::SerializationError {
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_messages_carry_upstream_detail() {
        let err = FetchError::HttpStatus {
            status: 503,
            body: "Service Unavailable".to_string(),
        };
        assert_eq!(err.to_string(), "Apify API error: 503 Service Unavailable");

        let err = FetchError::InvalidResponse {
            reason: "missing guild data".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid API response: missing guild data");
    }

    #[test]
    fn test_store_error_wraps_into_sync_error() {
        let err: SyncError = StoreError::query("SELECT 1", "disk I/O error").into();
        assert!(matches!(err, SyncError::Store(StoreError::QueryFailed { .. })));
        assert_eq!(
            err.to_string(),
            "Store error: Query 'SELECT 1' failed: disk I/O error"
        );
    }

    #[test]
    fn test_pool_timeout_is_a_connection_failure() {
        let err: StoreError = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(err, StoreError::ConnectionFailed { .. }));
    }
}
