//! Database record types (entities).
//!
//! This module contains all the record structs used by the database layer
//! and by the sync pipeline that produces them.

use serde::{Deserialize, Serialize};

use crate::constants::stats::HOUR_BUCKET_SECONDS;
use crate::errors::StoreError;

// ============================================================================
// Tracked servers and their latest metrics
// ============================================================================

/// A Discord server the worker keeps up to date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedServer {
    pub guild_id: String,
    pub invite_code: String,
}

impl TrackedServer {
    pub fn new(guild_id: impl Into<String>, invite_code: impl Into<String>) -> Self {
        Self {
            guild_id: guild_id.into(),
            invite_code: invite_code.into(),
        }
    }
}

/// Fresh metrics for one server as returned by the actor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerMetrics {
    pub name: String,
    pub icon: Option<String>,
    pub presence_count: u64,
    pub member_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerRecord {
    pub guild_id: String,
    pub invite_code: String,
    /// None until the first successful fetch
    pub metrics: Option<ServerMetrics>,
    pub last_updated: Option<i64>,
    pub data_json: Option<String>,
}

// ============================================================================
// Time series
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub guild_id: String,
    pub presence_count: u64,
    pub member_count: u64,
    pub timestamp: i64,
}

/// Totals across every row of `discord_servers`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aggregates {
    pub total_members: u64,
    pub total_presence: u64,
    pub server_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourlySummary {
    pub hour_timestamp: i64,
    pub total_members: u64,
    pub total_presence: u64,
    pub server_count: u64,
    pub created_at: i64,
}

/// Round a unix timestamp down to the start of its hour.
pub fn hour_bucket(timestamp: i64) -> i64 {
    timestamp.div_euclid(HOUR_BUCKET_SECONDS) * HOUR_BUCKET_SECONDS
}

// SQLite integers are signed; counts are validated at the boundary.
pub(crate) fn to_db_count(field: &str, value: u64) -> Result<i64, StoreError> {
    i64::try_from(value).map_err(|_| StoreError::SerializationError {
        reason: format!("{} {} does not fit in an SQLite integer", field, value),
    })
}

pub(crate) fn from_db_count(field: &str, value: i64) -> Result<u64, StoreError> {
    u64::try_from(value).map_err(|_| StoreError::SerializationError {
        reason: format!("{} is negative in the database: {}", field, value),
    })
}
