//! Store doubles for sync pipeline tests
//!
//! `MemoryStore` keeps everything in memory, so it works under a paused tokio
//! clock where a SQLite pool would time out. `FailingStore` wraps any store
//! and injects write failures.

use async_trait::async_trait;
use discord_sync::database::{Aggregates, HistoryEntry, ServerMetrics, Store, TrackedServer};
use discord_sync::errors::StoreError;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq)]
pub struct StoredRecord {
    pub metrics: ServerMetrics,
    pub last_updated: i64,
    pub data_json: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredSummary {
    pub hour_bucket: i64,
    pub totals: Aggregates,
    pub created_at: i64,
}

#[derive(Default)]
pub struct MemoryStore {
    servers: Vec<TrackedServer>,
    records: Mutex<HashMap<String, StoredRecord>>,
    history: Mutex<Vec<HistoryEntry>>,
    summaries: Mutex<Vec<StoredSummary>>,
}

impl MemoryStore {
    pub fn with_servers(servers: Vec<TrackedServer>) -> Self {
        Self {
            servers,
            ..Self::default()
        }
    }

    pub fn record(&self, guild_id: &str) -> Option<StoredRecord> {
        self.records.lock().unwrap().get(guild_id).cloned()
    }

    pub fn record_count(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    pub fn history(&self) -> Vec<HistoryEntry> {
        self.history.lock().unwrap().clone()
    }

    pub fn summaries(&self) -> Vec<StoredSummary> {
        self.summaries.lock().unwrap().clone()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn list_tracked_servers(&self) -> Result<Vec<TrackedServer>, StoreError> {
        Ok(self.servers.clone())
    }

    async fn upsert_server_record(
        &self,
        guild_id: &str,
        metrics: &ServerMetrics,
        timestamp: i64,
        data_json: &str,
    ) -> Result<(), StoreError> {
        self.records.lock().unwrap().insert(
            guild_id.to_string(),
            StoredRecord {
                metrics: metrics.clone(),
                last_updated: timestamp,
                data_json: data_json.to_string(),
            },
        );
        Ok(())
    }

    async fn append_history_entry(
        &self,
        guild_id: &str,
        presence_count: u64,
        member_count: u64,
        timestamp: i64,
    ) -> Result<(), StoreError> {
        self.history.lock().unwrap().push(HistoryEntry {
            guild_id: guild_id.to_string(),
            presence_count,
            member_count,
            timestamp,
        });
        Ok(())
    }

    async fn compute_aggregates(&self) -> Result<Aggregates, StoreError> {
        let records = self.records.lock().unwrap();
        Ok(Aggregates {
            total_members: records.values().map(|r| r.metrics.member_count).sum(),
            total_presence: records.values().map(|r| r.metrics.presence_count).sum(),
            server_count: self.servers.len() as u64,
        })
    }

    async fn append_hourly_summary(
        &self,
        hour_bucket: i64,
        totals: &Aggregates,
        created_at: i64,
    ) -> Result<(), StoreError> {
        self.summaries.lock().unwrap().push(StoredSummary {
            hour_bucket,
            totals: *totals,
            created_at,
        });
        Ok(())
    }
}

/// Delegates to `inner`, failing the operations it is told to fail
pub struct FailingStore {
    inner: Arc<dyn Store>,
    failing_guilds: HashSet<String>,
    fail_listing: bool,
    fail_summary: bool,
    persist_attempts: Mutex<Vec<String>>,
}

impl FailingStore {
    pub fn wrap(inner: Arc<dyn Store>) -> Self {
        Self {
            inner,
            failing_guilds: HashSet::new(),
            fail_listing: false,
            fail_summary: false,
            persist_attempts: Mutex::new(Vec::new()),
        }
    }

    /// Fail every snapshot write for `guild_id`
    pub fn fail_persist_for(mut self, guild_id: &str) -> Self {
        self.failing_guilds.insert(guild_id.to_string());
        self
    }

    pub fn fail_listing(mut self) -> Self {
        self.fail_listing = true;
        self
    }

    pub fn fail_summary(mut self) -> Self {
        self.fail_summary = true;
        self
    }

    pub fn persist_attempts(&self) -> Vec<String> {
        self.persist_attempts.lock().unwrap().clone()
    }

    fn injected(query: &str) -> StoreError {
        StoreError::QueryFailed {
            query: query.to_string(),
            reason: "injected failure".to_string(),
        }
    }
}

#[async_trait]
impl Store for FailingStore {
    async fn list_tracked_servers(&self) -> Result<Vec<TrackedServer>, StoreError> {
        if self.fail_listing {
            return Err(Self::injected("select discord_servers"));
        }
        self.inner.list_tracked_servers().await
    }

    async fn upsert_server_record(
        &self,
        guild_id: &str,
        metrics: &ServerMetrics,
        timestamp: i64,
        data_json: &str,
    ) -> Result<(), StoreError> {
        self.inner
            .upsert_server_record(guild_id, metrics, timestamp, data_json)
            .await
    }

    async fn append_history_entry(
        &self,
        guild_id: &str,
        presence_count: u64,
        member_count: u64,
        timestamp: i64,
    ) -> Result<(), StoreError> {
        if self.failing_guilds.contains(guild_id) {
            return Err(Self::injected("insert discord_server_history"));
        }
        self.inner
            .append_history_entry(guild_id, presence_count, member_count, timestamp)
            .await
    }

    async fn compute_aggregates(&self) -> Result<Aggregates, StoreError> {
        self.inner.compute_aggregates().await
    }

    async fn append_hourly_summary(
        &self,
        hour_bucket: i64,
        totals: &Aggregates,
        created_at: i64,
    ) -> Result<(), StoreError> {
        if self.fail_summary {
            return Err(Self::injected("insert discord_server_hourly_summary"));
        }
        self.inner
            .append_hourly_summary(hour_bucket, totals, created_at)
            .await
    }

    // Fails before delegating, so the inner store never sees the write.
    async fn persist_snapshot(
        &self,
        guild_id: &str,
        metrics: &ServerMetrics,
        timestamp: i64,
        data_json: &str,
    ) -> Result<(), StoreError> {
        self.persist_attempts
            .lock()
            .unwrap()
            .push(guild_id.to_string());

        if self.failing_guilds.contains(guild_id) {
            return Err(Self::injected("insert discord_server_history"));
        }
        self.inner
            .persist_snapshot(guild_id, metrics, timestamp, data_json)
            .await
    }
}
