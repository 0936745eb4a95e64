//! The persistence interface consumed by the sync pipeline.

use async_trait::async_trait;
use tracing::{debug, error};

use super::history::append_history_entry_with;
use super::records::{Aggregates, ServerMetrics, TrackedServer};
use super::servers::upsert_server_record_with;
use super::Database;
use crate::errors::StoreError;

#[async_trait]
pub trait Store: Send + Sync {
    async fn list_tracked_servers(&self) -> Result<Vec<TrackedServer>, StoreError>;

    async fn upsert_server_record(
        &self,
        guild_id: &str,
        metrics: &ServerMetrics,
        timestamp: i64,
        data_json: &str,
    ) -> Result<(), StoreError>;

    async fn append_history_entry(
        &self,
        guild_id: &str,
        presence_count: u64,
        member_count: u64,
        timestamp: i64,
    ) -> Result<(), StoreError>;

    async fn compute_aggregates(&self) -> Result<Aggregates, StoreError>;

    async fn append_hourly_summary(
        &self,
        hour_bucket: i64,
        totals: &Aggregates,
        created_at: i64,
    ) -> Result<(), StoreError>;

    /// Record one successful fetch: the server record upsert and its history
    /// row belong together.
    async fn persist_snapshot(
        &self,
        guild_id: &str,
        metrics: &ServerMetrics,
        timestamp: i64,
        data_json: &str,
    ) -> Result<(), StoreError> {
        self.upsert_server_record(guild_id, metrics, timestamp, data_json)
            .await?;
        self.append_history_entry(
            guild_id,
            metrics.presence_count,
            metrics.member_count,
            timestamp,
        )
        .await
    }
}

#[async_trait]
impl Store for Database {
    async fn list_tracked_servers(&self) -> Result<Vec<TrackedServer>, StoreError> {
        Database::list_tracked_servers(self).await
    }

    async fn upsert_server_record(
        &self,
        guild_id: &str,
        metrics: &ServerMetrics,
        timestamp: i64,
        data_json: &str,
    ) -> Result<(), StoreError> {
        Database::upsert_server_record(self, guild_id, metrics, timestamp, data_json).await
    }

    async fn append_history_entry(
        &self,
        guild_id: &str,
        presence_count: u64,
        member_count: u64,
        timestamp: i64,
    ) -> Result<(), StoreError> {
        Database::append_history_entry(self, guild_id, presence_count, member_count, timestamp)
            .await
    }

    async fn compute_aggregates(&self) -> Result<Aggregates, StoreError> {
        Database::compute_aggregates(self).await
    }

    async fn append_hourly_summary(
        &self,
        hour_bucket: i64,
        totals: &Aggregates,
        created_at: i64,
    ) -> Result<(), StoreError> {
        Database::append_hourly_summary(self, hour_bucket, totals, created_at).await
    }

    async fn persist_snapshot(
        &self,
        guild_id: &str,
        metrics: &ServerMetrics,
        timestamp: i64,
        data_json: &str,
    ) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await.map_err(|e| StoreError::ConnectionFailed {
            reason: e.to_string(),
        })?;

        let written = async {
            upsert_server_record_with(&mut *tx, guild_id, metrics, timestamp, data_json).await?;
            append_history_entry_with(
                &mut *tx,
                guild_id,
                metrics.presence_count,
                metrics.member_count,
                timestamp,
            )
            .await
        }
        .await;

        match written {
            Ok(()) => {
                tx.commit()
                    .await
                    .map_err(|e| StoreError::query("commit snapshot", e))?;
                debug!(
                    "Persisted snapshot for {}: {} ({} members)",
                    guild_id, metrics.name, metrics.member_count
                );
                Ok(())
            }
            Err(e) => {
                error!("Error persisting snapshot for {}: {}", guild_id, e);
                if let Err(rollback) = tx.rollback().await {
                    error!("Rollback failed for {}: {}", guild_id, rollback);
                }
                Err(e)
            }
        }
    }
}
