//! Aggregate statistics and hourly summary operations.

use sqlx::Row;
use tracing::{error, info};

use super::records::{from_db_count, to_db_count, Aggregates, HourlySummary};
use super::Database;
use crate::errors::StoreError;

const COMPUTE_AGGREGATES: &str = r#"
    SELECT
        COALESCE(SUM(member_count), 0) AS total_members,
        COALESCE(SUM(presence_count), 0) AS total_presence,
        COUNT(*) AS server_count
    FROM discord_servers
"#;

impl Database {
    pub async fn compute_aggregates(&self) -> Result<Aggregates, StoreError> {
        let row = sqlx::query(COMPUTE_AGGREGATES)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!("Error computing global statistics: {}", e);
                StoreError::query("aggregate discord_servers", e)
            })?;

        Ok(Aggregates {
            total_members: from_db_count("total_members", row.try_get("total_members")?)?,
            total_presence: from_db_count("total_presence", row.try_get("total_presence")?)?,
            server_count: from_db_count("server_count", row.try_get("server_count")?)?,
        })
    }

    /// Appends a row even when one already exists for `hour_bucket`.
    pub async fn append_hourly_summary(
        &self,
        hour_bucket: i64,
        totals: &Aggregates,
        created_at: i64,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO discord_server_hourly_summary (
                hour_timestamp, total_members, total_online, server_count, created_at
            ) VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(hour_bucket)
        .bind(to_db_count("total_members", totals.total_members)?)
        .bind(to_db_count("total_presence", totals.total_presence)?)
        .bind(to_db_count("server_count", totals.server_count)?)
        .bind(created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!("Error updating global statistics: {}", e);
            StoreError::query("insert discord_server_hourly_summary", e)
        })?;

        info!(
            "Updated global statistics: {} members, {} online, {} servers (hour {})",
            totals.total_members, totals.total_presence, totals.server_count, hour_bucket
        );
        Ok(())
    }

    /// Latest summaries, newest first.
    pub async fn latest_hourly_summaries(&self, limit: u32) -> Result<Vec<HourlySummary>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT hour_timestamp, total_members, total_online, server_count, created_at
            FROM discord_server_hourly_summary
            ORDER BY created_at DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::query("select discord_server_hourly_summary", e))?;

        rows.into_iter()
            .map(|row| {
                Ok(HourlySummary {
                    hour_timestamp: row.try_get("hour_timestamp")?,
                    total_members: from_db_count("total_members", row.try_get("total_members")?)?,
                    total_presence: from_db_count("total_online", row.try_get("total_online")?)?,
                    server_count: from_db_count("server_count", row.try_get("server_count")?)?,
                    created_at: row.try_get("created_at")?,
                })
            })
            .collect()
    }
}
