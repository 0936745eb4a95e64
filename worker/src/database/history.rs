//! History entry operations.

use sqlx::{Executor, Row, Sqlite};
use tracing::{debug, error};

use super::records::{from_db_count, to_db_count, HistoryEntry};
use super::Database;
use crate::errors::StoreError;

const APPEND_HISTORY_ENTRY: &str = r#"
    INSERT INTO discord_server_history (
        guild_id, presence_count, member_count, timestamp
    ) VALUES (?, ?, ?, ?)
"#;

pub(super) async fn append_history_entry_with<'e, E>(
    executor: E,
    guild_id: &str,
    presence_count: u64,
    member_count: u64,
    timestamp: i64,
) -> Result<(), StoreError>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(APPEND_HISTORY_ENTRY)
        .bind(guild_id)
        .bind(to_db_count("presence_count", presence_count)?)
        .bind(to_db_count("member_count", member_count)?)
        .bind(timestamp)
        .execute(executor)
        .await
        .map_err(|e| StoreError::query("insert discord_server_history", e))?;
    Ok(())
}

impl Database {
    pub async fn append_history_entry(
        &self,
        guild_id: &str,
        presence_count: u64,
        member_count: u64,
        timestamp: i64,
    ) -> Result<(), StoreError> {
        match append_history_entry_with(&self.pool, guild_id, presence_count, member_count, timestamp)
            .await
        {
            Ok(()) => {
                debug!("Added history entry for {} at {}", guild_id, timestamp);
                Ok(())
            }
            Err(e) => {
                error!("Error adding history entry for {}: {}", guild_id, e);
                Err(e)
            }
        }
    }

    /// Most recent `limit` history entries for a server, oldest first.
    pub async fn get_history(&self, guild_id: &str, limit: u32) -> Result<Vec<HistoryEntry>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT guild_id, presence_count, member_count, timestamp FROM (
                SELECT id, guild_id, presence_count, member_count, timestamp
                FROM discord_server_history
                WHERE guild_id = ?
                ORDER BY timestamp DESC, id DESC
                LIMIT ?
            )
            ORDER BY timestamp ASC, id ASC
            "#,
        )
        .bind(guild_id)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::query("select discord_server_history", e))?;

        rows.into_iter()
            .map(|row| {
                Ok(HistoryEntry {
                    guild_id: row.try_get("guild_id")?,
                    presence_count: from_db_count("presence_count", row.try_get("presence_count")?)?,
                    member_count: from_db_count("member_count", row.try_get("member_count")?)?,
                    timestamp: row.try_get("timestamp")?,
                })
            })
            .collect()
    }
}
