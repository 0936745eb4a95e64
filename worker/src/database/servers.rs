//! Tracked server and server record operations.

use sqlx::{Executor, Row, Sqlite};
use tracing::{debug, error};

use super::records::{from_db_count, to_db_count, ServerMetrics, ServerRecord, TrackedServer};
use super::Database;
use crate::errors::StoreError;

const LIST_TRACKED_SERVERS: &str =
    "SELECT guild_id, invite_code FROM discord_servers ORDER BY rowid";

const UPSERT_SERVER_RECORD: &str = r#"
    INSERT INTO discord_servers (
        guild_id, name, icon, presence_count, member_count, last_updated, data_json
    ) VALUES (?, ?, ?, ?, ?, ?, ?)
    ON CONFLICT(guild_id) DO UPDATE SET
        name = excluded.name,
        icon = excluded.icon,
        presence_count = excluded.presence_count,
        member_count = excluded.member_count,
        last_updated = excluded.last_updated,
        data_json = excluded.data_json
"#;

const REGISTER_TRACKED_SERVER: &str = r#"
    INSERT INTO discord_servers (guild_id, invite_code) VALUES (?, ?)
    ON CONFLICT(guild_id) DO UPDATE SET invite_code = excluded.invite_code
"#;

/// Overwrite the metric columns of one server. Usable inside a transaction.
pub(super) async fn upsert_server_record_with<'e, E>(
    executor: E,
    guild_id: &str,
    metrics: &ServerMetrics,
    timestamp: i64,
    data_json: &str,
) -> Result<(), StoreError>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(UPSERT_SERVER_RECORD)
        .bind(guild_id)
        .bind(&metrics.name)
        .bind(&metrics.icon)
        .bind(to_db_count("presence_count", metrics.presence_count)?)
        .bind(to_db_count("member_count", metrics.member_count)?)
        .bind(timestamp)
        .bind(data_json)
        .execute(executor)
        .await
        .map_err(|e| StoreError::query("upsert discord_servers", e))?;
    Ok(())
}

impl Database {
    pub async fn list_tracked_servers(&self) -> Result<Vec<TrackedServer>, StoreError> {
        let rows = sqlx::query(LIST_TRACKED_SERVERS)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!("Error fetching servers from database: {}", e);
                StoreError::query(LIST_TRACKED_SERVERS, e)
            })?;

        let mut servers = Vec::with_capacity(rows.len());
        for row in rows {
            servers.push(TrackedServer {
                guild_id: row.try_get("guild_id")?,
                invite_code: row.try_get("invite_code")?,
            });
        }

        debug!("Loaded {} tracked servers", servers.len());
        Ok(servers)
    }

    pub async fn upsert_server_record(
        &self,
        guild_id: &str,
        metrics: &ServerMetrics,
        timestamp: i64,
        data_json: &str,
    ) -> Result<(), StoreError> {
        match upsert_server_record_with(&self.pool, guild_id, metrics, timestamp, data_json).await
        {
            Ok(()) => {
                debug!(
                    "Updated server data for {}: {} ({} members)",
                    guild_id, metrics.name, metrics.member_count
                );
                Ok(())
            }
            Err(e) => {
                error!("Error updating server data for {}: {}", guild_id, e);
                Err(e)
            }
        }
    }

    /// Start tracking a server, or update its invite code if already tracked.
    /// Metric columns of an existing row are left untouched.
    pub async fn register_tracked_server(&self, server: &TrackedServer) -> Result<(), StoreError> {
        sqlx::query(REGISTER_TRACKED_SERVER)
            .bind(&server.guild_id)
            .bind(&server.invite_code)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::query("register tracked server", e))?;

        debug!("Registered tracked server {}", server.guild_id);
        Ok(())
    }

    pub async fn get_server_record(&self, guild_id: &str) -> Result<Option<ServerRecord>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT guild_id, invite_code, name, icon, presence_count, member_count,
                   last_updated, data_json
            FROM discord_servers
            WHERE guild_id = ?
            "#,
        )
        .bind(guild_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::query("select discord_servers", e))?;

        let Some(row) = row else {
            debug!("No server record found for: {}", guild_id);
            return Ok(None);
        };

        let name: Option<String> = row.try_get("name")?;
        let presence: Option<i64> = row.try_get("presence_count")?;
        let members: Option<i64> = row.try_get("member_count")?;

        let metrics = match (name, presence, members) {
            (Some(name), Some(presence), Some(members)) => Some(ServerMetrics {
                name,
                icon: row.try_get("icon")?,
                presence_count: from_db_count("presence_count", presence)?,
                member_count: from_db_count("member_count", members)?,
            }),
            _ => None,
        };

        Ok(Some(ServerRecord {
            guild_id: row.try_get("guild_id")?,
            invite_code: row.try_get("invite_code")?,
            metrics,
            last_updated: row.try_get("last_updated")?,
            data_json: row.try_get("data_json")?,
        }))
    }
}
