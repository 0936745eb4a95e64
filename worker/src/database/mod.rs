//! Database layer for the sync worker.
//!
//! This module provides SQLite persistence for:
//! - Tracked servers and their latest metrics (`discord_servers`)
//! - Per-server history (`discord_server_history`)
//! - Hourly aggregate summaries (`discord_server_hourly_summary`)
//!
//! The module is organized into submodules:
//! - `records` - All record types (entities)
//! - `servers` - Tracked server and server record operations
//! - `history` - History entry operations
//! - `summary` - Aggregate and hourly summary operations
//! - `store` - The `Store` trait the sync pipeline writes through

mod history;
mod records;
mod servers;
mod store;
mod summary;

pub use records::*;
pub use store::Store;

use anyhow::Result;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Sqlite};
use std::path::Path;
use tracing::{error, info};

pub struct Database {
    pool: Pool<Sqlite>,
}

const REQUIRED_TABLES: [&str; 3] = [
    "discord_servers",
    "discord_server_history",
    "discord_server_hourly_summary",
];

impl Database {
    /// Expose pool for integration test queries
    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    pub async fn new(database_path: &str) -> Result<Self> {
        info!("Database path: {}", database_path);

        if let Some(parent) = Path::new(database_path).parent() {
            if let Err(e) = tokio::fs::create_dir_all(parent).await {
                error!("Failed to create parent directory {:?}: {}", parent, e);
                return Err(e.into());
            }
        }

        let database_url = format!("sqlite:{}?mode=rwc", database_path);

        let pool = match SqlitePoolOptions::new().connect(&database_url).await {
            Ok(pool) => {
                info!("Connected to SQLite database");
                pool
            }
            Err(e) => {
                error!("Failed to connect to database: {}", e);
                error!("   Connection URL: {}", database_url);
                return Err(e.into());
            }
        };

        let database = Self::from_pool(pool).await?;

        info!("Database initialized at {}", database_path);
        Ok(database)
    }

    /// Wrap an existing pool, creating tables if needed.
    pub async fn from_pool(pool: Pool<Sqlite>) -> Result<Self> {
        let database = Self { pool };

        if let Err(e) = database.initialize_tables().await {
            error!("Database table initialization failed: {}", e);
            return Err(e);
        }

        database.test_database().await?;
        Ok(database)
    }

    async fn initialize_tables(&self) -> Result<()> {
        let statements = [
            (
                "discord_servers",
                r#"
                CREATE TABLE IF NOT EXISTS discord_servers (
                    guild_id TEXT PRIMARY KEY,
                    invite_code TEXT NOT NULL DEFAULT '',
                    name TEXT,
                    icon TEXT,
                    presence_count INTEGER CHECK (presence_count IS NULL OR presence_count >= 0),
                    member_count INTEGER CHECK (member_count IS NULL OR member_count >= 0),
                    last_updated INTEGER,
                    data_json TEXT
                )
                "#,
            ),
            (
                "discord_server_history",
                r#"
                CREATE TABLE IF NOT EXISTS discord_server_history (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    guild_id TEXT NOT NULL,
                    presence_count INTEGER NOT NULL CHECK (presence_count >= 0),
                    member_count INTEGER NOT NULL CHECK (member_count >= 0),
                    timestamp INTEGER NOT NULL
                )
                "#,
            ),
            (
                "idx_history_guild_timestamp",
                "CREATE INDEX IF NOT EXISTS idx_history_guild_timestamp ON discord_server_history(guild_id, timestamp)",
            ),
            (
                "discord_server_hourly_summary",
                r#"
                CREATE TABLE IF NOT EXISTS discord_server_hourly_summary (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    hour_timestamp INTEGER NOT NULL,
                    total_members INTEGER NOT NULL,
                    total_online INTEGER NOT NULL,
                    server_count INTEGER NOT NULL,
                    created_at INTEGER NOT NULL
                )
                "#,
            ),
            (
                "idx_hourly_summary_hour",
                "CREATE INDEX IF NOT EXISTS idx_hourly_summary_hour ON discord_server_hourly_summary(hour_timestamp DESC)",
            ),
        ];

        for (name, sql) in statements {
            if let Err(e) = sqlx::query(sql).execute(&self.pool).await {
                error!("Failed to create {}: {}", name, e);
                error!("SQL was: {}", sql);
                return Err(e.into());
            }
        }

        info!("Database tables initialized");
        Ok(())
    }

    async fn test_database(&self) -> Result<()> {
        let tables: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type='table' AND name IN ('discord_servers', 'discord_server_history', 'discord_server_hourly_summary')",
        )
        .fetch_all(&self.pool)
        .await?;

        if tables.len() != REQUIRED_TABLES.len() {
            error!(
                "Expected {} tables, found {}: {:?}",
                REQUIRED_TABLES.len(),
                tables.len(),
                tables
            );
            return Err(anyhow::anyhow!("Database tables not properly created"));
        }

        Ok(())
    }
}
