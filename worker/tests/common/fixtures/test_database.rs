//! Test database utilities for in-memory SQLite testing

use anyhow::Result;
use discord_sync::database::{Database, TrackedServer};
use sqlx::sqlite::SqlitePoolOptions;
use std::sync::Arc;

/// Test database wrapper for in-memory SQLite
pub struct TestDatabase {
    database: Arc<Database>,
}

impl TestDatabase {
    /// Create a new in-memory test database with the worker's schema
    pub async fn new() -> Result<Self> {
        // A single connection keeps every query on the same in-memory database
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;

        let database = Database::from_pool(pool).await?;
        Ok(Self {
            database: Arc::new(database),
        })
    }

    /// Create a database already tracking `servers`
    pub async fn with_servers(servers: &[TrackedServer]) -> Result<Self> {
        let db = Self::new().await?;
        for server in servers {
            db.database.register_tracked_server(server).await?;
        }
        Ok(db)
    }

    pub fn database(&self) -> Arc<Database> {
        self.database.clone()
    }

    pub fn pool(&self) -> &sqlx::SqlitePool {
        self.database.pool()
    }

    pub async fn count_rows(&self, table: &str) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(self.pool())
            .await?;
        Ok(count)
    }
}
