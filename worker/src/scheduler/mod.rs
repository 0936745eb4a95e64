//! Cron-based scheduling of sync cycles
//!
//! # Features
//!
//! - **Cron-based scheduling**: Uses 6-field cron expressions (sec min hour day month dow)
//! - **Detached runs**: A tick starts the cycle as a background task and returns;
//!   a watcher logs the outcome when the cycle's completion channel fires
//! - **Overlap prevention**: A tick is skipped while a previous cycle is still running
//!
//! # Configuration
//!
//! ```toml
//! # config/main.toml
//! sync_schedule = "0 0 * * * *"  # Top of every hour
//! ```

pub mod sync_job;

pub use sync_job::{trigger_scheduled_cycle, validate_6_field_cron, SyncScheduler};
