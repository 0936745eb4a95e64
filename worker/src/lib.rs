pub mod config;
pub mod constants;
pub mod cycle_tracker;
pub mod database;
pub mod errors;
pub mod fetcher;
pub mod scheduler;
pub mod sync;
pub mod web;

// Re-export commonly used types
pub use config::{Config, ConfigManager};
pub use cycle_tracker::{CycleTracker, CycleTrigger};
pub use database::{Database, Store, TrackedServer};
pub use errors::{ConfigError, FetchError, StoreError, SyncError};
pub use fetcher::{ApifyProvider, MetricsProvider, RemoteFetcher, RetryPolicy};
pub use scheduler::SyncScheduler;
pub use sync::{BatchCoordinator, CycleReport, CycleRunner, SyncOrchestrator};
