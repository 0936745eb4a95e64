//! Application-wide constants for batching, retries, timeouts and defaults
//!
//! Organized by category so the pacing of a sync cycle can be read in one place.

use std::time::Duration;

/// Upstream pacing for a sync cycle
pub mod batching {
    use super::Duration;

    /// Number of servers fetched concurrently in one group
    pub const GROUP_SIZE: usize = 10;

    /// Pause between two consecutive groups to respect upstream rate limits
    pub const GROUP_COOLDOWN: Duration = Duration::from_secs(30);
}

/// Retry policy for a single server fetch
pub mod retry {
    /// Retries after the first attempt (4 attempts in total)
    pub const MAX_RETRIES: u32 = 3;

    /// Delay before the first retry, doubled for every following retry
    pub const BASE_DELAY_MS: u64 = 2000;
}

/// Apify actor API
pub mod apify {
    use super::Duration;

    pub const DEFAULT_API_BASE: &str = "https://api.apify.com";

    /// Timeout for a single actor run request
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

    pub const TOKEN_ENV: &str = "APIFY_TOKEN";
    pub const ACTOR_ID_ENV: &str = "APIFY_ACTOR_ID";
}

/// Aggregate statistics
pub mod stats {
    /// Width of an hourly summary bucket in seconds
    pub const HOUR_BUCKET_SECONDS: i64 = 3600;
}

/// Default configuration values
pub mod defaults {
    pub const CONFIG_DIR: &str = "config";
    pub const CONFIG_DIR_ENV: &str = "DISCORD_SYNC_CONFIG_DIR";
    pub const DATABASE_PATH: &str = "data/discord.db";

    /// Top of every hour (sec min hour day month dow)
    pub const SYNC_SCHEDULE: &str = "0 0 * * * *";

    pub const HOST: &str = "0.0.0.0";
    pub const PORT: u16 = 8787;
}

/// Cleanup of cycle guards left behind by a crashed cycle
pub mod cleanup {
    /// How often the stale cycle check runs
    pub const CLEANUP_INTERVAL_SECONDS: u64 = 600;

    /// A cycle holding the guard longer than this is considered stuck
    pub const STALE_CYCLE_HOURS: i64 = 6;
}
