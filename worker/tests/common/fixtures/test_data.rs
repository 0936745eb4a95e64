//! Common test data and constants

use discord_sync::database::{ServerMetrics, TrackedServer};
use discord_sync::fetcher::RetryPolicy;
use discord_sync::sync::BatchPolicy;
use serde_json::{json, Value};
use std::time::Duration;

/// Tracked servers `guild-0 .. guild-{count-1}` with matching invite codes
pub fn tracked_servers(count: usize) -> Vec<TrackedServer> {
    (0..count).map(tracked_server).collect()
}

pub fn tracked_server(index: usize) -> TrackedServer {
    TrackedServer::new(format!("guild-{}", index), format!("invite-{}", index))
}

pub fn metrics(name: &str, presence_count: u64, member_count: u64) -> ServerMetrics {
    ServerMetrics {
        name: name.to_string(),
        icon: Some(format!("{}-icon", name)),
        presence_count,
        member_count,
    }
}

/// Body of a successful actor run
pub fn actor_payload(name: &str, presence_count: i64, member_count: i64) -> Value {
    json!({
        "data": {
            "guild": { "name": name, "icon": "icon-hash" },
            "presence_count": presence_count,
            "member_count": member_count
        }
    })
}

/// No waiting between retries
pub fn instant_retries() -> RetryPolicy {
    RetryPolicy {
        max_retries: 3,
        base_delay: Duration::ZERO,
    }
}

/// No waiting between groups
pub fn instant_batches() -> BatchPolicy {
    BatchPolicy {
        group_size: 10,
        cooldown: Duration::ZERO,
    }
}

/// Assert a virtual-time measurement, allowing for timer wheel rounding
pub fn assert_elapsed(actual: Duration, expected: Duration) {
    assert!(
        actual >= expected && actual < expected + Duration::from_millis(50),
        "expected ~{:?}, got {:?}",
        expected,
        actual
    );
}

/// Common test identifiers
pub mod apify {
    pub const TOKEN: &str = "test-token";
    pub const ACTOR_ID: &str = "discord~server-stats";
}
