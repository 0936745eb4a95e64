// File: worker/src/fetcher/remote.rs
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, warn};

use super::provider::MetricsProvider;
use crate::constants::retry;
use crate::database::{ServerMetrics, TrackedServer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Delay before the first retry; doubles for each following one
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: retry::MAX_RETRIES,
            base_delay: Duration::from_millis(retry::BASE_DELAY_MS),
        }
    }
}

impl RetryPolicy {
    /// Backoff to wait after the attempt numbered `retry_count` (0-based) failed.
    pub fn delay_for(&self, retry_count: u32) -> Duration {
        self.base_delay
            .saturating_mul(2u32.saturating_pow(retry_count))
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

/// Fetches one server's metrics with bounded retries and exponential backoff.
#[derive(Clone)]
pub struct RemoteFetcher {
    provider: Arc<dyn MetricsProvider>,
    policy: RetryPolicy,
}

impl RemoteFetcher {
    pub fn new(provider: Arc<dyn MetricsProvider>, policy: RetryPolicy) -> Self {
        Self { provider, policy }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Returns `None` once every attempt has failed. Never panics or errors so
    /// the caller can keep processing other servers.
    pub async fn fetch(&self, server: &TrackedServer) -> Option<ServerMetrics> {
        let mut retry_count = 0u32;

        loop {
            debug!(
                guild_id = %server.guild_id,
                invite_code = %server.invite_code,
                retry_count,
                "Fetching server data from Apify"
            );

            match self.provider.request_metrics(server).await {
                Ok(metrics) => {
                    if retry_count > 0 {
                        debug!(
                            guild_id = %server.guild_id,
                            retry_count,
                            "Fetched server data after retrying"
                        );
                    }
                    return Some(metrics);
                }
                Err(e) => {
                    error!(
                        guild_id = %server.guild_id,
                        invite_code = %server.invite_code,
                        retry_count,
                        error = %e,
                        "Error fetching server data"
                    );

                    if retry_count >= self.policy.max_retries {
                        error!(
                            guild_id = %server.guild_id,
                            invite_code = %server.invite_code,
                            attempts = self.policy.max_attempts(),
                            "Giving up on server after {} attempts",
                            self.policy.max_attempts()
                        );
                        return None;
                    }

                    let delay = self.policy.delay_for(retry_count);
                    warn!(
                        guild_id = %server.guild_id,
                        retry_count,
                        "Retrying in {}ms",
                        delay.as_millis()
                    );
                    sleep(delay).await;
                    retry_count += 1;
                }
            }
        }
    }
}
