// File: worker/src/sync/batch.rs
use futures::future::join_all;
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug_span, error, info, Instrument};

use crate::constants::batching;
use crate::database::{ServerMetrics, TrackedServer};
use crate::fetcher::RemoteFetcher;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchPolicy {
    /// Servers fetched concurrently per group
    pub group_size: usize,
    /// Pause between consecutive groups
    pub cooldown: Duration,
}

impl Default for BatchPolicy {
    fn default() -> Self {
        Self {
            group_size: batching::GROUP_SIZE,
            cooldown: batching::GROUP_COOLDOWN,
        }
    }
}

/// What a batch run knows about one guild.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome<'a> {
    Fetched(&'a ServerMetrics),
    /// Attempted, every retry failed
    NoData,
    NotAttempted,
}

/// Keyed fetch results. A guild mapped to `None` was attempted without data;
/// a guild missing from the map was never attempted.
#[derive(Debug, Default)]
pub struct BatchResults {
    results: HashMap<String, Option<ServerMetrics>>,
    groups: usize,
}

impl BatchResults {
    pub fn outcome(&self, guild_id: &str) -> FetchOutcome<'_> {
        match self.results.get(guild_id) {
            Some(Some(metrics)) => FetchOutcome::Fetched(metrics),
            Some(None) => FetchOutcome::NoData,
            None => FetchOutcome::NotAttempted,
        }
    }

    pub fn metrics(&self, guild_id: &str) -> Option<&ServerMetrics> {
        self.results.get(guild_id).and_then(Option::as_ref)
    }

    pub fn attempted(&self) -> usize {
        self.results.len()
    }

    pub fn fetched(&self) -> usize {
        self.results.values().filter(|m| m.is_some()).count()
    }

    pub fn guild_ids(&self) -> impl Iterator<Item = &str> {
        self.results.keys().map(String::as_str)
    }

    /// Number of groups the input was split into
    pub fn groups(&self) -> usize {
        self.groups
    }

    /// Number of cooldowns inserted between groups
    pub fn cooldowns(&self) -> usize {
        self.groups.saturating_sub(1)
    }

    pub fn into_map(self) -> HashMap<String, Option<ServerMetrics>> {
        self.results
    }
}

/// Fetches servers in fixed-size concurrent groups separated by a cooldown.
#[derive(Clone)]
pub struct BatchCoordinator {
    fetcher: RemoteFetcher,
    policy: BatchPolicy,
}

impl BatchCoordinator {
    pub fn new(fetcher: RemoteFetcher, policy: BatchPolicy) -> Self {
        Self { fetcher, policy }
    }

    pub fn policy(&self) -> BatchPolicy {
        self.policy
    }

    /// Groups run strictly in input order; group `i + 1` starts only after
    /// every fetch of group `i` has settled.
    pub async fn fetch_all(&self, servers: &[TrackedServer]) -> BatchResults {
        let total_servers = servers.len();
        let groups: Vec<&[TrackedServer]> = servers.chunks(self.policy.group_size.max(1)).collect();
        let group_count = groups.len();
        let mut results = HashMap::with_capacity(total_servers);

        for (batch_index, group) in groups.into_iter().enumerate() {
            info!(
                batch_index,
                batch_size = group.len(),
                total_servers,
                "Processing server batch {}/{}",
                batch_index + 1,
                group_count
            );

            let tasks = group.iter().cloned().map(|server| {
                let fetcher = self.fetcher.clone();
                let span = debug_span!("fetch", guild_id = %server.guild_id);
                tokio::spawn(
                    async move {
                        let metrics = fetcher.fetch(&server).await;
                        (server.guild_id, metrics)
                    }
                    .instrument(span),
                )
            });

            let settled = join_all(tasks).await;
            for (server, joined) in group.iter().zip(settled) {
                match joined {
                    Ok((guild_id, metrics)) => {
                        results.insert(guild_id, metrics);
                    }
                    Err(e) => {
                        error!(guild_id = %server.guild_id, "Fetch task panicked: {}", e);
                        results.insert(server.guild_id.clone(), None);
                    }
                }
            }

            if batch_index + 1 < group_count {
                info!(
                    "Batch {} done, waiting {}s before the next batch",
                    batch_index + 1,
                    self.policy.cooldown.as_secs()
                );
                sleep(self.policy.cooldown).await;
            }
        }

        BatchResults {
            results,
            groups: group_count,
        }
    }
}
