//! Scripted metrics provider for driving the fetch pipeline without HTTP
//!
//! Each guild can be given a queue of results; once the queue is empty the
//! provider falls back to a default success (or failure). Every call is
//! recorded with the tokio clock so paused-time tests can check pacing.

use async_trait::async_trait;
use discord_sync::database::{ServerMetrics, TrackedServer};
use discord_sync::errors::FetchError;
use discord_sync::fetcher::MetricsProvider;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub guild_id: String,
    pub at: Instant,
}

pub struct ScriptedProvider {
    scripts: Mutex<HashMap<String, VecDeque<Result<ServerMetrics, FetchError>>>>,
    always_failing: Mutex<HashSet<String>>,
    succeed_by_default: bool,
    latency: Duration,
    calls: Mutex<Vec<RecordedCall>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedProvider {
    /// Every server answers with `default_metrics(guild_id)`
    pub fn succeeding() -> Self {
        Self::build(true)
    }

    /// Every server answers with a transport error
    pub fn failing() -> Self {
        Self::build(false)
    }

    fn build(succeed_by_default: bool) -> Self {
        Self {
            scripts: Mutex::new(HashMap::new()),
            always_failing: Mutex::new(HashSet::new()),
            succeed_by_default,
            latency: Duration::ZERO,
            calls: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// Each request takes `latency` on the tokio clock
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Queue results for one guild, consumed one per request
    pub fn script(self, guild_id: &str, results: Vec<Result<ServerMetrics, FetchError>>) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(guild_id.to_string(), results.into());
        self
    }

    pub fn fail_always(self, guild_id: &str) -> Self {
        self.always_failing
            .lock()
            .unwrap()
            .insert(guild_id.to_string());
        self
    }

    pub fn default_metrics(guild_id: &str) -> ServerMetrics {
        ServerMetrics {
            name: format!("Server {}", guild_id),
            icon: None,
            presence_count: 10,
            member_count: 100,
        }
    }

    pub fn transport_error() -> FetchError {
        FetchError::Transport {
            reason: "connection reset".to_string(),
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls_for(&self, guild_id: &str) -> Vec<Instant> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| call.guild_id == guild_id)
            .map(|call| call.at)
            .collect()
    }

    /// Highest number of requests observed in flight at once
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn next_result(&self, guild_id: &str) -> Result<ServerMetrics, FetchError> {
        if self.always_failing.lock().unwrap().contains(guild_id) {
            return Err(Self::transport_error());
        }

        let scripted = self
            .scripts
            .lock()
            .unwrap()
            .get_mut(guild_id)
            .and_then(|queue| queue.pop_front());

        match scripted {
            Some(result) => result,
            None if self.succeed_by_default => Ok(Self::default_metrics(guild_id)),
            None => Err(Self::transport_error()),
        }
    }
}

#[async_trait]
impl MetricsProvider for ScriptedProvider {
    async fn request_metrics(&self, server: &TrackedServer) -> Result<ServerMetrics, FetchError> {
        self.calls.lock().unwrap().push(RecordedCall {
            guild_id: server.guild_id.clone(),
            at: Instant::now(),
        });

        let now_in_flight = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now_in_flight, Ordering::SeqCst);

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let result = self.next_result(&server.guild_id);
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}
