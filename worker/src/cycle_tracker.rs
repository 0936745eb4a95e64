//! Tracking of the running sync cycle
//!
//! The sync pipeline does not prevent two cycles from overlapping (a manual
//! trigger racing the cron job, for example). This tracker is the guard in
//! front of it: at most one cycle is active per process.
//!
//! # Usage
//!
//! ```ignore
//! // Fails with SyncError::CycleInProgress if another cycle holds the guard
//! tracker.try_start_cycle(&cycle_id, CycleTrigger::Manual).await?;
//!
//! // Run the cycle...
//!
//! tracker.finish_cycle(&cycle_id).await;
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, instrument, warn};

use crate::errors::SyncError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleTrigger {
    Manual,
    Scheduled,
    Startup,
}

impl fmt::Display for CycleTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CycleTrigger::Manual => f.write_str("manual"),
            CycleTrigger::Scheduled => f.write_str("scheduled"),
            CycleTrigger::Startup => f.write_str("startup"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ActiveCycle {
    pub cycle_id: String,
    pub trigger: CycleTrigger,
    pub started_at: DateTime<Utc>,
}

#[derive(Clone, Default)]
pub struct CycleTracker {
    active: Arc<RwLock<Option<ActiveCycle>>>,
}

impl CycleTracker {
    pub fn new() -> Self {
        Self::default()
    }

    #[instrument(skip(self), fields(cycle_id = %cycle_id, trigger = %trigger))]
    pub async fn try_start_cycle(&self, cycle_id: &str, trigger: CycleTrigger) -> Result<(), SyncError> {
        let mut active = self.active.write().await;

        if let Some(current) = active.as_ref() {
            let minutes = Utc::now()
                .signed_duration_since(current.started_at)
                .num_minutes();
            warn!(
                "Cycle {} ({}) is already running for {}m",
                current.cycle_id, current.trigger, minutes
            );
            return Err(SyncError::CycleInProgress {
                cycle_id: current.cycle_id.clone(),
            });
        }

        *active = Some(ActiveCycle {
            cycle_id: cycle_id.to_string(),
            trigger,
            started_at: Utc::now(),
        });
        info!("Started {} sync cycle {}", trigger, cycle_id);
        Ok(())
    }

    /// Release the guard if `cycle_id` still holds it
    #[instrument(skip(self), fields(cycle_id = %cycle_id))]
    pub async fn finish_cycle(&self, cycle_id: &str) {
        let mut active = self.active.write().await;
        if active.as_ref().map(|c| c.cycle_id.as_str()) == Some(cycle_id) {
            if let Some(cycle) = active.take() {
                let duration = Utc::now().signed_duration_since(cycle.started_at);
                info!(
                    "Finished {} sync cycle {} (took {}s)",
                    cycle.trigger,
                    cycle_id,
                    duration.num_seconds()
                );
            }
        }
    }

    pub async fn current(&self) -> Option<ActiveCycle> {
        self.active.read().await.clone()
    }

    pub async fn is_busy(&self) -> bool {
        self.active.read().await.is_some()
    }

    /// Release a guard held longer than `max_hours`. Returns true if one was released.
    pub async fn release_stale_cycle(&self, max_hours: i64) -> bool {
        let mut active = self.active.write().await;
        let cutoff = Utc::now() - chrono::Duration::hours(max_hours);

        match active.as_ref() {
            Some(cycle) if cycle.started_at <= cutoff => {
                warn!(
                    "Released stuck {} cycle {} (started at {})",
                    cycle.trigger, cycle.cycle_id, cycle.started_at
                );
                *active = None;
                true
            }
            _ => false,
        }
    }
}
