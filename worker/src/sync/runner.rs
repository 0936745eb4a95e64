// File: worker/src/sync/runner.rs
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{oneshot, watch};
use tracing::{error, info, info_span, Instrument};
use uuid::Uuid;

use super::orchestrator::{CycleReport, SyncOrchestrator};
use crate::cycle_tracker::{CycleTracker, CycleTrigger};
use crate::errors::SyncError;

/// Result of the last finished cycle, as exposed on the status endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct CycleOutcome {
    pub cycle_id: String,
    pub trigger: CycleTrigger,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub report: Option<CycleReport>,
    pub error: Option<String>,
}

impl CycleOutcome {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Completion channel of a detached cycle.
pub struct CycleHandle {
    cycle_id: String,
    completion: oneshot::Receiver<Result<CycleReport, SyncError>>,
}

impl CycleHandle {
    pub fn cycle_id(&self) -> &str {
        &self.cycle_id
    }

    pub async fn wait(self) -> Result<CycleReport, SyncError> {
        self.completion.await.unwrap_or_else(|_| {
            Err(SyncError::Other(format!(
                "Sync cycle {} ended without reporting a result",
                self.cycle_id
            )))
        })
    }
}

/// Runs cycles as background tasks detached from whoever triggered them,
/// one at a time.
#[derive(Clone)]
pub struct CycleRunner {
    orchestrator: Arc<SyncOrchestrator>,
    tracker: CycleTracker,
    last_outcome: Arc<watch::Sender<Option<CycleOutcome>>>,
}

impl CycleRunner {
    pub fn new(orchestrator: Arc<SyncOrchestrator>, tracker: CycleTracker) -> Self {
        let (last_outcome, _) = watch::channel(None);
        Self {
            orchestrator,
            tracker,
            last_outcome: Arc::new(last_outcome),
        }
    }

    pub fn tracker(&self) -> &CycleTracker {
        &self.tracker
    }

    pub fn last_outcome(&self) -> Option<CycleOutcome> {
        self.last_outcome.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<CycleOutcome>> {
        self.last_outcome.subscribe()
    }

    /// Run a cycle and wait for it. The cycle keeps running if the caller
    /// stops waiting.
    pub async fn run(&self, trigger: CycleTrigger) -> Result<CycleReport, SyncError> {
        self.spawn_cycle(trigger).await?.wait().await
    }

    /// Start a cycle in the background. Fails immediately with
    /// `SyncError::CycleInProgress` if another cycle is running.
    pub async fn spawn_cycle(&self, trigger: CycleTrigger) -> Result<CycleHandle, SyncError> {
        let cycle_id = Uuid::new_v4().to_string();
        self.tracker.try_start_cycle(&cycle_id, trigger).await?;

        let (completion_tx, completion_rx) = oneshot::channel();
        let runner = self.clone();
        let task_cycle_id = cycle_id.clone();
        let span = info_span!("cycle_runner", trigger = %trigger);

        tokio::spawn(
            async move {
                let cycle_id = task_cycle_id;
                let started_at = Utc::now();

                // Inner task so a panic surfaces as a JoinError and the guard is still released
                let orchestrator = runner.orchestrator.clone();
                let inner_id = cycle_id.clone();
                let cycle = async move { orchestrator.run_cycle_as(&inner_id).await };
                let result = match tokio::spawn(cycle.in_current_span()).await {
                    Ok(result) => result,
                    Err(e) => {
                        error!("Sync cycle {} panicked: {}", cycle_id, e);
                        Err(SyncError::Other(format!("Sync cycle {} panicked", cycle_id)))
                    }
                };

                runner.tracker.finish_cycle(&cycle_id).await;

                let outcome = CycleOutcome {
                    cycle_id: cycle_id.clone(),
                    trigger,
                    started_at,
                    finished_at: Utc::now(),
                    report: result.as_ref().ok().copied(),
                    error: result.as_ref().err().map(|e| e.to_string()),
                };
                runner.last_outcome.send_replace(Some(outcome));

                if completion_tx.send(result).is_err() {
                    info!("Sync cycle {} finished with nobody waiting", cycle_id);
                }
            }
            .instrument(span),
        );

        Ok(CycleHandle {
            cycle_id,
            completion: completion_rx,
        })
    }
}
