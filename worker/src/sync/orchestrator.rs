// File: worker/src/sync/orchestrator.rs
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

use super::batch::{BatchCoordinator, BatchResults, FetchOutcome};
use crate::database::{hour_bucket, ServerMetrics, Store, TrackedServer};
use crate::errors::{StoreError, SyncError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleReport {
    pub success_count: usize,
    pub error_count: usize,
    pub total_count: usize,
}

/// Steps of one refresh cycle. `Failed` is reachable from any step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleState {
    LoadServers,
    FetchBatch,
    PersistResults,
    UpdateAggregates,
    Done,
    Failed,
}

impl fmt::Display for CycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CycleState::LoadServers => "load_servers",
            CycleState::FetchBatch => "fetch_batch",
            CycleState::PersistResults => "persist_results",
            CycleState::UpdateAggregates => "update_aggregates",
            CycleState::Done => "done",
            CycleState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Drives one full refresh: load, fetch, persist, aggregate.
pub struct SyncOrchestrator {
    store: Arc<dyn Store>,
    coordinator: BatchCoordinator,
}

impl SyncOrchestrator {
    pub fn new(store: Arc<dyn Store>, coordinator: BatchCoordinator) -> Self {
        Self { store, coordinator }
    }

    pub async fn run_cycle(&self) -> Result<CycleReport, SyncError> {
        let cycle_id = Uuid::new_v4().to_string();
        self.run_cycle_as(&cycle_id).await
    }

    /// Run a cycle whose logs carry `cycle_id`.
    pub async fn run_cycle_as(&self, cycle_id: &str) -> Result<CycleReport, SyncError> {
        let span = info_span!("sync_cycle", cycle_id = %cycle_id);

        async {
            info!("Starting Discord server update job");

            let mut state = CycleState::LoadServers;
            match self.drive(&mut state).await {
                Ok(report) => {
                    info!(
                        success_count = report.success_count,
                        error_count = report.error_count,
                        total_count = report.total_count,
                        "Discord server update job complete"
                    );
                    Ok(report)
                }
                Err(e) => {
                    let failed_during = state;
                    state = CycleState::Failed;
                    error!(
                        step = %failed_during,
                        state = %state,
                        error = %e,
                        "Discord server update job failed"
                    );
                    Err(e)
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn drive(&self, state: &mut CycleState) -> Result<CycleReport, SyncError> {
        *state = CycleState::LoadServers;
        let servers = self.store.list_tracked_servers().await?;
        info!(count = servers.len(), "Fetched servers from database");

        *state = CycleState::FetchBatch;
        let results = self.coordinator.fetch_all(&servers).await;

        *state = CycleState::PersistResults;
        let report = self.persist_results(&servers, &results).await;

        *state = CycleState::UpdateAggregates;
        self.update_aggregates().await?;

        *state = CycleState::Done;
        Ok(report)
    }

    async fn persist_results(&self, servers: &[TrackedServer], results: &BatchResults) -> CycleReport {
        let mut report = CycleReport {
            total_count: servers.len(),
            ..CycleReport::default()
        };

        for server in servers {
            match results.outcome(&server.guild_id) {
                FetchOutcome::Fetched(metrics) => match self.persist_server(&server.guild_id, metrics).await {
                    Ok(()) => report.success_count += 1,
                    Err(e) => {
                        report.error_count += 1;
                        error!(
                            guild_id = %server.guild_id,
                            error = %e,
                            "Error updating server in database"
                        );
                    }
                },
                FetchOutcome::NoData => {
                    report.error_count += 1;
                    warn!(guild_id = %server.guild_id, "No data fetched for server, keeping previous record");
                }
                FetchOutcome::NotAttempted => {
                    report.error_count += 1;
                    warn!(guild_id = %server.guild_id, "Server was not attempted in this cycle");
                }
            }
        }

        report
    }

    async fn persist_server(&self, guild_id: &str, metrics: &ServerMetrics) -> Result<(), StoreError> {
        let timestamp = Utc::now().timestamp();
        let data_json = serde_json::to_string(metrics)?;
        self.store
            .persist_snapshot(guild_id, metrics, timestamp, &data_json)
            .await
    }

    async fn update_aggregates(&self) -> Result<(), StoreError> {
        let now = Utc::now().timestamp();
        let totals = self.store.compute_aggregates().await?;
        self.store
            .append_hourly_summary(hour_bucket(now), &totals, now)
            .await
    }
}
