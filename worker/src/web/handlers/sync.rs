// Sync trigger and status endpoints

use axum::{extract::State, http::StatusCode, response::Json};
use serde::Serialize;
use tracing::{error, info, warn};

use super::common::{api_error, ApiResponse, ApiResult};
use crate::cycle_tracker::{ActiveCycle, CycleTrigger};
use crate::database::HourlySummary;
use crate::errors::SyncError;
use crate::sync::{CycleOutcome, CycleReport};
use crate::web::AppState;

#[derive(Debug, Serialize)]
pub struct SyncStatus {
    pub running: Option<ActiveCycle>,
    pub last_outcome: Option<CycleOutcome>,
    pub latest_summary: Option<HourlySummary>,
}

pub async fn health_check() -> &'static str {
    "Discord Counter Worker is running!"
}

/// Run one sync cycle and report its counters. Per-server failures are part
/// of a successful response; only a failed cycle returns 500.
pub async fn trigger_update(State(state): State<AppState>) -> ApiResult<CycleReport> {
    info!("Manual sync requested");

    match state.runner.run(CycleTrigger::Manual).await {
        Ok(report) => Ok(Json(ApiResponse::success(report))),
        Err(SyncError::CycleInProgress { cycle_id }) => {
            warn!("Manual sync rejected: cycle {} is running", cycle_id);
            Err(api_error(
                StatusCode::CONFLICT,
                format!("Sync cycle {} is already running", cycle_id),
            ))
        }
        Err(e) => {
            error!("Error processing manual update: {}", e);
            Err(api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Error processing update: {}", e),
            ))
        }
    }
}

pub async fn sync_status(State(state): State<AppState>) -> ApiResult<SyncStatus> {
    let latest_summary = match state.database.latest_hourly_summaries(1).await {
        Ok(mut summaries) => summaries.pop(),
        Err(e) => {
            error!("Failed to read latest hourly summary: {}", e);
            return Err(api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()));
        }
    };

    Ok(Json(ApiResponse::success(SyncStatus {
        running: state.runner.tracker().current().await,
        last_outcome: state.runner.last_outcome(),
        latest_summary,
    })))
}
