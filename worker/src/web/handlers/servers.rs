// Read-only server record endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::Serialize;
use tracing::error;

use super::common::{api_error, ApiResponse, ApiResult, HistoryQuery};
use crate::database::{HistoryEntry, ServerRecord};
use crate::web::AppState;

#[derive(Debug, Serialize)]
pub struct ServerDetails {
    pub record: ServerRecord,
    pub history: Vec<HistoryEntry>,
}

/// Latest record for a server plus its most recent history, oldest first
pub async fn get_server(
    Path(guild_id): Path<String>,
    Query(query): Query<HistoryQuery>,
    State(state): State<AppState>,
) -> ApiResult<ServerDetails> {
    let record = match state.database.get_server_record(&guild_id).await {
        Ok(Some(record)) => record,
        Ok(None) => {
            return Err(api_error(
                StatusCode::NOT_FOUND,
                format!("Server {} is not tracked", guild_id),
            ))
        }
        Err(e) => {
            error!("Failed to load server record {}: {}", guild_id, e);
            return Err(api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()));
        }
    };

    let history = state
        .database
        .get_history(&guild_id, query.limit)
        .await
        .map_err(|e| {
            error!("Failed to load history for {}: {}", guild_id, e);
            api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        })?;

    Ok(Json(ApiResponse::success(ServerDetails { record, history })))
}
