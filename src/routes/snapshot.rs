use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use tracing::{error, info};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::FinancialSnapshot;
use crate::services::snapshot_service;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_snapshot))
        .route("/refresh", post(refresh_snapshot))
}

pub async fn get_snapshot(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<FinancialSnapshot>, AppError> {
    info!("GET /snapshot - Fetching snapshot for user {}", user_id);
    let snapshot = snapshot_service::fetch(&state.pool, user_id).await?;
    Ok(Json(snapshot))
}

/// Synchronous recompute, for clients that need the fresh snapshot in the
/// response rather than waiting on the background refresh.
pub async fn refresh_snapshot(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<FinancialSnapshot>, AppError> {
    info!("POST /snapshot/refresh - Regenerating snapshot for user {}", user_id);
    let snapshot = snapshot_service::regenerate(&state.pool, user_id)
        .await
        .map_err(|e| {
            error!("Snapshot regeneration failed for user {}: {}", user_id, e);
            e
        })?;
    Ok(Json(snapshot))
}
