use axum::extract::{Path, State};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use tracing::{error, info};
use uuid::Uuid;

use crate::db::ledger_queries;
use crate::errors::AppError;
use crate::models::{CreateLedgerEntry, LedgerEntry, UpdateLedgerEntry};
use crate::services::snapshot_service;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_entry).get(fetch_entries))
        .route("/:id", get(get_entry))
        .route("/:id", put(update_entry))
        .route("/:id", delete(delete_entry))
}

fn validate_amount(amount: f64) -> Result<(), AppError> {
    if amount < 0.0 || !amount.is_finite() {
        return Err(AppError::Validation(format!("Invalid amount: {}", amount)));
    }
    Ok(())
}

#[axum::debug_handler]
pub async fn create_entry(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(data): Json<CreateLedgerEntry>,
) -> Result<Json<LedgerEntry>, AppError> {
    info!("POST /ledger - Creating entry for user {}", user_id);
    validate_amount(data.amount)?;
    let entry = ledger_queries::create(&state.pool, user_id, data)
        .await
        .map_err(|e| {
            error!("Failed to create ledger entry: {}", e);
            AppError::from(e)
        })?;
    snapshot_service::spawn_snapshot_refresh(state.pool.clone(), user_id);
    Ok(Json(entry))
}

pub async fn fetch_entries(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<LedgerEntry>>, AppError> {
    info!("GET /ledger - Fetching entries for user {}", user_id);
    let entries = ledger_queries::fetch_active(&state.pool, user_id).await?;
    Ok(Json(entries))
}

pub async fn get_entry(
    State(state): State<AppState>,
    Path((user_id, id)): Path<(Uuid, Uuid)>,
) -> Result<Json<LedgerEntry>, AppError> {
    info!("GET /ledger/{} - Fetching entry for user {}", id, user_id);
    let entry = ledger_queries::fetch_one(&state.pool, id)
        .await?
        .filter(|e| e.user_id == user_id)
        .ok_or(AppError::NotFound)?;
    Ok(Json(entry))
}

pub async fn update_entry(
    State(state): State<AppState>,
    Path((user_id, id)): Path<(Uuid, Uuid)>,
    Json(data): Json<UpdateLedgerEntry>,
) -> Result<Json<LedgerEntry>, AppError> {
    info!("PUT /ledger/{} - Updating entry for user {}", id, user_id);
    if let Some(amount) = data.amount {
        validate_amount(amount)?;
    }
    let entry = ledger_queries::update(&state.pool, user_id, id, data)
        .await
        .map_err(|e| {
            error!("Failed to update ledger entry {}: {}", id, e);
            AppError::from(e)
        })?
        .ok_or(AppError::NotFound)?;
    snapshot_service::spawn_snapshot_refresh(state.pool.clone(), user_id);
    Ok(Json(entry))
}

pub async fn delete_entry(
    State(state): State<AppState>,
    Path((user_id, id)): Path<(Uuid, Uuid)>,
) -> Result<Json<()>, AppError> {
    info!("DELETE /ledger/{} - Deactivating entry for user {}", id, user_id);
    match ledger_queries::deactivate(&state.pool, user_id, id).await {
        Ok(0) => Err(AppError::NotFound),
        Ok(_) => {
            snapshot_service::spawn_snapshot_refresh(state.pool.clone(), user_id);
            Ok(Json(()))
        }
        Err(e) => {
            error!("Failed to deactivate ledger entry {}: {}", id, e);
            Err(AppError::from(e))
        }
    }
}
