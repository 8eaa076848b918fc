use axum::extract::{Path, State};
use axum::routing::{get, put};
use axum::{Json, Router};
use tracing::{error, info};
use uuid::Uuid;

use crate::db::profile_queries;
use crate::errors::AppError;
use crate::models::{UpsertProfile, UserProfile};
use crate::services::snapshot_service;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(get_profile).put(upsert_profile))
}

pub async fn get_profile(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<UserProfile>, AppError> {
    info!("GET /profile - Fetching profile for user {}", user_id);
    let profile = profile_queries::fetch_for_user(&state.pool, user_id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(profile))
}

pub async fn upsert_profile(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(data): Json<UpsertProfile>,
) -> Result<Json<UserProfile>, AppError> {
    info!("PUT /profile - Upserting profile for user {}", user_id);
    if let Some(income) = data.declared_monthly_income {
        if income < 0.0 || !income.is_finite() {
            return Err(AppError::Validation(format!("Invalid declared income: {}", income)));
        }
    }
    let profile = profile_queries::upsert(&state.pool, user_id, data)
        .await
        .map_err(|e| {
            error!("Failed to upsert profile for user {}: {}", user_id, e);
            AppError::from(e)
        })?;
    snapshot_service::spawn_snapshot_refresh(state.pool.clone(), user_id);
    Ok(Json(profile))
}
