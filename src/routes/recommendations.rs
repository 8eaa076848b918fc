use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use tracing::info;
use uuid::Uuid;

use crate::db::recommendation_queries;
use crate::errors::AppError;
use crate::models::{CardRecommendation, NewRecommendation};
use crate::services::recommendation_service;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(fetch_recommendations))
        .route("/refresh", post(refresh_recommendations))
        .route("/upgrades", get(fetch_upgrade_options))
        .route("/:id/viewed", post(mark_viewed))
        .route("/:id/dismissed", post(mark_dismissed))
        .route("/:id/applied", post(mark_applied))
}

pub async fn fetch_recommendations(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<CardRecommendation>>, AppError> {
    info!("GET /recommendations - Fetching for user {}", user_id);
    let recommendations = recommendation_queries::fetch_active(&state.pool, user_id).await?;
    Ok(Json(recommendations))
}

pub async fn refresh_recommendations(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Json<Vec<CardRecommendation>> {
    info!("POST /recommendations/refresh - Regenerating for user {}", user_id);
    let recommendations =
        recommendation_service::generate_recommendations(&state.pool, user_id).await;
    Json(recommendations)
}

/// Upgrade options are computed on demand and never persisted.
pub async fn fetch_upgrade_options(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Json<Vec<NewRecommendation>> {
    info!("GET /recommendations/upgrades - Computing for user {}", user_id);
    let upgrades = recommendation_service::find_upgrade_options(&state.pool, user_id).await;
    Json(upgrades)
}

pub async fn mark_viewed(
    State(state): State<AppState>,
    Path((user_id, id)): Path<(Uuid, Uuid)>,
) -> Result<Json<CardRecommendation>, AppError> {
    info!("POST /recommendations/{}/viewed for user {}", id, user_id);
    let rec = recommendation_queries::mark_viewed(&state.pool, user_id, id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(rec))
}

pub async fn mark_dismissed(
    State(state): State<AppState>,
    Path((user_id, id)): Path<(Uuid, Uuid)>,
) -> Result<Json<CardRecommendation>, AppError> {
    info!("POST /recommendations/{}/dismissed for user {}", id, user_id);
    let rec = recommendation_queries::mark_dismissed(&state.pool, user_id, id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(rec))
}

pub async fn mark_applied(
    State(state): State<AppState>,
    Path((user_id, id)): Path<(Uuid, Uuid)>,
) -> Result<Json<CardRecommendation>, AppError> {
    info!("POST /recommendations/{}/applied for user {}", id, user_id);
    let rec = recommendation_queries::mark_applied(&state.pool, user_id, id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(rec))
}
