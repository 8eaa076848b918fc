use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use tracing::info;
use uuid::Uuid;

use crate::db::insight_queries;
use crate::errors::AppError;
use crate::models::{Insight, NextBestAction};
use crate::services::insight_service;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(fetch_insights))
        .route("/refresh", post(refresh_insights))
}

pub fn actions_router() -> Router<AppState> {
    Router::new()
        .route("/", get(fetch_actions))
        .route("/refresh", post(refresh_actions))
}

pub async fn fetch_insights(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<Insight>>, AppError> {
    info!("GET /insights - Fetching for user {}", user_id);
    let insights = insight_queries::fetch_active_insights(&state.pool, user_id).await?;
    Ok(Json(insights))
}

pub async fn refresh_insights(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Json<Vec<Insight>> {
    info!("POST /insights/refresh - Regenerating for user {}", user_id);
    let insights = insight_service::generate_insights(&state.pool, user_id).await;
    Json(insights)
}

pub async fn fetch_actions(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<NextBestAction>>, AppError> {
    info!("GET /actions - Fetching for user {}", user_id);
    let actions = insight_queries::fetch_active_actions(&state.pool, user_id).await?;
    Ok(Json(actions))
}

pub async fn refresh_actions(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Json<Vec<NextBestAction>> {
    info!("POST /actions/refresh - Regenerating for user {}", user_id);
    let actions = insight_service::generate_actions(&state.pool, user_id).await;
    Json(actions)
}
