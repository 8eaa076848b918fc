use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use tracing::{error, info};
use uuid::Uuid;

use crate::db::deal_queries;
use crate::errors::AppError;
use crate::models::{Deal, DealMatch, PersonalizedDealsParams};
use crate::services::deal_service;
use crate::state::AppState;

const DEFAULT_PERSONALIZED_LIMIT: i64 = 10;

/// Public deal endpoints, not user-scoped.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(fetch_deals))
        .route("/featured", get(fetch_featured))
        .route("/:id", get(get_deal))
        .route("/:id/click", post(record_click))
        .route("/:id/redeem", post(redeem_deal))
}

/// User-scoped deal endpoints.
pub fn user_router() -> Router<AppState> {
    Router::new()
        .route("/personalized", get(fetch_personalized))
        .route("/:deal_id/match", get(match_deal))
}

pub async fn fetch_deals(State(state): State<AppState>) -> Result<Json<Vec<Deal>>, AppError> {
    info!("GET /deals - Fetching active deals");
    let deals = deal_queries::fetch_active(&state.pool).await?;
    Ok(Json(deals))
}

pub async fn fetch_featured(State(state): State<AppState>) -> Result<Json<Vec<Deal>>, AppError> {
    info!("GET /deals/featured - Fetching featured deals");
    let deals = deal_queries::fetch_featured(&state.pool).await?;
    Ok(Json(deals))
}

/// Fetching a deal counts as a view. The counter write is best effort.
pub async fn get_deal(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Deal>, AppError> {
    info!("GET /deals/{} - Fetching deal", id);
    let deal = deal_queries::fetch_one(&state.pool, id)
        .await?
        .ok_or(AppError::NotFound)?;
    if let Err(e) = deal_queries::increment_views(&state.pool, id).await {
        error!("Failed to record view for deal {}: {}", id, e);
    }
    Ok(Json(deal))
}

pub async fn record_click(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<()>, AppError> {
    info!("POST /deals/{}/click", id);
    match deal_queries::increment_clicks(&state.pool, id).await? {
        0 => Err(AppError::NotFound),
        _ => Ok(Json(())),
    }
}

pub async fn redeem_deal(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<()>, AppError> {
    info!("POST /deals/{}/redeem", id);
    deal_service::redeem(&state.pool, id).await?;
    Ok(Json(()))
}

pub async fn fetch_personalized(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Query(params): Query<PersonalizedDealsParams>,
) -> Json<Vec<Deal>> {
    info!("GET /deals/personalized - Ranking deals for user {}", user_id);
    let limit = params.limit.unwrap_or(DEFAULT_PERSONALIZED_LIMIT);
    let deals = deal_service::get_personalized_deals(&state.pool, user_id, limit).await;
    Json(deals)
}

pub async fn match_deal(
    State(state): State<AppState>,
    Path((user_id, deal_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<DealMatch>, AppError> {
    info!("GET /deals/{}/match - Matching for user {}", deal_id, user_id);
    let matched = deal_service::match_deal_for_user(&state.pool, user_id, deal_id).await?;
    Ok(Json(matched))
}
