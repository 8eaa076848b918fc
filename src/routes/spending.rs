use axum::extract::{Path, State};
use axum::routing::{get, put};
use axum::{Json, Router};
use tracing::{error, info};
use uuid::Uuid;

use crate::db::spending_queries;
use crate::errors::AppError;
use crate::models::{SpendingCategoryAggregate, UpsertSpending};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(fetch_spending).put(upsert_spending))
        .route("/top", get(fetch_top_categories))
}

pub async fn fetch_spending(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<SpendingCategoryAggregate>>, AppError> {
    info!("GET /spending - Fetching aggregates for user {}", user_id);
    let aggregates = spending_queries::fetch_for_user(&state.pool, user_id).await?;
    Ok(Json(aggregates))
}

pub async fn fetch_top_categories(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<SpendingCategoryAggregate>>, AppError> {
    info!("GET /spending/top - Fetching top categories for user {}", user_id);
    let aggregates = spending_queries::fetch_top_categories(&state.pool, user_id, 5).await?;
    Ok(Json(aggregates))
}

pub async fn upsert_spending(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(data): Json<UpsertSpending>,
) -> Result<Json<SpendingCategoryAggregate>, AppError> {
    info!("PUT /spending - Upserting {} for user {}", data.category, user_id);
    if data.current_month_spend < 0.0 || data.previous_month_spend < 0.0 {
        return Err(AppError::Validation("Spend figures must be non-negative".to_string()));
    }
    let aggregate = spending_queries::upsert(&state.pool, user_id, data)
        .await
        .map_err(|e| {
            error!("Failed to upsert spending for user {}: {}", user_id, e);
            AppError::from(e)
        })?;
    Ok(Json(aggregate))
}
