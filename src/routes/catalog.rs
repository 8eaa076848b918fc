use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use tracing::info;
use uuid::Uuid;

use crate::db::catalog_queries;
use crate::errors::AppError;
use crate::models::{CatalogCard, CatalogQueryParams};
use crate::state::AppState;

const DEFAULT_LIMIT: i64 = 50;
const MAX_LIMIT: i64 = 200;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(search_catalog))
        .route("/:id", get(get_catalog_card))
}

pub async fn search_catalog(
    State(state): State<AppState>,
    Query(params): Query<CatalogQueryParams>,
) -> Result<Json<Vec<CatalogCard>>, AppError> {
    info!("GET /catalog - Browsing catalog (q={:?})", params.q);
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let offset = params.offset.unwrap_or(0).max(0);
    let cards =
        catalog_queries::search(&state.pool, params.q.as_deref(), limit, offset).await?;
    Ok(Json(cards))
}

pub async fn get_catalog_card(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CatalogCard>, AppError> {
    info!("GET /catalog/{} - Fetching catalog card", id);
    let card = catalog_queries::fetch_one(&state.pool, id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(card))
}
