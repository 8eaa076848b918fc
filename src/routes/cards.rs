use axum::extract::{Path, State};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use tracing::{error, info};
use uuid::Uuid;

use crate::db::card_queries;
use crate::errors::AppError;
use crate::models::{CardAccount, CreateCardAccount, UpdateCardAccount};
use crate::services::snapshot_service;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_card).get(fetch_cards))
        .route("/:id", get(get_card))
        .route("/:id", put(update_card))
        .route("/:id", delete(delete_card))
        .route("/:id/primary", post(set_primary_card))
}

// A zero limit is valid (secured or just-issued cards); utilization math
// treats it as 0.
fn validate_card(credit_limit: Option<f64>, current_balance: Option<f64>) -> Result<(), AppError> {
    if let Some(limit) = credit_limit {
        if limit < 0.0 || !limit.is_finite() {
            return Err(AppError::Validation(format!("Invalid credit limit: {}", limit)));
        }
    }
    if let Some(balance) = current_balance {
        if balance < 0.0 || !balance.is_finite() {
            return Err(AppError::Validation(format!("Invalid balance: {}", balance)));
        }
    }
    Ok(())
}

pub async fn create_card(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(data): Json<CreateCardAccount>,
) -> Result<Json<CardAccount>, AppError> {
    info!("POST /cards - Creating card for user {}", user_id);
    validate_card(Some(data.credit_limit), Some(data.current_balance))?;
    let card = card_queries::create(&state.pool, user_id, data)
        .await
        .map_err(|e| {
            error!("Failed to create card: {}", e);
            AppError::from(e)
        })?;
    snapshot_service::spawn_snapshot_refresh(state.pool.clone(), user_id);
    Ok(Json(card))
}

pub async fn fetch_cards(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<CardAccount>>, AppError> {
    info!("GET /cards - Fetching cards for user {}", user_id);
    let cards = card_queries::fetch_active(&state.pool, user_id).await?;
    Ok(Json(cards))
}

pub async fn get_card(
    State(state): State<AppState>,
    Path((user_id, id)): Path<(Uuid, Uuid)>,
) -> Result<Json<CardAccount>, AppError> {
    info!("GET /cards/{} - Fetching card for user {}", id, user_id);
    let card = card_queries::fetch_one(&state.pool, id)
        .await?
        .filter(|c| c.user_id == user_id)
        .ok_or(AppError::NotFound)?;
    Ok(Json(card))
}

pub async fn update_card(
    State(state): State<AppState>,
    Path((user_id, id)): Path<(Uuid, Uuid)>,
    Json(data): Json<UpdateCardAccount>,
) -> Result<Json<CardAccount>, AppError> {
    info!("PUT /cards/{} - Updating card for user {}", id, user_id);
    validate_card(data.credit_limit, data.current_balance)?;
    let card = card_queries::update(&state.pool, user_id, id, data)
        .await
        .map_err(|e| {
            error!("Failed to update card {}: {}", id, e);
            AppError::from(e)
        })?
        .ok_or(AppError::NotFound)?;
    snapshot_service::spawn_snapshot_refresh(state.pool.clone(), user_id);
    Ok(Json(card))
}

pub async fn set_primary_card(
    State(state): State<AppState>,
    Path((user_id, id)): Path<(Uuid, Uuid)>,
) -> Result<Json<CardAccount>, AppError> {
    info!("POST /cards/{}/primary - Setting primary card for user {}", id, user_id);
    let card = card_queries::set_primary(&state.pool, user_id, id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(card))
}

pub async fn delete_card(
    State(state): State<AppState>,
    Path((user_id, id)): Path<(Uuid, Uuid)>,
) -> Result<Json<()>, AppError> {
    info!("DELETE /cards/{} - Deactivating card for user {}", id, user_id);
    match card_queries::deactivate(&state.pool, user_id, id).await {
        Ok(0) => Err(AppError::NotFound),
        Ok(_) => {
            snapshot_service::spawn_snapshot_refresh(state.pool.clone(), user_id);
            Ok(Json(()))
        }
        Err(e) => {
            error!("Failed to deactivate card {}: {}", id, e);
            Err(AppError::from(e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_credit_limit_is_valid() {
        assert!(validate_card(Some(0.0), Some(0.0)).is_ok());
    }

    #[test]
    fn test_negative_and_non_finite_rejected() {
        assert!(validate_card(Some(-1.0), None).is_err());
        assert!(validate_card(Some(f64::NAN), None).is_err());
        assert!(validate_card(None, Some(-5.0)).is_err());
    }
}
