//! Snapshot orchestration: recomputes metrics, band, scenario, and score, and
//! replaces the user's single snapshot row.

use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::db::{card_queries, ledger_queries, profile_queries, snapshot_queries};
use crate::errors::AppError;
use crate::models::FinancialSnapshot;
use crate::services::classifier::{self, EntryClass};
use crate::services::health_service::{self, CompletenessSignals};
use crate::services::metrics_service;

/// Recompute the snapshot from current persisted state and upsert it.
///
/// Safe to call repeatedly and concurrently for the same user: every field is
/// a pure function of the underlying tables, never of the prior snapshot, so
/// racing writers converge on the same value regardless of commit order.
pub async fn regenerate(pool: &PgPool, user_id: Uuid) -> Result<FinancialSnapshot, AppError> {
    let entries = ledger_queries::fetch_active(pool, user_id).await?;
    let cards = card_queries::fetch_active(pool, user_id).await?;
    let profile = profile_queries::fetch_for_user(pool, user_id).await?;

    let metrics = metrics_service::aggregate(&entries, &cards);
    let band = health_service::classify_band(&metrics);
    let score = health_service::health_score(&metrics);

    let has_income_records = entries
        .iter()
        .any(|e| classifier::classify_name(&e.name) == EntryClass::Income);
    let has_expense_data = entries
        .iter()
        .any(|e| classifier::classify_name(&e.name) == EntryClass::Expense);

    let signals = CompletenessSignals {
        has_income_records,
        has_card_records: !cards.is_empty(),
        has_basic_profile: profile.as_ref().is_some_and(|p| p.has_basic_profile()),
        has_expense_data,
        bank_linked: profile.as_ref().is_some_and(|p| p.bank_linked),
        email_linked: profile.as_ref().is_some_and(|p| p.email_linked),
    };
    let scenario = health_service::classify_scenario(&signals, band);

    let snapshot = FinancialSnapshot::new(user_id, score, band, scenario, &metrics);
    let stored = snapshot_queries::upsert(pool, snapshot).await?;

    info!(
        "Snapshot regenerated for user {}: band={}, scenario={}, score={}",
        user_id, stored.health_band, stored.scenario_code, stored.health_score
    );

    Ok(stored)
}

pub async fn fetch(pool: &PgPool, user_id: Uuid) -> Result<FinancialSnapshot, AppError> {
    snapshot_queries::fetch_for_user(pool, user_id)
        .await?
        .ok_or(AppError::NotFound)
}

/// Fire-and-forget recomputation, triggered after every ledger/card/profile
/// mutation. Failures are logged and swallowed so the triggering mutation
/// still succeeds; the next mutation retriggers the refresh. Any retry or
/// backoff policy would be added here.
pub fn spawn_snapshot_refresh(pool: PgPool, user_id: Uuid) {
    tokio::spawn(async move {
        if let Err(e) = regenerate(&pool, user_id).await {
            warn!("Background snapshot refresh failed for user {}: {}", user_id, e);
        }
    });
}
