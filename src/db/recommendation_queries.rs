use chrono::{Duration, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{CardRecommendation, NewRecommendation};

/// Default lifetime of a recommendation row.
const EXPIRY_DAYS: i64 = 30;

pub async fn fetch_active(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Vec<CardRecommendation>, sqlx::Error> {
    sqlx::query_as::<_, CardRecommendation>(
        r#"
        SELECT id, user_id, target, reason, bank_name, card_name, category, reasons,
               estimated_monthly_savings, estimated_annual_savings, score, priority,
               viewed, viewed_at, dismissed, dismissed_at, applied, applied_at,
               expires_at, is_active, created_at
        FROM card_recommendations
        WHERE user_id = $1 AND is_active = TRUE AND expires_at > NOW()
        ORDER BY priority DESC, score DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

/// Replace the user's recommendation batch: deactivate every prior row, then
/// insert the new set, all inside one transaction so a partial failure rolls
/// back instead of leaving a half-applied batch.
pub async fn replace_batch(
    pool: &PgPool,
    user_id: Uuid,
    batch: Vec<NewRecommendation>,
) -> Result<Vec<CardRecommendation>, sqlx::Error> {
    let mut tx = pool.begin().await?;
    let now = Utc::now();

    sqlx::query(
        "UPDATE card_recommendations SET is_active = FALSE WHERE user_id = $1 AND is_active = TRUE",
    )
    .bind(user_id)
    .execute(&mut *tx)
    .await?;

    let mut inserted = Vec::with_capacity(batch.len());
    for rec in batch {
        let row = sqlx::query_as::<_, CardRecommendation>(
            r#"
            INSERT INTO card_recommendations
                (id, user_id, target, reason, bank_name, card_name, category, reasons,
                 estimated_monthly_savings, estimated_annual_savings, score, priority,
                 viewed, dismissed, applied, expires_at, is_active, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12,
                    FALSE, FALSE, FALSE, $13, TRUE, $14)
            RETURNING id, user_id, target, reason, bank_name, card_name, category, reasons,
                      estimated_monthly_savings, estimated_annual_savings, score, priority,
                      viewed, viewed_at, dismissed, dismissed_at, applied, applied_at,
                      expires_at, is_active, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(rec.target.as_str())
        .bind(rec.reason.as_str())
        .bind(rec.bank_name)
        .bind(rec.card_name)
        .bind(rec.category)
        .bind(Json(rec.reasons))
        .bind(rec.estimated_monthly_savings)
        .bind(rec.estimated_annual_savings)
        .bind(rec.score)
        .bind(rec.priority)
        .bind(now + Duration::days(EXPIRY_DAYS))
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;
        inserted.push(row);
    }

    tx.commit().await?;
    Ok(inserted)
}

pub async fn mark_viewed(
    pool: &PgPool,
    user_id: Uuid,
    id: Uuid,
) -> Result<Option<CardRecommendation>, sqlx::Error> {
    mark_flag(pool, user_id, id, "viewed", "viewed_at").await
}

pub async fn mark_dismissed(
    pool: &PgPool,
    user_id: Uuid,
    id: Uuid,
) -> Result<Option<CardRecommendation>, sqlx::Error> {
    mark_flag(pool, user_id, id, "dismissed", "dismissed_at").await
}

pub async fn mark_applied(
    pool: &PgPool,
    user_id: Uuid,
    id: Uuid,
) -> Result<Option<CardRecommendation>, sqlx::Error> {
    mark_flag(pool, user_id, id, "applied", "applied_at").await
}

// Column names come from the fixed sets above, never from user input.
async fn mark_flag(
    pool: &PgPool,
    user_id: Uuid,
    id: Uuid,
    flag: &str,
    flag_at: &str,
) -> Result<Option<CardRecommendation>, sqlx::Error> {
    let sql = format!(
        r#"
        UPDATE card_recommendations
        SET {flag} = TRUE, {flag_at} = $1
        WHERE id = $2 AND user_id = $3 AND is_active = TRUE
        RETURNING id, user_id, target, reason, bank_name, card_name, category, reasons,
                  estimated_monthly_savings, estimated_annual_savings, score, priority,
                  viewed, viewed_at, dismissed, dismissed_at, applied, applied_at,
                  expires_at, is_active, created_at
        "#
    );
    sqlx::query_as::<_, CardRecommendation>(&sql)
        .bind(Utc::now())
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
}
