use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{SpendingCategoryAggregate, Trend, UpsertSpending};

pub async fn fetch_for_user(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Vec<SpendingCategoryAggregate>, sqlx::Error> {
    sqlx::query_as::<_, SpendingCategoryAggregate>(
        r#"
        SELECT id, user_id, category, current_month_spend, previous_month_spend,
               trend, trend_pct, updated_at
        FROM spending_aggregates
        WHERE user_id = $1
        ORDER BY current_month_spend DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

/// Highest-spend categories first, limited. Used by the recommendation and
/// deal engines for "top-N category" checks.
pub async fn fetch_top_categories(
    pool: &PgPool,
    user_id: Uuid,
    limit: i64,
) -> Result<Vec<SpendingCategoryAggregate>, sqlx::Error> {
    sqlx::query_as::<_, SpendingCategoryAggregate>(
        r#"
        SELECT id, user_id, category, current_month_spend, previous_month_spend,
               trend, trend_pct, updated_at
        FROM spending_aggregates
        WHERE user_id = $1
        ORDER BY current_month_spend DESC
        LIMIT $2
        "#,
    )
    .bind(user_id)
    .bind(limit)
    .fetch_all(pool)
    .await
}

/// Upsert keyed on (user_id, category); the trend fields are recomputed from
/// the new spend figures on every write.
pub async fn upsert(
    pool: &PgPool,
    user_id: Uuid,
    data: UpsertSpending,
) -> Result<SpendingCategoryAggregate, sqlx::Error> {
    let trend_pct = SpendingCategoryAggregate::compute_trend_pct(
        data.current_month_spend,
        data.previous_month_spend,
    );
    let trend = Trend::classify(trend_pct);

    sqlx::query_as::<_, SpendingCategoryAggregate>(
        r#"
        INSERT INTO spending_aggregates
            (id, user_id, category, current_month_spend, previous_month_spend,
             trend, trend_pct, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        ON CONFLICT (user_id, category)
        DO UPDATE SET
            current_month_spend = $4,
            previous_month_spend = $5,
            trend = $6,
            trend_pct = $7,
            updated_at = $8
        RETURNING id, user_id, category, current_month_spend, previous_month_spend,
                  trend, trend_pct, updated_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(data.category)
    .bind(data.current_month_spend)
    .bind(data.previous_month_spend)
    .bind(trend.as_str())
    .bind(trend_pct)
    .bind(Utc::now())
    .fetch_one(pool)
    .await
}
