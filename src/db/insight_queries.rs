use chrono::{Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{Insight, NewAction, NewInsight, NextBestAction};

/// Insights and actions share the recommendation lifetime.
const EXPIRY_DAYS: i64 = 30;

pub async fn fetch_active_insights(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Vec<Insight>, sqlx::Error> {
    sqlx::query_as::<_, Insight>(
        r#"
        SELECT id, user_id, category, priority, title, body, value,
               expires_at, is_active, created_at
        FROM insights
        WHERE user_id = $1 AND is_active = TRUE AND expires_at > NOW()
        ORDER BY created_at ASC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

pub async fn fetch_active_actions(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Vec<NextBestAction>, sqlx::Error> {
    sqlx::query_as::<_, NextBestAction>(
        r#"
        SELECT id, user_id, action_type, priority, title, body, value,
               expires_at, is_active, created_at
        FROM next_best_actions
        WHERE user_id = $1 AND is_active = TRUE AND expires_at > NOW()
        ORDER BY priority DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

/// Clear-then-insert for the insight batch, transactional so a partial
/// failure is never visible.
pub async fn replace_insights(
    pool: &PgPool,
    user_id: Uuid,
    batch: Vec<NewInsight>,
) -> Result<Vec<Insight>, sqlx::Error> {
    let mut tx = pool.begin().await?;
    let now = Utc::now();

    sqlx::query("UPDATE insights SET is_active = FALSE WHERE user_id = $1 AND is_active = TRUE")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    let mut inserted = Vec::with_capacity(batch.len());
    for insight in batch {
        let row = sqlx::query_as::<_, Insight>(
            r#"
            INSERT INTO insights
                (id, user_id, category, priority, title, body, value,
                 expires_at, is_active, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, TRUE, $9)
            RETURNING id, user_id, category, priority, title, body, value,
                      expires_at, is_active, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(insight.category.as_str())
        .bind(insight.priority.as_str())
        .bind(insight.title)
        .bind(insight.body)
        .bind(insight.value)
        .bind(now + Duration::days(EXPIRY_DAYS))
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;
        inserted.push(row);
    }

    tx.commit().await?;
    Ok(inserted)
}

pub async fn replace_actions(
    pool: &PgPool,
    user_id: Uuid,
    batch: Vec<NewAction>,
) -> Result<Vec<NextBestAction>, sqlx::Error> {
    let mut tx = pool.begin().await?;
    let now = Utc::now();

    sqlx::query(
        "UPDATE next_best_actions SET is_active = FALSE WHERE user_id = $1 AND is_active = TRUE",
    )
    .bind(user_id)
    .execute(&mut *tx)
    .await?;

    let mut inserted = Vec::with_capacity(batch.len());
    for action in batch {
        let row = sqlx::query_as::<_, NextBestAction>(
            r#"
            INSERT INTO next_best_actions
                (id, user_id, action_type, priority, title, body, value,
                 expires_at, is_active, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, TRUE, $9)
            RETURNING id, user_id, action_type, priority, title, body, value,
                      expires_at, is_active, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(action.action_type.as_str())
        .bind(action.priority)
        .bind(action.title)
        .bind(action.body)
        .bind(action.value)
        .bind(now + Duration::days(EXPIRY_DAYS))
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;
        inserted.push(row);
    }

    tx.commit().await?;
    Ok(inserted)
}
