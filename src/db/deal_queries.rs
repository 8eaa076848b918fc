use sqlx::PgPool;
use uuid::Uuid;

use crate::models::Deal;

const DEAL_COLUMNS: &str = r#"
    SELECT id, merchant, category, deal_type, value, max_discount, min_transaction,
           card_offers, valid_from, valid_until, is_featured, views, clicks,
           redemptions, popularity_score, is_active, created_at
    FROM deals
"#;

pub async fn fetch_active(pool: &PgPool) -> Result<Vec<Deal>, sqlx::Error> {
    let sql = format!(
        "{DEAL_COLUMNS}
         WHERE is_active = TRUE AND valid_until > NOW()
         ORDER BY popularity_score DESC"
    );
    sqlx::query_as::<_, Deal>(&sql).fetch_all(pool).await
}

pub async fn fetch_featured(pool: &PgPool) -> Result<Vec<Deal>, sqlx::Error> {
    let sql = format!(
        "{DEAL_COLUMNS}
         WHERE is_active = TRUE AND is_featured = TRUE AND valid_until > NOW()
         ORDER BY popularity_score DESC"
    );
    sqlx::query_as::<_, Deal>(&sql).fetch_all(pool).await
}

pub async fn fetch_one(pool: &PgPool, id: Uuid) -> Result<Option<Deal>, sqlx::Error> {
    let sql = format!("{DEAL_COLUMNS} WHERE id = $1");
    sqlx::query_as::<_, Deal>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Engagement counters increment atomically at the row level and
/// independently of scoring.
pub async fn increment_views(pool: &PgPool, id: Uuid) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("UPDATE deals SET views = views + 1 WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

pub async fn increment_clicks(pool: &PgPool, id: Uuid) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("UPDATE deals SET clicks = clicks + 1 WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

pub async fn increment_redemptions(pool: &PgPool, id: Uuid) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("UPDATE deals SET redemptions = redemptions + 1 WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

/// Opportunistic popularity recompute from the current counters. Not run on
/// every view; the redemption path calls it since redemptions move the score
/// the most.
pub async fn refresh_popularity(pool: &PgPool, id: Uuid) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE deals
         SET popularity_score = redemptions * 10 + clicks * 2 + views
         WHERE id = $1",
    )
    .bind(id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}
