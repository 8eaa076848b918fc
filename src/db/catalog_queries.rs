use sqlx::PgPool;
use uuid::Uuid;

use crate::models::CatalogCard;

pub async fn fetch_active(pool: &PgPool) -> Result<Vec<CatalogCard>, sqlx::Error> {
    sqlx::query_as::<_, CatalogCard>(
        r#"
        SELECT id, bank_name, card_name, tier, network, annual_fee,
               base_reward_rate, category_rewards, is_active
        FROM catalog_cards
        WHERE is_active = TRUE
        ORDER BY bank_name, card_name
        "#,
    )
    .fetch_all(pool)
    .await
}

pub async fn fetch_one(pool: &PgPool, id: Uuid) -> Result<Option<CatalogCard>, sqlx::Error> {
    sqlx::query_as::<_, CatalogCard>(
        r#"
        SELECT id, bank_name, card_name, tier, network, annual_fee,
               base_reward_rate, category_rewards, is_active
        FROM catalog_cards
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Pass-through catalog browsing: optional ILIKE text search over bank and
/// card names, with limit/offset pagination.
pub async fn search(
    pool: &PgPool,
    query: Option<&str>,
    limit: i64,
    offset: i64,
) -> Result<Vec<CatalogCard>, sqlx::Error> {
    match query {
        Some(q) => {
            let pattern = format!("%{}%", q);
            sqlx::query_as::<_, CatalogCard>(
                r#"
                SELECT id, bank_name, card_name, tier, network, annual_fee,
                       base_reward_rate, category_rewards, is_active
                FROM catalog_cards
                WHERE is_active = TRUE
                  AND (bank_name ILIKE $1 OR card_name ILIKE $1)
                ORDER BY bank_name, card_name
                LIMIT $2 OFFSET $3
                "#,
            )
            .bind(pattern)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
        }
        None => {
            sqlx::query_as::<_, CatalogCard>(
                r#"
                SELECT id, bank_name, card_name, tier, network, annual_fee,
                       base_reward_rate, category_rewards, is_active
                FROM catalog_cards
                WHERE is_active = TRUE
                ORDER BY bank_name, card_name
                LIMIT $1 OFFSET $2
                "#,
            )
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
        }
    }
}
