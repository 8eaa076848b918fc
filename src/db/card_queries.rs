use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{CardAccount, CreateCardAccount, UpdateCardAccount};

pub async fn fetch_active(pool: &PgPool, user_id: Uuid) -> Result<Vec<CardAccount>, sqlx::Error> {
    sqlx::query_as::<_, CardAccount>(
        r#"
        SELECT id, user_id, bank_name, card_name, credit_limit, current_balance,
               available_credit, is_primary, is_active, created_at, updated_at
        FROM card_accounts
        WHERE user_id = $1 AND is_active = TRUE
        ORDER BY created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

pub async fn fetch_one(pool: &PgPool, id: Uuid) -> Result<Option<CardAccount>, sqlx::Error> {
    sqlx::query_as::<_, CardAccount>(
        r#"
        SELECT id, user_id, bank_name, card_name, credit_limit, current_balance,
               available_credit, is_primary, is_active, created_at, updated_at
        FROM card_accounts
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Insert a card; `available_credit` is derived here so the invariant holds
/// from the first write. Setting `is_primary` unsets every other primary card
/// for the user inside the same transaction.
pub async fn create(
    pool: &PgPool,
    user_id: Uuid,
    data: CreateCardAccount,
) -> Result<CardAccount, sqlx::Error> {
    let mut tx = pool.begin().await?;

    if data.is_primary {
        sqlx::query(
            "UPDATE card_accounts SET is_primary = FALSE, updated_at = $1
             WHERE user_id = $2 AND is_primary = TRUE",
        )
        .bind(Utc::now())
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
    }

    let card = sqlx::query_as::<_, CardAccount>(
        r#"
        INSERT INTO card_accounts
            (id, user_id, bank_name, card_name, credit_limit, current_balance,
             available_credit, is_primary, is_active, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, TRUE, $9, $9)
        RETURNING id, user_id, bank_name, card_name, credit_limit, current_balance,
                  available_credit, is_primary, is_active, created_at, updated_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(data.bank_name)
    .bind(data.card_name)
    .bind(data.credit_limit)
    .bind(data.current_balance)
    .bind(data.credit_limit - data.current_balance)
    .bind(data.is_primary)
    .bind(Utc::now())
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(card)
}

// Mutations match on id AND user_id so a path with someone else's row id
// falls through to NotFound instead of touching the other user's card.
const UPDATE_CARD_SQL: &str = r#"
    UPDATE card_accounts
    SET bank_name = COALESCE($1, bank_name),
        card_name = COALESCE($2, card_name),
        credit_limit = COALESCE($3, credit_limit),
        current_balance = COALESCE($4, current_balance),
        available_credit = COALESCE($3, credit_limit) - COALESCE($4, current_balance),
        updated_at = $5
    WHERE id = $6 AND user_id = $7 AND is_active = TRUE
    RETURNING id, user_id, bank_name, card_name, credit_limit, current_balance,
              available_credit, is_primary, is_active, created_at, updated_at
"#;

const DEACTIVATE_CARD_SQL: &str = r#"
    UPDATE card_accounts
    SET is_active = FALSE, is_primary = FALSE, updated_at = $1
    WHERE id = $2 AND user_id = $3
"#;

/// Partial update; `available_credit` is recomputed from the effective limit
/// and balance in the same statement.
pub async fn update(
    pool: &PgPool,
    user_id: Uuid,
    id: Uuid,
    data: UpdateCardAccount,
) -> Result<Option<CardAccount>, sqlx::Error> {
    sqlx::query_as::<_, CardAccount>(UPDATE_CARD_SQL)
        .bind(data.bank_name)
        .bind(data.card_name)
        .bind(data.credit_limit)
        .bind(data.current_balance)
        .bind(Utc::now())
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

/// Make a card the user's primary, unsetting all others transactionally so at
/// most one active primary exists at any time.
pub async fn set_primary(
    pool: &PgPool,
    user_id: Uuid,
    id: Uuid,
) -> Result<Option<CardAccount>, sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        "UPDATE card_accounts SET is_primary = FALSE, updated_at = $1
         WHERE user_id = $2 AND is_primary = TRUE",
    )
    .bind(Utc::now())
    .bind(user_id)
    .execute(&mut *tx)
    .await?;

    let card = sqlx::query_as::<_, CardAccount>(
        r#"
        UPDATE card_accounts
        SET is_primary = TRUE, updated_at = $1
        WHERE id = $2 AND user_id = $3 AND is_active = TRUE
        RETURNING id, user_id, bank_name, card_name, credit_limit, current_balance,
                  available_credit, is_primary, is_active, created_at, updated_at
        "#,
    )
    .bind(Utc::now())
    .bind(id)
    .bind(user_id)
    .fetch_optional(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(card)
}

pub async fn deactivate(pool: &PgPool, user_id: Uuid, id: Uuid) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(DEACTIVATE_CARD_SQL)
        .bind(Utc::now())
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mutations_are_owner_scoped() {
        assert!(UPDATE_CARD_SQL.contains("user_id = $7"));
        assert!(DEACTIVATE_CARD_SQL.contains("user_id = $3"));
    }
}
