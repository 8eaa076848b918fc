use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{CreateLedgerEntry, LedgerEntry, UpdateLedgerEntry};

pub async fn fetch_active(pool: &PgPool, user_id: Uuid) -> Result<Vec<LedgerEntry>, sqlx::Error> {
    sqlx::query_as::<_, LedgerEntry>(
        r#"
        SELECT id, user_id, name, amount, frequency, is_active, created_at, updated_at
        FROM ledger_entries
        WHERE user_id = $1 AND is_active = TRUE
        ORDER BY created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

pub async fn fetch_one(pool: &PgPool, id: Uuid) -> Result<Option<LedgerEntry>, sqlx::Error> {
    sqlx::query_as::<_, LedgerEntry>(
        r#"
        SELECT id, user_id, name, amount, frequency, is_active, created_at, updated_at
        FROM ledger_entries
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn create(
    pool: &PgPool,
    user_id: Uuid,
    data: CreateLedgerEntry,
) -> Result<LedgerEntry, sqlx::Error> {
    sqlx::query_as::<_, LedgerEntry>(
        r#"
        INSERT INTO ledger_entries
            (id, user_id, name, amount, frequency, is_active, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, TRUE, $6, $6)
        RETURNING id, user_id, name, amount, frequency, is_active, created_at, updated_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(data.name)
    .bind(data.amount)
    .bind(data.frequency.as_str())
    .bind(Utc::now())
    .fetch_one(pool)
    .await
}

// Mutations match on id AND user_id so a path with someone else's row id
// falls through to NotFound instead of touching the other user's data.
const UPDATE_ENTRY_SQL: &str = r#"
    UPDATE ledger_entries
    SET name = COALESCE($1, name),
        amount = COALESCE($2, amount),
        frequency = COALESCE($3, frequency),
        updated_at = $4
    WHERE id = $5 AND user_id = $6 AND is_active = TRUE
    RETURNING id, user_id, name, amount, frequency, is_active, created_at, updated_at
"#;

const DEACTIVATE_ENTRY_SQL: &str = r#"
    UPDATE ledger_entries
    SET is_active = FALSE, updated_at = $1
    WHERE id = $2 AND user_id = $3
"#;

pub async fn update(
    pool: &PgPool,
    user_id: Uuid,
    id: Uuid,
    data: UpdateLedgerEntry,
) -> Result<Option<LedgerEntry>, sqlx::Error> {
    sqlx::query_as::<_, LedgerEntry>(UPDATE_ENTRY_SQL)
        .bind(data.name)
        .bind(data.amount)
        .bind(data.frequency.map(|f| f.as_str()))
        .bind(Utc::now())
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

/// Soft delete. The engine never hard-deletes ledger entries.
pub async fn deactivate(pool: &PgPool, user_id: Uuid, id: Uuid) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(DEACTIVATE_ENTRY_SQL)
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
        assert!(UPDATE_ENTRY_SQL.contains("user_id = $6"));
        assert!(DEACTIVATE_ENTRY_SQL.contains("user_id = $3"));
    }
}
