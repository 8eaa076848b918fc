use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{UpsertProfile, UserProfile};

pub async fn fetch_for_user(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Option<UserProfile>, sqlx::Error> {
    sqlx::query_as::<_, UserProfile>(
        r#"
        SELECT user_id, display_name, declared_monthly_income, bank_linked,
               email_linked, created_at, updated_at
        FROM user_profiles
        WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

pub async fn upsert(
    pool: &PgPool,
    user_id: Uuid,
    data: UpsertProfile,
) -> Result<UserProfile, sqlx::Error> {
    sqlx::query_as::<_, UserProfile>(
        r#"
        INSERT INTO user_profiles
            (user_id, display_name, declared_monthly_income, bank_linked,
             email_linked, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $6)
        ON CONFLICT (user_id)
        DO UPDATE SET
            display_name = $2,
            declared_monthly_income = $3,
            bank_linked = $4,
            email_linked = $5,
            updated_at = $6
        RETURNING user_id, display_name, declared_monthly_income, bank_linked,
                  email_linked, created_at, updated_at
        "#,
    )
    .bind(user_id)
    .bind(data.display_name)
    .bind(data.declared_monthly_income)
    .bind(data.bank_linked)
    .bind(data.email_linked)
    .bind(Utc::now())
    .fetch_one(pool)
    .await
}
