use sqlx::PgPool;
use uuid::Uuid;

use crate::models::FinancialSnapshot;

pub async fn fetch_for_user(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Option<FinancialSnapshot>, sqlx::Error> {
    sqlx::query_as::<_, FinancialSnapshot>(
        r#"
        SELECT user_id, health_score, health_band, scenario_code,
               monthly_income, monthly_expenses, monthly_investments, monthly_loans,
               monthly_savings, savings_rate, credit_utilization, debt_to_income_ratio,
               total_credit_limit, total_credit_used, total_credit_available,
               card_count, computed_at
        FROM financial_snapshots
        WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

/// Atomic whole-row replace keyed by user_id. Concurrent writers never
/// interleave partial updates; the last commit wins, and since the snapshot
/// is a pure function of persisted state the winners all carry the same
/// logical value.
pub async fn upsert(
    pool: &PgPool,
    snapshot: FinancialSnapshot,
) -> Result<FinancialSnapshot, sqlx::Error> {
    sqlx::query_as::<_, FinancialSnapshot>(
        r#"
        INSERT INTO financial_snapshots
            (user_id, health_score, health_band, scenario_code,
             monthly_income, monthly_expenses, monthly_investments, monthly_loans,
             monthly_savings, savings_rate, credit_utilization, debt_to_income_ratio,
             total_credit_limit, total_credit_used, total_credit_available,
             card_count, computed_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
        ON CONFLICT (user_id)
        DO UPDATE SET
            health_score = $2,
            health_band = $3,
            scenario_code = $4,
            monthly_income = $5,
            monthly_expenses = $6,
            monthly_investments = $7,
            monthly_loans = $8,
            monthly_savings = $9,
            savings_rate = $10,
            credit_utilization = $11,
            debt_to_income_ratio = $12,
            total_credit_limit = $13,
            total_credit_used = $14,
            total_credit_available = $15,
            card_count = $16,
            computed_at = $17
        RETURNING user_id, health_score, health_band, scenario_code,
                  monthly_income, monthly_expenses, monthly_investments, monthly_loans,
                  monthly_savings, savings_rate, credit_utilization, debt_to_income_ratio,
                  total_credit_limit, total_credit_used, total_credit_available,
                  card_count, computed_at
        "#,
    )
    .bind(snapshot.user_id)
    .bind(snapshot.health_score)
    .bind(snapshot.health_band)
    .bind(snapshot.scenario_code)
    .bind(snapshot.monthly_income)
    .bind(snapshot.monthly_expenses)
    .bind(snapshot.monthly_investments)
    .bind(snapshot.monthly_loans)
    .bind(snapshot.monthly_savings)
    .bind(snapshot.savings_rate)
    .bind(snapshot.credit_utilization)
    .bind(snapshot.debt_to_income_ratio)
    .bind(snapshot.total_credit_limit)
    .bind(snapshot.total_credit_used)
    .bind(snapshot.total_credit_available)
    .bind(snapshot.card_count)
    .bind(snapshot.computed_at)
    .fetch_one(pool)
    .await
}
