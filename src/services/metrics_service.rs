//! Metrics aggregation: folds classified ledger entries and active cards into
//! a `FinancialMetrics` value object.

use sqlx::PgPool;
use uuid::Uuid;

use crate::db::{card_queries, ledger_queries};
use crate::errors::AppError;
use crate::models::{CardAccount, FinancialMetrics, LedgerEntry};
use crate::services::classifier::{self, EntryClass};

/// Divide with a [0, 1] clamp; 0 when the denominator is not positive.
/// Callers never observe negative, >100%, or NaN ratios.
fn clamped_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator <= 0.0 {
        0.0
    } else {
        (numerator / denominator).clamp(0.0, 1.0)
    }
}

/// Aggregate metrics from already-fetched rows. Pure; the async wrapper below
/// handles the storage reads.
pub fn aggregate(entries: &[LedgerEntry], cards: &[CardAccount]) -> FinancialMetrics {
    let mut monthly_income = 0.0;
    let mut monthly_expenses = 0.0;
    let mut monthly_investments = 0.0;
    let mut monthly_loans = 0.0;

    for entry in entries.iter().filter(|e| e.is_active) {
        let (class, monthly) = classifier::classify_entry(entry);
        match class {
            EntryClass::Income => monthly_income += monthly,
            EntryClass::Expense => monthly_expenses += monthly,
            EntryClass::Investment => monthly_investments += monthly,
            EntryClass::LoanPayment => monthly_loans += monthly,
            EntryClass::Excluded => {}
        }
    }

    let active_cards: Vec<&CardAccount> = cards.iter().filter(|c| c.is_active).collect();
    let total_credit_limit: f64 = active_cards.iter().map(|c| c.credit_limit).sum();
    let total_credit_used: f64 = active_cards.iter().map(|c| c.current_balance).sum();

    // Savings floor at zero: this model never reports savings as a deficit.
    let monthly_savings =
        (monthly_income - monthly_expenses - monthly_investments - monthly_loans).max(0.0);

    FinancialMetrics {
        monthly_income,
        monthly_expenses,
        monthly_investments,
        monthly_loans,
        monthly_savings,
        savings_rate: clamped_ratio(monthly_savings, monthly_income),
        credit_utilization: clamped_ratio(total_credit_used, total_credit_limit),
        debt_to_income_ratio: clamped_ratio(total_credit_used, monthly_income),
        total_credit_limit,
        total_credit_used,
        total_credit_available: total_credit_limit - total_credit_used,
        card_count: active_cards.len() as i64,
    }
}

/// Fetch the user's active ledger entries and cards and aggregate them.
///
/// Storage errors propagate: metrics are request-critical, unlike the
/// advisory generators.
pub async fn compute_metrics(pool: &PgPool, user_id: Uuid) -> Result<FinancialMetrics, AppError> {
    let entries = ledger_queries::fetch_active(pool, user_id).await?;
    let cards = card_queries::fetch_active(pool, user_id).await?;
    Ok(aggregate(&entries, &cards))
}
