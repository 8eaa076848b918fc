use serde::{Deserialize, Serialize};

/// Normalized monthly view of a user's finances.
///
/// Ephemeral value object: recomputed from the ledger and card tables on
/// every use, embedded into the snapshot row, never persisted on its own.
/// The three ratio fields are always within [0, 1].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FinancialMetrics {
    pub monthly_income: f64,
    pub monthly_expenses: f64,
    pub monthly_investments: f64,
    pub monthly_loans: f64,
    pub monthly_savings: f64,
    pub savings_rate: f64,
    pub credit_utilization: f64,
    pub debt_to_income_ratio: f64,
    pub total_credit_limit: f64,
    pub total_credit_used: f64,
    pub total_credit_available: f64,
    pub card_count: i64,
}
