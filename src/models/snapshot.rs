use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::FinancialMetrics;

/// Coarse financial-health classification.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HealthBand {
    /// Only reachable when monthly income is 0.
    Unknown,
    Critical,
    Stressed,
    Balanced,
    Optimizer,
}

impl HealthBand {
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthBand::Unknown => "unknown",
            HealthBand::Critical => "critical",
            HealthBand::Stressed => "stressed",
            HealthBand::Balanced => "balanced",
            HealthBand::Optimizer => "optimizer",
        }
    }

    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s {
            "unknown" => Some(HealthBand::Unknown),
            "critical" => Some(HealthBand::Critical),
            "stressed" => Some(HealthBand::Stressed),
            "balanced" => Some(HealthBand::Balanced),
            "optimizer" => Some(HealthBand::Optimizer),
            _ => None,
        }
    }
}

impl std::fmt::Display for HealthBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Combined onboarding-completeness + health classification driving UI
/// messaging. Recomputed from scratch on every snapshot run; there is no
/// previous-scenario memory.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioCode {
    OnboardingNoSalary,
    OnboardingNoCards,
    OnboardingPartial,
    ReadyNoHealth,
    CriticalRed,
    StressedAmber,
    BalancedGreen,
    OptimizerBlue,
}

impl ScenarioCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScenarioCode::OnboardingNoSalary => "onboarding_no_salary",
            ScenarioCode::OnboardingNoCards => "onboarding_no_cards",
            ScenarioCode::OnboardingPartial => "onboarding_partial",
            ScenarioCode::ReadyNoHealth => "ready_no_health",
            ScenarioCode::CriticalRed => "critical_red",
            ScenarioCode::StressedAmber => "stressed_amber",
            ScenarioCode::BalancedGreen => "balanced_green",
            ScenarioCode::OptimizerBlue => "optimizer_blue",
        }
    }
}

impl std::fmt::Display for ScenarioCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The single current derived-metrics row per user. Replaced wholesale on
/// every recomputation, never appended.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FinancialSnapshot {
    pub user_id: Uuid,
    pub health_score: f64,
    pub health_band: String,   // Converted to/from HealthBand
    pub scenario_code: String, // Converted to/from ScenarioCode
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
    pub computed_at: DateTime<Utc>,
}

impl FinancialSnapshot {
    pub fn new(
        user_id: Uuid,
        health_score: f64,
        band: HealthBand,
        scenario: ScenarioCode,
        metrics: &FinancialMetrics,
    ) -> Self {
        Self {
            user_id,
            health_score,
            health_band: band.as_str().to_string(),
            scenario_code: scenario.as_str().to_string(),
            monthly_income: metrics.monthly_income,
            monthly_expenses: metrics.monthly_expenses,
            monthly_investments: metrics.monthly_investments,
            monthly_loans: metrics.monthly_loans,
            monthly_savings: metrics.monthly_savings,
            savings_rate: metrics.savings_rate,
            credit_utilization: metrics.credit_utilization,
            debt_to_income_ratio: metrics.debt_to_income_ratio,
            total_credit_limit: metrics.total_credit_limit,
            total_credit_used: metrics.total_credit_used,
            total_credit_available: metrics.total_credit_available,
            card_count: metrics.card_count,
            computed_at: Utc::now(),
        }
    }
}
