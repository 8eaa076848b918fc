use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// What a recommendation points the user at.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationTarget {
    /// A catalog card the user does not own yet.
    NewCard,
    /// One of the user's own cards (e.g. an under-used one).
    ExistingCard,
    /// A higher-tier card from a bank the user already holds a card with.
    Upgrade,
}

impl RecommendationTarget {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecommendationTarget::NewCard => "new_card",
            RecommendationTarget::ExistingCard => "existing_card",
            RecommendationTarget::Upgrade => "upgrade",
        }
    }
}

/// Primary reason a recommendation was emitted.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationReason {
    HighSpendingCategory,
    BetterRewards,
    LowUtilization,
    UpgradeAvailable,
}

impl RecommendationReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecommendationReason::HighSpendingCategory => "high_spending_category",
            RecommendationReason::BetterRewards => "better_rewards",
            RecommendationReason::LowUtilization => "low_utilization",
            RecommendationReason::UpgradeAvailable => "upgrade_available",
        }
    }
}

/// A ranked card recommendation. The full set for a user is cleared and
/// regenerated per run: recommendations are a pure function of current state,
/// so stale prior-run rows must not survive.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CardRecommendation {
    pub id: Uuid,
    pub user_id: Uuid,
    pub target: String, // Converted to/from RecommendationTarget
    pub reason: String, // Converted to/from RecommendationReason
    pub bank_name: String,
    pub card_name: String,
    /// Spending category that motivated the recommendation, when one did.
    pub category: Option<String>,
    pub reasons: Json<Vec<String>>,
    pub estimated_monthly_savings: f64,
    pub estimated_annual_savings: f64,
    pub score: f64,
    pub priority: i32,
    pub viewed: bool,
    pub viewed_at: Option<DateTime<Utc>>,
    pub dismissed: bool,
    pub dismissed_at: Option<DateTime<Utc>>,
    pub applied: bool,
    pub applied_at: Option<DateTime<Utc>>,
    pub expires_at: DateTime<Utc>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Row shape produced by the recommendation engine before persistence.
/// Also serialized directly for the on-demand upgrade options endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct NewRecommendation {
    pub target: RecommendationTarget,
    pub reason: RecommendationReason,
    pub bank_name: String,
    pub card_name: String,
    pub category: Option<String>,
    pub reasons: Vec<String>,
    pub estimated_monthly_savings: f64,
    pub estimated_annual_savings: f64,
    pub score: f64,
    pub priority: i32,
}

impl NewRecommendation {
    /// Score from projected monthly savings, capped at 100.
    pub fn score_from_savings(monthly_savings: f64) -> f64 {
        (monthly_savings / 100.0 * 10.0).min(100.0)
    }

    /// Priority tiers keyed off monthly savings: 9 at >=500, 7 at >=200,
    /// 5 otherwise.
    pub fn priority_from_savings(monthly_savings: f64) -> i32 {
        if monthly_savings >= 500.0 {
            9
        } else if monthly_savings >= 200.0 {
            7
        } else {
            5
        }
    }
}
