use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InsightCategory {
    Savings,
    Credit,
    Debt,
    CategoryOptimization,
    Deal,
    RisingSpend,
}

impl InsightCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            InsightCategory::Savings => "savings",
            InsightCategory::Credit => "credit",
            InsightCategory::Debt => "debt",
            InsightCategory::CategoryOptimization => "category_optimization",
            InsightCategory::Deal => "deal",
            InsightCategory::RisingSpend => "rising_spend",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InsightPriority {
    High,
    Medium,
    Low,
}

impl InsightPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            InsightPriority::High => "high",
            InsightPriority::Medium => "medium",
            InsightPriority::Low => "low",
        }
    }
}

/// A user-facing advisory generated from the current metrics and aggregates.
/// Batches are generated fresh per run; callers clear the previous batch
/// before regenerating.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Insight {
    pub id: Uuid,
    pub user_id: Uuid,
    pub category: String, // Converted to/from InsightCategory
    pub priority: String, // Converted to/from InsightPriority
    pub title: String,
    pub body: String,
    /// Optional figure backing the advisory (e.g. projected savings).
    pub value: Option<f64>,
    pub expires_at: DateTime<Utc>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Pre-persistence shape for a generated insight.
#[derive(Debug, Clone)]
pub struct NewInsight {
    pub category: InsightCategory,
    pub priority: InsightPriority,
    pub title: String,
    pub body: String,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    AddSalary,
    AddCards,
    LinkEmail,
    ApplyRecommendation,
    ReduceCategorySpend,
}

impl ActionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::AddSalary => "add_salary",
            ActionType::AddCards => "add_cards",
            ActionType::LinkEmail => "link_email",
            ActionType::ApplyRecommendation => "apply_recommendation",
            ActionType::ReduceCategorySpend => "reduce_category_spend",
        }
    }
}

/// Actionable counterpart to an insight: same signals, but each row names a
/// concrete next step with a 1–10 priority.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct NextBestAction {
    pub id: Uuid,
    pub user_id: Uuid,
    pub action_type: String, // Converted to/from ActionType
    pub priority: i32,
    pub title: String,
    pub body: String,
    pub value: Option<f64>,
    pub expires_at: DateTime<Utc>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Pre-persistence shape for a generated action.
#[derive(Debug, Clone)]
pub struct NewAction {
    pub action_type: ActionType,
    pub priority: i32,
    pub title: String,
    pub body: String,
    pub value: Option<f64>,
}
