use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Up,
    Down,
    Stable,
}

impl Trend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::Up => "up",
            Trend::Down => "down",
            Trend::Stable => "stable",
        }
    }

    /// Classify a month-over-month change. Moves under 5% in either direction
    /// count as stable.
    pub fn classify(trend_pct: f64) -> Self {
        if trend_pct.abs() < 5.0 {
            Trend::Stable
        } else if trend_pct > 0.0 {
            Trend::Up
        } else {
            Trend::Down
        }
    }
}

impl std::fmt::Display for Trend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-user, per-category spending aggregate. Unique on (user_id, category);
/// trend fields are recomputed whenever the spend figures change.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SpendingCategoryAggregate {
    pub id: Uuid,
    pub user_id: Uuid,
    pub category: String,
    pub current_month_spend: f64,
    pub previous_month_spend: f64,
    pub trend: String, // Converted to/from Trend
    pub trend_pct: f64,
    pub updated_at: DateTime<Utc>,
}

impl SpendingCategoryAggregate {
    /// (current − previous) / previous × 100; 0 when there is no previous
    /// month to compare against.
    pub fn compute_trend_pct(current: f64, previous: f64) -> f64 {
        if previous > 0.0 {
            (current - previous) / previous * 100.0
        } else {
            0.0
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpsertSpending {
    pub category: String,
    pub current_month_spend: f64,
    pub previous_month_spend: f64,
}
