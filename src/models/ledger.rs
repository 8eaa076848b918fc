use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// How often a ledger entry recurs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Weekly,
    Biweekly,
    Monthly,
    OneTime,
}

impl Frequency {
    /// Multiplier that converts a per-occurrence amount into a monthly amount.
    ///
    /// One-time entries contribute 0 to every recurring total: they are
    /// windfalls, not a baseline.
    pub fn monthly_factor(&self) -> f64 {
        match self {
            Frequency::Weekly => 4.33,
            Frequency::Biweekly => 2.17,
            Frequency::Monthly => 1.0,
            Frequency::OneTime => 0.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Weekly => "weekly",
            Frequency::Biweekly => "biweekly",
            Frequency::Monthly => "monthly",
            Frequency::OneTime => "one_time",
        }
    }

    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s {
            "weekly" => Some(Frequency::Weekly),
            "biweekly" => Some(Frequency::Biweekly),
            "monthly" => Some(Frequency::Monthly),
            "one_time" => Some(Frequency::OneTime),
            _ => None,
        }
    }
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single income/expense/investment/loan record, tagged only by its
/// free-text name. The semantic class is derived at read time from the name
/// and is never stored.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LedgerEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub amount: f64,
    pub frequency: String, // Converted to/from Frequency
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LedgerEntry {
    pub fn frequency(&self) -> Option<Frequency> {
        Frequency::from_str_opt(&self.frequency)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateLedgerEntry {
    pub name: String,
    pub amount: f64,
    pub frequency: Frequency,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateLedgerEntry {
    pub name: Option<String>,
    pub amount: Option<f64>,
    pub frequency: Option<Frequency>,
}
