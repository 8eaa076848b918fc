use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A credit card owned by a user.
///
/// `available_credit` is derived (limit − balance) and is recomputed on every
/// write that touches the limit or balance.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CardAccount {
    pub id: Uuid,
    pub user_id: Uuid,
    pub bank_name: String,
    pub card_name: String,
    pub credit_limit: f64,
    pub current_balance: f64,
    pub available_credit: f64,
    pub is_primary: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CardAccount {
    /// Balance as a fraction of the limit; 0 when the limit is 0.
    pub fn utilization(&self) -> f64 {
        if self.credit_limit <= 0.0 {
            0.0
        } else {
            (self.current_balance / self.credit_limit).clamp(0.0, 1.0)
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateCardAccount {
    pub bank_name: String,
    pub card_name: String,
    pub credit_limit: f64,
    pub current_balance: f64,
    #[serde(default)]
    pub is_primary: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateCardAccount {
    pub bank_name: Option<String>,
    pub card_name: Option<String>,
    pub credit_limit: Option<f64>,
    pub current_balance: Option<f64>,
}
