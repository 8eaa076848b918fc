use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Onboarding/profile state consulted by the scenario gating: the snapshot
/// run counts how many of {basic profile, expense data, bank linked, email
/// linked} are present before health is even looked at.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserProfile {
    pub user_id: Uuid,
    pub display_name: Option<String>,
    pub declared_monthly_income: Option<f64>,
    pub bank_linked: bool,
    pub email_linked: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserProfile {
    /// "Basic profile present" means the user has set a display name.
    pub fn has_basic_profile(&self) -> bool {
        self.display_name.as_deref().is_some_and(|n| !n.is_empty())
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpsertProfile {
    pub display_name: Option<String>,
    pub declared_monthly_income: Option<f64>,
    #[serde(default)]
    pub bank_linked: bool,
    #[serde(default)]
    pub email_linked: bool,
}
