use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CardTier {
    Entry,
    Mid,
    Premium,
    SuperPremium,
}

impl CardTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            CardTier::Entry => "entry",
            CardTier::Mid => "mid",
            CardTier::Premium => "premium",
            CardTier::SuperPremium => "super_premium",
        }
    }

    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s {
            "entry" => Some(CardTier::Entry),
            "mid" => Some(CardTier::Mid),
            "premium" => Some(CardTier::Premium),
            "super_premium" => Some(CardTier::SuperPremium),
            _ => None,
        }
    }

    /// Ordering used by the upgrade scan: a card is an upgrade candidate only
    /// when its tier ranks above the owned card's tier.
    pub fn rank(&self) -> u8 {
        match self {
            CardTier::Entry => 0,
            CardTier::Mid => 1,
            CardTier::Premium => 2,
            CardTier::SuperPremium => 3,
        }
    }
}

impl std::fmt::Display for CardTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-category reward on a catalog card.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryReward {
    pub category: String,
    /// Reward rate as a percentage of spend (e.g. 5.0 for 5%).
    pub reward_rate: f64,
    /// Optional monthly cap on the reward amount for this category.
    pub monthly_cap: Option<f64>,
}

/// A card in the market catalog. Read-only reference data from the engine's
/// perspective.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CatalogCard {
    pub id: Uuid,
    pub bank_name: String,
    pub card_name: String,
    pub tier: String, // Converted to/from CardTier
    pub network: String,
    pub annual_fee: f64,
    /// Reward rate applied to spend outside any listed category.
    pub base_reward_rate: f64,
    pub category_rewards: Json<Vec<CategoryReward>>,
    pub is_active: bool,
}

impl CatalogCard {
    pub fn tier(&self) -> Option<CardTier> {
        CardTier::from_str_opt(&self.tier)
    }

    /// Reward rate for a category, falling back to the base rate.
    pub fn rate_for_category(&self, category: &str) -> f64 {
        self.category_rewards
            .iter()
            .find(|r| r.category.eq_ignore_ascii_case(category))
            .map(|r| r.reward_rate)
            .unwrap_or(self.base_reward_rate)
    }

    /// Whether the card carries an explicit reward for a category.
    pub fn offers_category(&self, category: &str) -> bool {
        self.category_rewards
            .iter()
            .any(|r| r.category.eq_ignore_ascii_case(category))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogQueryParams {
    /// Free-text search over bank and card names.
    pub q: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
