use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DealType {
    Cashback,
    Discount,
    Bogo,
    Freebie,
    Voucher,
    Points,
}

impl DealType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DealType::Cashback => "cashback",
            DealType::Discount => "discount",
            DealType::Bogo => "bogo",
            DealType::Freebie => "freebie",
            DealType::Voucher => "voucher",
            DealType::Points => "points",
        }
    }

    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s {
            "cashback" => Some(DealType::Cashback),
            "discount" => Some(DealType::Discount),
            "bogo" => Some(DealType::Bogo),
            "freebie" => Some(DealType::Freebie),
            "voucher" => Some(DealType::Voucher),
            "points" => Some(DealType::Points),
            _ => None,
        }
    }
}

impl std::fmt::Display for DealType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Extra discount a specific bank's cards get on a deal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardOffer {
    pub bank_name: String,
    pub card_name: Option<String>,
    /// Additional discount on top of the base deal, as a percentage.
    pub additional_discount: f64,
}

/// A merchant deal with optional per-card sweeteners and engagement counters.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Deal {
    pub id: Uuid,
    pub merchant: String,
    pub category: String,
    pub deal_type: String, // Converted to/from DealType
    /// Percentage for cashback/discount, point count for points, flat amount
    /// for bogo/freebie/voucher.
    pub value: f64,
    pub max_discount: Option<f64>,
    pub min_transaction: Option<f64>,
    pub card_offers: Json<Vec<CardOffer>>,
    pub valid_from: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
    pub is_featured: bool,
    pub views: i64,
    pub clicks: i64,
    pub redemptions: i64,
    pub popularity_score: f64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Deal {
    pub fn deal_type(&self) -> Option<DealType> {
        DealType::from_str_opt(&self.deal_type)
    }

    /// Engagement-weighted popularity: redemptions×10 + clicks×2 + views.
    pub fn compute_popularity(views: i64, clicks: i64, redemptions: i64) -> f64 {
        (redemptions * 10 + clicks * 2 + views) as f64
    }
}

/// Savings breakdown for one deal matched against a user's wallet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DealMatch {
    pub deal_id: Uuid,
    pub merchant: String,
    /// Deal value at the reference transaction amount, before card offers.
    pub base_savings: f64,
    /// Best additional savings among the user's own cards, if any apply.
    pub user_card_savings: f64,
    /// Best additional savings available from any card on the market.
    pub market_card_savings: f64,
    pub total_savings: f64,
    /// Bank whose card produced the winning additional savings.
    pub best_card_bank: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PersonalizedDealsParams {
    pub limit: Option<i64>,
}
