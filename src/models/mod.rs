mod card;
mod catalog;
mod deal;
mod insight;
mod ledger;
mod metrics;
mod profile;
mod recommendation;
mod snapshot;
mod spending;

pub use card::{CardAccount, CreateCardAccount, UpdateCardAccount};
pub use catalog::{CardTier, CatalogCard, CatalogQueryParams, CategoryReward};
pub use deal::{CardOffer, Deal, DealMatch, DealType, PersonalizedDealsParams};
pub use insight::{
    ActionType, Insight, InsightCategory, InsightPriority, NewAction, NewInsight, NextBestAction,
};
pub use ledger::{CreateLedgerEntry, Frequency, LedgerEntry, UpdateLedgerEntry};
pub use metrics::FinancialMetrics;
pub use profile::{UpsertProfile, UserProfile};
pub use recommendation::{
    CardRecommendation, NewRecommendation, RecommendationReason, RecommendationTarget,
};
pub use snapshot::{FinancialSnapshot, HealthBand, ScenarioCode};
pub use spending::{SpendingCategoryAggregate, Trend, UpsertSpending};
