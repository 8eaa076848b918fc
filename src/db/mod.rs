pub mod card_queries;
pub mod catalog_queries;
pub mod deal_queries;
pub mod insight_queries;
pub mod ledger_queries;
pub mod profile_queries;
pub mod recommendation_queries;
pub mod snapshot_queries;
pub mod spending_queries;
