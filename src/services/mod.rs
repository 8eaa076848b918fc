pub mod classifier;
pub mod deal_service;
pub mod health_service;
pub mod insight_service;
pub mod metrics_service;
pub mod recommendation_service;
pub mod snapshot_service;
