use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::routes::{
    cards, catalog, deals, health, insights, ledger, profile, recommendations, snapshot, spending,
};
use crate::state::AppState;

pub fn create_app(state: AppState) -> Router {
    Router::<AppState>::new()
        .nest("/health", health::router())
        .nest("/api/catalog", catalog::router())
        .nest("/api/deals", deals::router())
        .nest("/api/users/:user_id/ledger", ledger::router())
        .nest("/api/users/:user_id/cards", cards::router())
        .nest("/api/users/:user_id/spending", spending::router())
        .nest("/api/users/:user_id/profile", profile::router())
        .nest("/api/users/:user_id/snapshot", snapshot::router())
        .nest("/api/users/:user_id/recommendations", recommendations::router())
        .nest("/api/users/:user_id/deals", deals::user_router())
        .nest("/api/users/:user_id/insights", insights::router())
        .nest("/api/users/:user_id/actions", insights::actions_router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
