// crates/server/src/routes/mod.rs
//! Route handlers for the review sentiment server.

pub mod charts;
pub mod companies;
pub mod dashboard;
pub mod health;

use std::sync::Arc;

use axum::Router;

use crate::state::AppState;

/// Create the combined router.
///
/// Routes:
/// - GET /api/health - Health check
/// - GET /api/companies - Sorted distinct company names
/// - GET /api/companies/{name} - Per-record values for one company
/// - GET / - Company listing page
/// - GET /company?name= - Company detail page
/// - GET /dashboard - Chart dashboard page
/// - GET /{file}.png - Chart image
pub fn api_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .nest("/api", health::router())
        .nest("/api", companies::router())
        .merge(companies::pages_router())
        .merge(dashboard::router())
        .merge(charts::router())
        .with_state(state)
}
