//! HTTP API server for schatzkarte.

pub mod api_error;
mod blocking;
mod handlers;
mod query_types;
mod response_types;

use std::sync::Arc;

use axum::{
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::CorsLayer;

use schatzkarte_service::{MapService, ProgressService, RewardService};

pub use response_types::VersionResponse;

/// Shared application state for all HTTP handlers.
///
/// Contains the three progression services. Wrapped in `Arc` for
/// thread-safe sharing across handlers.
pub struct AppState {
    /// The static module catalog, seeded once at startup
    pub catalog: Arc<schatzkarte_core::Catalog>,
    /// Read path: map projection for a user
    pub map_service: Arc<MapService>,
    /// Write path: reward ledger
    pub reward_service: Arc<RewardService>,
    /// Flags, streak activity, goals
    pub progress_service: Arc<ProgressService>,
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/version", get(version))
        .route("/api/catalog", get(handlers::map::get_catalog))
        .route("/api/map", get(handlers::map::get_map))
        .route("/api/progress/flag", post(handlers::progress::set_flag))
        .route("/api/rewards/collect", post(handlers::rewards::collect_reward))
        .route("/api/stats/{user}", get(handlers::stats::get_stats))
        .route("/api/stats/{user}/recompute", post(handlers::stats::recompute_stats))
        .route("/api/activity", post(handlers::stats::record_activity))
        .route("/api/goals", post(handlers::progress::set_goal))
        .route("/api/goals/achieve", post(handlers::progress::achieve_goal))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

async fn version() -> (StatusCode, Json<VersionResponse>) {
    (StatusCode::OK, Json(VersionResponse { version: env!("CARGO_PKG_VERSION") }))
}
