//! ConnectAssist - support-code issuance and installer packaging
//!
//! Technicians issue short-lived six-digit support codes; customers redeem a
//! code on the portal for a pre-configured remote-access installer that is
//! built once per code and cached on disk.

pub mod config;
pub mod db;
pub mod engine;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod packager;
pub mod pagination;
pub mod rate_limit;
pub mod util;

use axum::{
    Router,
    http::{HeaderName, Method},
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::RateLimitConfig;
use crate::db::AppState;

/// Assemble the full HTTP surface. `rate_limit: None` leaves the customer
/// routes unthrottled, which tests need since they carry no peer address.
pub fn app(state: AppState, rate_limit: Option<RateLimitConfig>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            HeaderName::from_static("authorization"),
            HeaderName::from_static("content-type"),
        ]);

    Router::new()
        .merge(handlers::customer::router(rate_limit))
        .merge(handlers::agent::router())
        .merge(handlers::admin::router(state.clone()))
        .nest_service("/downloads", ServeDir::new(&state.downloads_path))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
