mod installer;
mod status;

pub use installer::*;
pub use status::*;

use axum::{
    Router,
    routing::{get, post},
};

use crate::config::RateLimitConfig;
use crate::db::AppState;
use crate::rate_limit;

/// Customer-portal routes.
///
/// Code redemption and download tracking share the customer tier since the
/// code space is small enough to enumerate; liveness probes get the relaxed
/// tier. `None` disables rate limiting (tests have no peer address).
pub fn router(limits: Option<RateLimitConfig>) -> Router<AppState> {
    let redeem = Router::new()
        .route("/api/customer/installer", post(request_installer))
        .route("/api/track-download", post(track_download));

    let probes = Router::new()
        .route("/health", get(health))
        .route("/api/status", get(system_status));

    match limits {
        Some(limits) => redeem
            .layer(rate_limit::customer_layer(limits.customer_rpm))
            .merge(probes.layer(rate_limit::relaxed_layer(limits.relaxed_rpm))),
        None => redeem.merge(probes),
    }
}
