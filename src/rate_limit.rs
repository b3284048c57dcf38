//! Per-IP rate limiting for the unauthenticated routes.
//!
//! Support codes are only six digits, so the redemption endpoints are the
//! ones worth throttling.
//!
//! Tiers:
//! - Customer: /api/customer/installer, /api/track-download
//! - Relaxed: /health, /api/status
//!
//! Configure via environment variables:
//! - RATE_LIMIT_CUSTOMER_RPM (default: 30)
//! - RATE_LIMIT_RELAXED_RPM (default: 60)

use std::sync::Arc;
use std::time::Duration;
use tower_governor::GovernorLayer;
use tower_governor::governor::GovernorConfigBuilder;

/// Rate limiter layer type alias using governor types directly
pub type RateLimitLayer = GovernorLayer<
    tower_governor::key_extractor::PeerIpKeyExtractor,
    governor::middleware::NoOpMiddleware<governor::clock::QuantaInstant>,
    axum::body::Body,
>;

/// Replenish one request every `60s / rpm`, allowing a full minute's burst.
fn create_layer(requests_per_minute: u32) -> RateLimitLayer {
    let rpm = requests_per_minute.max(1);
    let period_ms = (60_000 / u64::from(rpm)).max(1);

    let config = GovernorConfigBuilder::default()
        .period(Duration::from_millis(period_ms))
        .burst_size(rpm)
        .finish()
        .expect("non-zero period and burst always build a governor config");

    GovernorLayer::new(Arc::new(config))
}

pub fn customer_layer(requests_per_minute: u32) -> RateLimitLayer {
    create_layer(requests_per_minute)
}

pub fn relaxed_layer(requests_per_minute: u32) -> RateLimitLayer {
    create_layer(requests_per_minute)
}
