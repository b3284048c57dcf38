mod connections;
mod devices;
mod reporting;
mod support_codes;

pub use connections::*;
pub use devices::*;
pub use reporting::*;
pub use support_codes::*;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::db::AppState;
use crate::middleware::admin_auth;

pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/api/support-codes", post(create_support_code))
        .route("/api/support-codes", get(list_support_codes))
        .route("/api/support-codes/{code}/revoke", post(revoke_support_code))
        .route("/api/stats", get(get_stats))
        .route("/api/activity", get(get_activity))
        .route("/api/devices", get(list_devices))
        .route("/api/devices/{device_id}", get(get_device))
        .route("/api/connect", post(connect_to_device))
        .route("/api/connections/{connection_id}/end", post(end_connection))
        .layer(middleware::from_fn_with_state(state, admin_auth))
}
