use axum::extract::State;
use chrono::Utc;
use serde::Serialize;

use crate::db::AppState;
use crate::extractors::Json;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Debug, Serialize)]
pub struct SystemStatus {
    pub online: bool,
    pub server: String,
    pub timestamp: String,
}

/// GET /api/status - Portal banner status
pub async fn system_status(State(state): State<AppState>) -> Json<SystemStatus> {
    Json(SystemStatus {
        online: true,
        server: state.server_domain.clone(),
        timestamp: Utc::now().to_rfc3339(),
    })
}
