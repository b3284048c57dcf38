//! Endpoints called by the installed remote-access agent.

use axum::{Router, extract::State, routing::post};
use serde::Serialize;

use crate::db::AppState;
use crate::error::Result;
use crate::extractors::Json;
use crate::models::{DeviceHeartbeat, DeviceStatus};
use crate::util::unix_now;

#[derive(Debug, Serialize)]
pub struct HeartbeatResponse {
    pub success: bool,
    pub device_id: String,
    pub status: DeviceStatus,
    pub support_code: Option<String>,
}

/// POST /api/agent/heartbeat
pub async fn heartbeat(
    State(state): State<AppState>,
    Json(body): Json<DeviceHeartbeat>,
) -> Result<Json<HeartbeatResponse>> {
    let device = state.engine.register_heartbeat(body)?;

    Ok(Json(HeartbeatResponse {
        success: true,
        status: device.status_at(unix_now()),
        device_id: device.id,
        support_code: device.support_code,
    }))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/agent/heartbeat", post(heartbeat))
}
