use axum::extract::State;

use crate::db::AppState;
use crate::error::Result;
use crate::extractors::{Json, Path};
use crate::models::DeviceWithStatus;

/// GET /api/devices
pub async fn list_devices(State(state): State<AppState>) -> Result<Json<Vec<DeviceWithStatus>>> {
    Ok(Json(state.engine.list_devices()?))
}

/// GET /api/devices/{device_id}
pub async fn get_device(
    State(state): State<AppState>,
    Path(device_id): Path<String>,
) -> Result<Json<DeviceWithStatus>> {
    Ok(Json(state.engine.get_device_status(&device_id)?))
}
