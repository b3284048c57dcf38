use axum::extract::State;
use serde::Serialize;

use crate::db::AppState;
use crate::error::Result;
use crate::extractors::{Json, Path};
use crate::models::{ConnectionLog, InitiateConnection};

#[derive(Debug, Serialize)]
pub struct ConnectionDetails {
    pub connection_id: String,
    pub device_id: String,
    pub device_name: String,
    pub password: String,
    pub server: String,
    pub connection_type: String,
    pub started_at: i64,
}

#[derive(Debug, Serialize)]
pub struct ConnectResponse {
    pub success: bool,
    pub connection_info: ConnectionDetails,
}

/// POST /api/connect - Start a technician session to an online device
pub async fn connect_to_device(
    State(state): State<AppState>,
    Json(input): Json<InitiateConnection>,
) -> Result<Json<ConnectResponse>> {
    let info = state.engine.initiate_connection(input)?;

    Ok(Json(ConnectResponse {
        success: true,
        connection_info: ConnectionDetails {
            connection_id: info.connection.id,
            device_id: info.device.id,
            device_name: info.device.device_name,
            password: info.password,
            server: state.server_domain.clone(),
            connection_type: info.connection.connection_type,
            started_at: info.connection.started_at,
        },
    }))
}

/// POST /api/connections/{connection_id}/end
pub async fn end_connection(
    State(state): State<AppState>,
    Path(connection_id): Path<String>,
) -> Result<Json<ConnectionLog>> {
    Ok(Json(state.engine.end_connection(&connection_id)?))
}
