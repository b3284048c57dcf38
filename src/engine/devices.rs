use serde::Serialize;

use super::Engine;
use super::gate::is_well_formed;
use crate::db::queries;
use crate::error::{AppError, Result};
use crate::models::{
    ConnectionLog, DEFAULT_CONNECTION_TYPE, Device, DeviceHeartbeat, DeviceStatus,
    InitiateConnection,
};
use crate::packager::permanent_password;
use crate::util::unix_now;

/// What a technician needs to open a session to a device.
#[derive(Debug, Clone, Serialize)]
pub struct ConnectionInfo {
    pub connection: ConnectionLog,
    pub device: Device,
    pub password: String,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Engine {
    /// Record an agent call-home.
    ///
    /// A supplied support code is bound to the device only while it is valid,
    /// and then the customer name comes from the code.
    pub fn register_heartbeat(&self, input: DeviceHeartbeat) -> Result<Device> {
        let device_name = input.device_name.trim().to_string();
        if device_name.is_empty() {
            return Err(AppError::Validation("Device name is required".into()));
        }

        let conn = self.store.conn()?;
        let now = unix_now();

        // Codes are matched exactly, the same way redemption matches them
        let bound_code = match input.support_code.filter(|c| !c.trim().is_empty()) {
            Some(code) if is_well_formed(&code) => {
                let valid = queries::get_valid_support_code(&conn, &code, now)?;
                if valid.is_none() {
                    tracing::debug!("Heartbeat carried unusable support code {}, ignoring", code);
                }
                valid
            }
            Some(code) => {
                tracing::debug!("Heartbeat carried malformed support code {:?}, ignoring", code);
                None
            }
            None => None,
        };

        let customer_name = match &bound_code {
            Some(sc) => Some(sc.customer_name.clone()),
            None => non_blank(input.customer_name),
        };

        let heartbeat = DeviceHeartbeat {
            device_id: non_blank(input.device_id),
            support_code: bound_code.map(|sc| sc.code),
            customer_name: customer_name.clone(),
            device_name,
            os: non_blank(input.os),
        };

        let device = queries::upsert_device_heartbeat(&conn, &heartbeat, customer_name.as_deref())?;
        tracing::debug!("Heartbeat from device {} ({})", device.id, device.device_name);
        Ok(device)
    }

    /// Open a technician session to an online device.
    pub fn initiate_connection(&self, input: InitiateConnection) -> Result<ConnectionInfo> {
        let device_id = non_blank(input.device_id)
            .ok_or_else(|| AppError::Validation("Device ID is required".into()))?;

        let conn = self.store.conn()?;
        let device = queries::get_device_by_id(&conn, &device_id)?
            .ok_or_else(|| AppError::NotFound("Device not found".into()))?;

        if device.status_at(unix_now()) != DeviceStatus::Online {
            return Err(AppError::BadRequest("Device is not online".into()));
        }

        let Some(code) = device.support_code.as_deref() else {
            return Err(AppError::Conflict(
                "Device has no support code bound; unattended password unknown".into(),
            ));
        };
        let password = permanent_password(code);

        let connection_type =
            non_blank(input.connection_type).unwrap_or_else(|| DEFAULT_CONNECTION_TYPE.to_string());
        let technician_id = non_blank(input.technician_id);

        let connection = queries::create_connection_log(
            &conn,
            &device.id,
            technician_id.as_deref(),
            &connection_type,
        )?;

        tracing::info!(
            "Connection {} initiated to device {} ({})",
            connection.id,
            device.id,
            connection.connection_type
        );

        Ok(ConnectionInfo {
            connection,
            device,
            password,
        })
    }

    pub fn end_connection(&self, connection_id: &str) -> Result<ConnectionLog> {
        let conn = self.store.conn()?;
        let log = queries::end_connection_log(&conn, connection_id)?
            .ok_or_else(|| AppError::NotFound("Active connection not found".into()))?;

        tracing::info!(
            "Connection {} ended after {}s",
            log.id,
            log.duration.unwrap_or(0)
        );
        Ok(log)
    }
}
