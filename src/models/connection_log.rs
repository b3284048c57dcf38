use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

pub const DEFAULT_CONNECTION_TYPE: &str = "desktop";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ConnectionStatus {
    Active,
    Ended,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionLog {
    pub id: String,
    pub device_id: String,
    pub technician_id: Option<String>,
    pub connection_type: String,
    pub started_at: i64,
    pub ended_at: Option<i64>,
    /// Seconds between start and end, set when the session ends
    pub duration: Option<i64>,
    pub status: ConnectionStatus,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InitiateConnection {
    #[serde(default)]
    pub device_id: Option<String>,
    #[serde(default)]
    pub connection_type: Option<String>,
    #[serde(default)]
    pub technician_id: Option<String>,
}
