use serde::{Deserialize, Serialize};

/// Seen within this window counts as online.
pub const ONLINE_WINDOW_SECONDS: i64 = 5 * 60;
/// Seen within this window counts as recent.
pub const RECENT_WINDOW_SECONDS: i64 = 60 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceStatus {
    Online,
    Recent,
    Offline,
}

impl DeviceStatus {
    pub fn from_last_seen(last_seen: i64, now: i64) -> Self {
        if last_seen > now - ONLINE_WINDOW_SECONDS {
            DeviceStatus::Online
        } else if last_seen > now - RECENT_WINDOW_SECONDS {
            DeviceStatus::Recent
        } else {
            DeviceStatus::Offline
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Device {
    pub id: String,
    /// Support code the installed agent was packaged with
    pub support_code: Option<String>,
    pub customer_name: Option<String>,
    pub device_name: String,
    pub os: Option<String>,
    pub last_seen: i64,
    pub created_at: i64,
}

impl Device {
    pub fn status_at(&self, now: i64) -> DeviceStatus {
        DeviceStatus::from_last_seen(self.last_seen, now)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DeviceWithStatus {
    #[serde(flatten)]
    pub device: Device,
    pub status: DeviceStatus,
}

impl DeviceWithStatus {
    pub fn at(device: Device, now: i64) -> Self {
        let status = device.status_at(now);
        Self { device, status }
    }
}

/// Body sent by the installed agent when it calls home.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeviceHeartbeat {
    /// Omitted on first contact; the response carries the assigned id
    #[serde(default)]
    pub device_id: Option<String>,
    #[serde(default)]
    pub support_code: Option<String>,
    #[serde(default)]
    pub customer_name: Option<String>,
    pub device_name: String,
    #[serde(default)]
    pub os: Option<String>,
}
