use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    CodeGenerated,
    DeviceRegistered,
}

/// One entry in the dashboard's recent-activity feed.
#[derive(Debug, Clone, Serialize)]
pub struct Activity {
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    pub title: String,
    pub description: String,
    pub timestamp: i64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DashboardStats {
    pub online_devices: i64,
    pub total_customers: i64,
    pub active_codes: i64,
    pub active_sessions: i64,
}
