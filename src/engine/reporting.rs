use super::Engine;
use crate::db::queries;
use crate::error::{AppError, Result};
use crate::models::{
    Activity, ActivityKind, DashboardStats, DeviceWithStatus, ONLINE_WINDOW_SECONDS,
    SupportCodeListing,
};
use crate::util::unix_now;

const ACTIVITY_WINDOW_SECONDS: i64 = 24 * 60 * 60;
const ACTIVITY_PER_KIND: i64 = 5;
const ACTIVITY_LIMIT: usize = 10;

impl Engine {
    pub fn stats(&self) -> Result<DashboardStats> {
        self.stats_at(unix_now())
    }

    pub fn stats_at(&self, now: i64) -> Result<DashboardStats> {
        let conn = self.store.conn()?;
        Ok(DashboardStats {
            online_devices: queries::count_devices_seen_since(&conn, now - ONLINE_WINDOW_SECONDS)?,
            total_customers: queries::count_distinct_customers(&conn)?,
            active_codes: queries::count_active_support_codes(&conn, now)?,
            active_sessions: queries::count_active_connections(&conn)?,
        })
    }

    /// Every known device with its derived status, most recently seen first.
    pub fn list_devices(&self) -> Result<Vec<DeviceWithStatus>> {
        let conn = self.store.conn()?;
        let now = unix_now();
        Ok(queries::list_devices(&conn)?
            .into_iter()
            .map(|d| DeviceWithStatus::at(d, now))
            .collect())
    }

    pub fn get_device_status(&self, device_id: &str) -> Result<DeviceWithStatus> {
        let conn = self.store.conn()?;
        let device = queries::get_device_by_id(&conn, device_id)?
            .ok_or_else(|| AppError::NotFound("Device not found".into()))?;
        Ok(DeviceWithStatus::at(device, unix_now()))
    }

    /// Codes issued and devices registered in the last day, newest first.
    pub fn recent_activity(&self) -> Result<Vec<Activity>> {
        self.recent_activity_at(unix_now())
    }

    pub fn recent_activity_at(&self, now: i64) -> Result<Vec<Activity>> {
        let conn = self.store.conn()?;
        let since = now - ACTIVITY_WINDOW_SECONDS;

        let codes = queries::list_support_codes_created_since(&conn, since, ACTIVITY_PER_KIND)?;
        let devices = queries::list_devices_created_since(&conn, since, ACTIVITY_PER_KIND)?;

        let mut feed: Vec<Activity> = codes
            .into_iter()
            .map(|c| Activity {
                kind: ActivityKind::CodeGenerated,
                title: format!("Support code {} issued", c.code),
                description: format!("For {}", c.customer_name),
                timestamp: c.created_at,
            })
            .chain(devices.into_iter().map(|d| Activity {
                kind: ActivityKind::DeviceRegistered,
                title: format!("Device {} registered", d.device_name),
                description: match d.customer_name {
                    Some(name) => format!("Customer: {}", name),
                    None => "Customer unknown".to_string(),
                },
                timestamp: d.created_at,
            }))
            .collect();

        feed.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        feed.truncate(ACTIVITY_LIMIT);
        Ok(feed)
    }

    /// One page of support codes, newest first, with validity evaluated now.
    pub fn list_support_codes(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<SupportCodeListing>, i64)> {
        let conn = self.store.conn()?;
        let now = unix_now();
        let (codes, total) = queries::list_support_codes_paginated(&conn, limit, offset)?;

        let listings = codes
            .into_iter()
            .map(|code| SupportCodeListing {
                is_valid: code.is_valid_at(now),
                code,
            })
            .collect();

        Ok((listings, total))
    }
}
