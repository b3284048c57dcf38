use rusqlite::{Connection, params};
use uuid::Uuid;

use crate::error::Result;
use crate::models::*;
use crate::packager::BuiltArtifact;
use crate::util::unix_now;

use super::from_row::{
    CLIENT_PACKAGE_COLS, CONNECTION_LOG_COLS, DEVICE_COLS, SUPPORT_CODE_COLS, query_all,
    query_one,
};

fn gen_id() -> String {
    Uuid::new_v4().to_string()
}

// ============ Support Codes ============

/// True if some active row with this code has not yet expired at `now`.
pub fn code_is_live(conn: &Connection, code: &str, now: i64) -> Result<bool> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM support_codes WHERE code = ?1 AND status = 'active' AND expires_at > ?2)",
        params![code, now],
        |row| row.get(0),
    )?;
    Ok(exists)
}

pub fn insert_support_code(
    conn: &Connection,
    code: &str,
    metadata: &CustomerMetadata,
    created_at: i64,
    expires_at: i64,
) -> Result<SupportCode> {
    let id = gen_id();

    conn.execute(
        "INSERT INTO support_codes (id, code, status, customer_name, customer_email, customer_phone, session_notes, created_at, expires_at)
         VALUES (?1, ?2, 'active', ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            &id,
            code,
            &metadata.customer_name,
            &metadata.customer_email,
            &metadata.customer_phone,
            &metadata.session_notes,
            created_at,
            expires_at,
        ],
    )?;

    Ok(SupportCode {
        id,
        code: code.to_string(),
        status: CodeStatus::Active,
        customer_name: metadata.customer_name.clone(),
        customer_email: metadata.customer_email.clone(),
        customer_phone: metadata.customer_phone.clone(),
        session_notes: metadata.session_notes.clone(),
        created_at,
        expires_at,
    })
}

/// The row that makes `code` redeemable at `now`, if any.
pub fn get_valid_support_code(
    conn: &Connection,
    code: &str,
    now: i64,
) -> Result<Option<SupportCode>> {
    query_one(
        conn,
        &format!(
            "SELECT {} FROM support_codes
             WHERE code = ?1 AND status = 'active' AND expires_at > ?2
             ORDER BY created_at DESC, rowid DESC LIMIT 1",
            SUPPORT_CODE_COLS
        ),
        &[&code, &now],
    )
}

pub fn get_support_code_by_id(conn: &Connection, id: &str) -> Result<Option<SupportCode>> {
    query_one(
        conn,
        &format!("SELECT {} FROM support_codes WHERE id = ?1", SUPPORT_CODE_COLS),
        &[&id],
    )
}

/// Flip every active row for `code` to inactive. Returns the number of rows changed.
pub fn revoke_support_code(conn: &Connection, code: &str) -> Result<usize> {
    let affected = conn.execute(
        "UPDATE support_codes SET status = 'inactive' WHERE code = ?1 AND status = 'active'",
        params![code],
    )?;
    Ok(affected)
}

pub fn list_support_codes_paginated(
    conn: &Connection,
    limit: i64,
    offset: i64,
) -> Result<(Vec<SupportCode>, i64)> {
    let total: i64 = conn.query_row("SELECT COUNT(*) FROM support_codes", [], |row| row.get(0))?;

    let codes = query_all(
        conn,
        &format!(
            "SELECT {} FROM support_codes ORDER BY created_at DESC, rowid DESC LIMIT ?1 OFFSET ?2",
            SUPPORT_CODE_COLS
        ),
        &[&limit, &offset],
    )?;

    Ok((codes, total))
}

pub fn count_active_support_codes(conn: &Connection, now: i64) -> Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM support_codes WHERE status = 'active' AND expires_at > ?1",
        params![now],
        |row| row.get(0),
    )
    .map_err(Into::into)
}

pub fn list_support_codes_created_since(
    conn: &Connection,
    since: i64,
    limit: i64,
) -> Result<Vec<SupportCode>> {
    query_all(
        conn,
        &format!(
            "SELECT {} FROM support_codes WHERE created_at > ?1 ORDER BY created_at DESC, rowid DESC LIMIT ?2",
            SUPPORT_CODE_COLS
        ),
        &[&since, &limit],
    )
}

// ============ Client Packages ============

/// Latest package built for a specific support code row.
pub fn get_latest_package_for_code_id(
    conn: &Connection,
    support_code_id: &str,
) -> Result<Option<ClientPackage>> {
    query_one(
        conn,
        &format!(
            "SELECT {} FROM client_packages WHERE support_code_id = ?1
             ORDER BY created_at DESC, rowid DESC LIMIT 1",
            CLIENT_PACKAGE_COLS
        ),
        &[&support_code_id],
    )
}

/// Latest package carrying this code value, across every row that ever held it.
pub fn get_latest_package_for_code(conn: &Connection, code: &str) -> Result<Option<ClientPackage>> {
    query_one(
        conn,
        &format!(
            "SELECT {} FROM client_packages WHERE support_code = ?1
             ORDER BY created_at DESC, rowid DESC LIMIT 1",
            CLIENT_PACKAGE_COLS
        ),
        &[&code],
    )
}

pub fn list_packages_for_code(conn: &Connection, code: &str) -> Result<Vec<ClientPackage>> {
    query_all(
        conn,
        &format!(
            "SELECT {} FROM client_packages WHERE support_code = ?1
             ORDER BY created_at DESC, rowid DESC",
            CLIENT_PACKAGE_COLS
        ),
        &[&code],
    )
}

pub fn insert_client_package(
    conn: &Connection,
    support_code: &SupportCode,
    artifact: &BuiltArtifact,
    metadata: &CustomerMetadata,
    created_at: i64,
) -> Result<ClientPackage> {
    let id = gen_id();
    let package_path = artifact.artifact_path.to_string_lossy().into_owned();

    conn.execute(
        "INSERT INTO client_packages (id, support_code_id, support_code, package_path, package_name, created_at, customer_name, customer_email, customer_phone, session_notes)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            &id,
            &support_code.id,
            &support_code.code,
            &package_path,
            &artifact.artifact_name,
            created_at,
            &metadata.customer_name,
            &metadata.customer_email,
            &metadata.customer_phone,
            &metadata.session_notes,
        ],
    )?;

    Ok(ClientPackage {
        id,
        support_code: support_code.code.clone(),
        package_path,
        package_name: artifact.artifact_name.clone(),
        created_at,
        downloaded_at: None,
        customer_name: metadata.customer_name.clone(),
        customer_email: metadata.customer_email.clone(),
        customer_phone: metadata.customer_phone.clone(),
        session_notes: metadata.session_notes.clone(),
    })
}

pub fn set_package_downloaded_at(conn: &Connection, package_id: &str, at: i64) -> Result<bool> {
    let affected = conn.execute(
        "UPDATE client_packages SET downloaded_at = ?1 WHERE id = ?2",
        params![at, package_id],
    )?;
    Ok(affected > 0)
}

/// Packages whose support code is no longer redeemable and whose file is
/// not shared with a package of a still-valid code.
pub fn list_stale_packages(conn: &Connection, now: i64) -> Result<Vec<ClientPackage>> {
    query_all(
        conn,
        &format!(
            "SELECT {} FROM client_packages WHERE id IN (
                 SELECT p.id FROM client_packages p
                 WHERE NOT EXISTS (
                     SELECT 1 FROM support_codes s
                     WHERE s.id = p.support_code_id AND s.status = 'active' AND s.expires_at > ?1
                 )
                 AND p.package_path NOT IN (
                     SELECT p2.package_path FROM client_packages p2
                     JOIN support_codes s2 ON s2.id = p2.support_code_id
                     WHERE s2.status = 'active' AND s2.expires_at > ?1
                 )
             )
             ORDER BY created_at",
            CLIENT_PACKAGE_COLS
        ),
        &[&now],
    )
}

// ============ Devices ============

/// Record an agent call-home: create the device on first contact, otherwise
/// refresh its details and `last_seen`. Omitted fields keep their stored values.
pub fn upsert_device_heartbeat(
    conn: &Connection,
    input: &DeviceHeartbeat,
    customer_name: Option<&str>,
) -> Result<Device> {
    let now = unix_now();

    if let Some(id) = input.device_id.as_deref() {
        let updated = conn.execute(
            "UPDATE devices
             SET device_name = ?1,
                 os = COALESCE(?2, os),
                 support_code = COALESCE(?3, support_code),
                 customer_name = COALESCE(?4, customer_name),
                 last_seen = ?5
             WHERE id = ?6",
            params![
                &input.device_name,
                &input.os,
                &input.support_code,
                customer_name,
                now,
                id
            ],
        )?;

        if updated > 0 {
            if let Some(device) = get_device_by_id(conn, id)? {
                return Ok(device);
            }
        }
    }

    let id = input.device_id.clone().unwrap_or_else(gen_id);

    conn.execute(
        "INSERT INTO devices (id, support_code, customer_name, device_name, os, last_seen, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            &id,
            &input.support_code,
            customer_name,
            &input.device_name,
            &input.os,
            now,
            now
        ],
    )?;

    Ok(Device {
        id,
        support_code: input.support_code.clone(),
        customer_name: customer_name.map(String::from),
        device_name: input.device_name.clone(),
        os: input.os.clone(),
        last_seen: now,
        created_at: now,
    })
}

pub fn get_device_by_id(conn: &Connection, id: &str) -> Result<Option<Device>> {
    query_one(
        conn,
        &format!("SELECT {} FROM devices WHERE id = ?1", DEVICE_COLS),
        &[&id],
    )
}

pub fn list_devices(conn: &Connection) -> Result<Vec<Device>> {
    query_all(
        conn,
        &format!("SELECT {} FROM devices ORDER BY last_seen DESC", DEVICE_COLS),
        &[],
    )
}

pub fn list_devices_created_since(conn: &Connection, since: i64, limit: i64) -> Result<Vec<Device>> {
    query_all(
        conn,
        &format!(
            "SELECT {} FROM devices WHERE created_at > ?1 ORDER BY created_at DESC LIMIT ?2",
            DEVICE_COLS
        ),
        &[&since, &limit],
    )
}

pub fn count_devices_seen_since(conn: &Connection, since: i64) -> Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM devices WHERE last_seen > ?1",
        params![since],
        |row| row.get(0),
    )
    .map_err(Into::into)
}

pub fn count_distinct_customers(conn: &Connection) -> Result<i64> {
    conn.query_row(
        "SELECT COUNT(DISTINCT customer_name) FROM devices WHERE customer_name IS NOT NULL",
        [],
        |row| row.get(0),
    )
    .map_err(Into::into)
}

// ============ Connection Logs ============

pub fn create_connection_log(
    conn: &Connection,
    device_id: &str,
    technician_id: Option<&str>,
    connection_type: &str,
) -> Result<ConnectionLog> {
    let id = gen_id();
    let now = unix_now();

    conn.execute(
        "INSERT INTO connection_logs (id, device_id, technician_id, connection_type, started_at, status)
         VALUES (?1, ?2, ?3, ?4, ?5, 'active')",
        params![&id, device_id, technician_id, connection_type, now],
    )?;

    Ok(ConnectionLog {
        id,
        device_id: device_id.to_string(),
        technician_id: technician_id.map(String::from),
        connection_type: connection_type.to_string(),
        started_at: now,
        ended_at: None,
        duration: None,
        status: ConnectionStatus::Active,
    })
}

pub fn get_connection_log(conn: &Connection, id: &str) -> Result<Option<ConnectionLog>> {
    query_one(
        conn,
        &format!("SELECT {} FROM connection_logs WHERE id = ?1", CONNECTION_LOG_COLS),
        &[&id],
    )
}

/// End an active session. Returns None if the log does not exist or already ended.
pub fn end_connection_log(conn: &Connection, id: &str) -> Result<Option<ConnectionLog>> {
    let now = unix_now();
    let affected = conn.execute(
        "UPDATE connection_logs
         SET ended_at = ?1, duration = MAX(?1 - started_at, 0), status = 'ended'
         WHERE id = ?2 AND status = 'active'",
        params![now, id],
    )?;

    if affected == 0 {
        return Ok(None);
    }

    get_connection_log(conn, id)
}

pub fn count_active_connections(conn: &Connection) -> Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM connection_logs WHERE status = 'active'",
        [],
        |row| row.get(0),
    )
    .map_err(Into::into)
}
