//! Row mapping trait and helpers for reducing boilerplate in queries.

use rusqlite::{Connection, OptionalExtension, Row, ToSql};

use crate::models::*;

/// Parse a string column into an enum type, converting parse errors to rusqlite errors
/// instead of panicking on unexpected values.
fn parse_enum<T: std::str::FromStr>(row: &Row, col: usize, col_name: &str) -> rusqlite::Result<T> {
    row.get::<_, String>(col)?.parse::<T>().map_err(|_| {
        rusqlite::Error::InvalidColumnType(col, col_name.to_string(), rusqlite::types::Type::Text)
    })
}

/// Trait for constructing a type from a database row.
pub trait FromRow: Sized {
    fn from_row(row: &Row) -> rusqlite::Result<Self>;
}

/// Query for a single optional result.
pub fn query_one<T: FromRow>(
    conn: &Connection,
    sql: &str,
    params: &[&dyn ToSql],
) -> crate::error::Result<Option<T>> {
    conn.query_row(sql, params, T::from_row)
        .optional()
        .map_err(Into::into)
}

/// Query for multiple results.
pub fn query_all<T: FromRow>(
    conn: &Connection,
    sql: &str,
    params: &[&dyn ToSql],
) -> crate::error::Result<Vec<T>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params, T::from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

// ============ SQL SELECT Constants ============

pub const SUPPORT_CODE_COLS: &str = "id, code, status, customer_name, customer_email, customer_phone, session_notes, created_at, expires_at";

pub const CLIENT_PACKAGE_COLS: &str = "id, support_code, package_path, package_name, created_at, downloaded_at, customer_name, customer_email, customer_phone, session_notes";

pub const DEVICE_COLS: &str = "id, support_code, customer_name, device_name, os, last_seen, created_at";

pub const CONNECTION_LOG_COLS: &str =
    "id, device_id, technician_id, connection_type, started_at, ended_at, duration, status";

// ============ FromRow Implementations ============

impl FromRow for SupportCode {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(SupportCode {
            id: row.get(0)?,
            code: row.get(1)?,
            status: parse_enum(row, 2, "status")?,
            customer_name: row.get(3)?,
            customer_email: row.get(4)?,
            customer_phone: row.get(5)?,
            session_notes: row.get(6)?,
            created_at: row.get(7)?,
            expires_at: row.get(8)?,
        })
    }
}

impl FromRow for ClientPackage {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(ClientPackage {
            id: row.get(0)?,
            support_code: row.get(1)?,
            package_path: row.get(2)?,
            package_name: row.get(3)?,
            created_at: row.get(4)?,
            downloaded_at: row.get(5)?,
            customer_name: row.get(6)?,
            customer_email: row.get(7)?,
            customer_phone: row.get(8)?,
            session_notes: row.get(9)?,
        })
    }
}

impl FromRow for Device {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Device {
            id: row.get(0)?,
            support_code: row.get(1)?,
            customer_name: row.get(2)?,
            device_name: row.get(3)?,
            os: row.get(4)?,
            last_seen: row.get(5)?,
            created_at: row.get(6)?,
        })
    }
}

impl FromRow for ConnectionLog {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(ConnectionLog {
            id: row.get(0)?,
            device_id: row.get(1)?,
            technician_id: row.get(2)?,
            connection_type: row.get(3)?,
            started_at: row.get(4)?,
            ended_at: row.get(5)?,
            duration: row.get(6)?,
            status: parse_enum(row, 7, "status")?,
        })
    }
}
