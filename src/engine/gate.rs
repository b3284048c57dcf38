use rusqlite::Connection;

use crate::db::queries;
use crate::error::{AppError, Result};
use crate::models::{SUPPORT_CODE_LEN, SupportCode};

/// A support code that passed the gate: well formed, active and unexpired
/// at the time it was checked. Only the gate can construct one.
#[derive(Debug, Clone)]
pub struct ValidatedCode {
    support_code: SupportCode,
}

impl ValidatedCode {
    pub fn code(&self) -> &str {
        &self.support_code.code
    }

    pub fn support_code(&self) -> &SupportCode {
        &self.support_code
    }

    pub fn into_support_code(self) -> SupportCode {
        self.support_code
    }
}

pub fn is_well_formed(raw: &str) -> bool {
    raw.len() == SUPPORT_CODE_LEN && raw.bytes().all(|b| b.is_ascii_digit())
}

/// Shape check only. Never touches the store.
pub fn check_format(raw: &str) -> Result<()> {
    if is_well_formed(raw) {
        Ok(())
    } else {
        Err(AppError::MalformedCode)
    }
}

pub fn check_at(conn: &Connection, raw: &str, now: i64) -> Result<ValidatedCode> {
    check_format(raw)?;

    queries::get_valid_support_code(conn, raw, now)?
        .map(|support_code| ValidatedCode { support_code })
        .ok_or(AppError::InvalidOrExpiredCode)
}
