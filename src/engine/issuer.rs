use rusqlite::TransactionBehavior;

use super::Engine;
use super::gate::check_format;
use super::generator::generate_unique_code;
use crate::db::queries;
use crate::error::{AppError, Result};
use crate::models::{CustomerMetadata, SUPPORT_CODE_TTL_SECONDS, SupportCode};
use crate::util::unix_now;

impl Engine {
    /// Issue a fresh support code valid for 24 hours. Never builds a package.
    pub fn issue_code(&self, metadata: &CustomerMetadata) -> Result<SupportCode> {
        self.issue_code_at(metadata, unix_now())
    }

    pub fn issue_code_at(&self, metadata: &CustomerMetadata, now: i64) -> Result<SupportCode> {
        if metadata.customer_name.trim().is_empty() {
            return Err(AppError::Validation("Customer name is required".into()));
        }

        let mut conn = self.store.conn()?;
        // IMMEDIATE takes the write lock up front so the collision check and
        // the insert cannot interleave with another issuer.
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let code = generate_unique_code(&tx, self.rng.as_ref(), now)?;
        let support_code = queries::insert_support_code(
            &tx,
            &code,
            metadata,
            now,
            now + SUPPORT_CODE_TTL_SECONDS,
        )?;
        tx.commit()?;

        tracing::info!(
            "Issued support code {} for {} (expires at {})",
            support_code.code,
            support_code.customer_name,
            support_code.expires_at
        );

        Ok(support_code)
    }

    /// Deactivate every active row holding `code`.
    pub fn revoke_code(&self, code: &str) -> Result<usize> {
        check_format(code)?;
        let conn = self.store.conn()?;
        let revoked = queries::revoke_support_code(&conn, code)?;
        if revoked == 0 {
            return Err(AppError::NotFound("No active support code with that value".into()));
        }
        tracing::info!("Revoked support code {} ({} row(s))", code, revoked);
        Ok(revoked)
    }
}
