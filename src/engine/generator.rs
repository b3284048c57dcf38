use rand::{Rng, rngs::OsRng};
use rusqlite::Connection;

use crate::db::queries;
use crate::error::Result;
use crate::models::SUPPORT_CODE_LEN;

/// Source of decimal digits for new support codes.
pub trait RandomSource: Send + Sync {
    /// A digit in `0..=9`.
    fn next_digit(&self) -> u8;
}

/// OS-seeded CSPRNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsRandom;

impl RandomSource for OsRandom {
    fn next_digit(&self) -> u8 {
        let mut rng = OsRng;
        rng.gen_range(0..10)
    }
}

pub fn draw_code(rng: &dyn RandomSource) -> String {
    (0..SUPPORT_CODE_LEN)
        .map(|_| char::from(b'0' + rng.next_digit() % 10))
        .collect()
}

/// Draw codes until one is not held by any active, unexpired row.
///
/// Expired and revoked codes are free to be drawn again. Store errors end the
/// loop immediately.
pub fn generate_unique_code(conn: &Connection, rng: &dyn RandomSource, now: i64) -> Result<String> {
    loop {
        let code = draw_code(rng);
        if !queries::code_is_live(conn, &code, now)? {
            return Ok(code);
        }
        tracing::debug!("Support code collision on {}, redrawing", code);
    }
}
