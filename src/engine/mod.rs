//! Support-code lifecycle: issue, validate, redeem for an installer package,
//! track downloads, plus the device and reporting operations built on the
//! same store.

mod cache;
mod devices;
mod downloads;
mod gate;
mod generator;
mod issuer;
mod locks;
mod reporting;
mod sweep;

pub use cache::RedeemOutcome;
pub use devices::ConnectionInfo;
pub use gate::{ValidatedCode, check_at, check_format, is_well_formed};
pub use generator::{OsRandom, RandomSource, draw_code, generate_unique_code};
pub use locks::CodeLocks;
pub use sweep::{SweepReport, spawn_artifact_sweeper};

use std::sync::Arc;
use std::time::Duration;

use crate::db::Store;
use crate::error::Result;
use crate::packager::ArtifactPackager;
use crate::util::unix_now;

pub struct Engine {
    store: Store,
    rng: Arc<dyn RandomSource>,
    packager: Arc<dyn ArtifactPackager>,
    packager_timeout: Duration,
    locks: CodeLocks,
}

impl Engine {
    pub fn new(
        store: Store,
        packager: Arc<dyn ArtifactPackager>,
        packager_timeout: Duration,
    ) -> Self {
        Self {
            store,
            rng: Arc::new(OsRandom),
            packager,
            packager_timeout,
            locks: CodeLocks::new(),
        }
    }

    pub fn with_random_source(mut self, rng: Arc<dyn RandomSource>) -> Self {
        self.rng = rng;
        self
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Run a raw code through the gate at the current time.
    ///
    /// Malformed input is rejected before a connection is checked out.
    pub fn validate(&self, raw: &str) -> Result<ValidatedCode> {
        self.validate_at(raw, unix_now())
    }

    pub fn validate_at(&self, raw: &str, now: i64) -> Result<ValidatedCode> {
        check_format(raw)?;
        let conn = self.store.conn()?;
        check_at(&conn, raw, now)
    }

    /// Gate then redeem in one call.
    pub async fn redeem(&self, raw: &str) -> Result<RedeemOutcome> {
        let validated = self.validate(raw)?;
        self.redeem_code(validated).await
    }
}
