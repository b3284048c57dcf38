use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;

use super::Engine;
use crate::db::queries;
use crate::error::Result;
use crate::util::unix_now;

impl Engine {
    /// Stamp `downloaded_at` on the package redemption would serve for `code`.
    ///
    /// While the code is live only that row's packages are candidates, so a
    /// reissued value never touches an earlier customer's package. Once no
    /// live row holds the value, the newest package carrying it is used.
    ///
    /// Reporting only: failures are logged and never reach the caller.
    /// Returns whether a row was updated.
    pub fn track_download(&self, code: &str, at: Option<i64>) -> bool {
        match self.try_track_download(code, at.unwrap_or_else(unix_now)) {
            Ok(updated) => updated,
            Err(e) => {
                tracing::warn!("Failed to record download for code {}: {}", code, e);
                false
            }
        }
    }

    fn try_track_download(&self, code: &str, at: i64) -> Result<bool> {
        let conn = self.store.conn()?;
        let latest = match queries::get_valid_support_code(&conn, code, unix_now())? {
            Some(sc) => queries::get_latest_package_for_code_id(&conn, &sc.id)?,
            None => queries::get_latest_package_for_code(&conn, code)?,
        };
        let Some(package) = latest else {
            tracing::debug!("No package on record for code {}, download not tracked", code);
            return Ok(false);
        };

        let updated = queries::set_package_downloaded_at(&conn, &package.id, at)?;
        if updated {
            tracing::info!("Recorded download of {} for code {}", package.package_name, code);
        }
        Ok(updated)
    }

    /// Fire-and-forget variant for request handlers.
    /// Panics in the spawned task are logged rather than lost.
    pub fn spawn_track_download(self: &Arc<Self>, code: String, at: Option<i64>) {
        let engine = Arc::clone(self);
        tokio::spawn(
            AssertUnwindSafe(async move {
                engine.track_download(&code, at);
            })
            .catch_unwind()
            .map(|result| {
                if result.is_err() {
                    tracing::error!("Download tracking task panicked");
                }
            }),
        );
    }
}
