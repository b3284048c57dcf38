use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use super::Engine;
use crate::db::queries;
use crate::error::Result;
use crate::util::unix_now;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    /// Distinct artifact files belonging only to dead codes
    pub stale: usize,
    pub removed: usize,
    pub failed: usize,
}

impl Engine {
    /// Delete artifact files whose support code can no longer be redeemed.
    /// Package rows are kept for reporting.
    pub fn sweep_stale_artifacts(&self) -> Result<SweepReport> {
        self.sweep_stale_artifacts_at(unix_now())
    }

    pub fn sweep_stale_artifacts_at(&self, now: i64) -> Result<SweepReport> {
        let stale = {
            let conn = self.store.conn()?;
            queries::list_stale_packages(&conn, now)?
        };

        let paths: HashSet<String> = stale.into_iter().map(|p| p.package_path).collect();
        let mut report = SweepReport {
            stale: paths.len(),
            ..Default::default()
        };

        for path in paths {
            match fs::remove_file(&path) {
                Ok(()) => {
                    tracing::debug!("Removed stale artifact {}", path);
                    report.removed += 1;
                }
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => {
                    tracing::warn!("Failed to remove stale artifact {}: {}", path, e);
                    report.failed += 1;
                }
            }
        }

        Ok(report)
    }
}

/// Background task that periodically removes stale artifacts.
pub fn spawn_artifact_sweeper(engine: Arc<Engine>, interval: Duration) {
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(interval).await;

            match engine.sweep_stale_artifacts() {
                Ok(report) if report.removed > 0 || report.failed > 0 => {
                    tracing::info!(
                        "Artifact sweep removed {} file(s), {} failure(s)",
                        report.removed,
                        report.failed
                    );
                }
                Ok(_) => {}
                Err(e) => tracing::warn!("Artifact sweep failed: {}", e),
            }
        }
    });

    tracing::info!("Background artifact sweep started (every {:?})", interval);
}
