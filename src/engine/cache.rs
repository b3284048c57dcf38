use std::fs;
use std::sync::Arc;

use serde::Serialize;

use super::Engine;
use super::gate::ValidatedCode;
use crate::db::queries;
use crate::error::Result;
use crate::models::{ClientPackage, SupportCode};
use crate::packager::{BuiltArtifact, PackagerError};
use crate::util::unix_now;

#[derive(Debug, Clone, Serialize)]
pub struct RedeemOutcome {
    pub package: ClientPackage,
    pub support_code: SupportCode,
    pub cache_hit: bool,
}

/// A recorded artifact is usable only if it still exists as a non-empty file.
fn artifact_is_ready(path: &str) -> bool {
    fs::metadata(path)
        .map(|m| m.is_file() && m.len() > 0)
        .unwrap_or(false)
}

impl Engine {
    /// Exchange a validated code for its installer package, building one only
    /// when no usable artifact is on record.
    ///
    /// A failed or timed-out build writes nothing, so the next redemption
    /// simply tries again.
    pub async fn redeem_code(&self, validated: ValidatedCode) -> Result<RedeemOutcome> {
        let support_code = validated.into_support_code();

        if let Some(package) = self.cached_package(&support_code)? {
            return Ok(self.hit(package, support_code));
        }

        let _guard = self.locks.lock(&support_code.code).await;

        // Someone else may have built it while we waited.
        if let Some(package) = self.cached_package(&support_code)? {
            return Ok(self.hit(package, support_code));
        }

        tracing::info!("Package cache miss for code {}, building", support_code.code);
        let artifact = self.build_artifact(&support_code).await?;

        let conn = self.store.conn()?;
        let package = queries::insert_client_package(
            &conn,
            &support_code,
            &artifact,
            &support_code.metadata(),
            unix_now(),
        )?;

        Ok(RedeemOutcome {
            package,
            support_code,
            cache_hit: false,
        })
    }

    fn cached_package(&self, support_code: &SupportCode) -> Result<Option<ClientPackage>> {
        let conn = self.store.conn()?;
        let latest = queries::get_latest_package_for_code_id(&conn, &support_code.id)?;

        Ok(latest.filter(|p| {
            let ready = artifact_is_ready(&p.package_path);
            if !ready {
                tracing::warn!(
                    "Artifact {} for code {} is missing or empty, rebuilding",
                    p.package_path,
                    support_code.code
                );
            }
            ready
        }))
    }

    fn hit(&self, package: ClientPackage, support_code: SupportCode) -> RedeemOutcome {
        tracing::debug!("Package cache hit for code {}", support_code.code);
        RedeemOutcome {
            package,
            support_code,
            cache_hit: true,
        }
    }

    async fn build_artifact(
        &self,
        support_code: &SupportCode,
    ) -> std::result::Result<BuiltArtifact, PackagerError> {
        let packager = Arc::clone(&self.packager);
        let code = support_code.code.clone();
        let metadata = support_code.metadata();

        let task = tokio::task::spawn_blocking(move || packager.build_package(&code, &metadata));

        let artifact = match tokio::time::timeout(self.packager_timeout, task).await {
            Err(_) => return Err(PackagerError::Timeout(self.packager_timeout)),
            Ok(Err(join_err)) => return Err(PackagerError::Task(join_err.to_string())),
            Ok(Ok(result)) => result?,
        };

        if !artifact_is_ready(&artifact.artifact_path.to_string_lossy()) {
            return Err(PackagerError::EmptyArtifact(artifact.artifact_path));
        }

        Ok(artifact)
    }
}
