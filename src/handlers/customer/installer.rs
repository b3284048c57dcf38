use axum::extract::State;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::db::AppState;
use crate::error::{AppError, Result};
use crate::extractors::Json;
use crate::models::CustomerMetadata;
use crate::util::parse_client_timestamp;

#[derive(Debug, Deserialize)]
pub struct InstallerRequest {
    #[serde(default)]
    pub support_code: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct InstallerResponse {
    pub success: bool,
    pub download_url: String,
    pub package_name: String,
    pub support_code: String,
    pub expires_at: i64,
    pub customer_data: CustomerMetadata,
    pub cache_hit: bool,
}

/// POST /api/customer/installer - Redeem a support code for its installer
pub async fn request_installer(
    State(state): State<AppState>,
    Json(body): Json<InstallerRequest>,
) -> Result<Json<InstallerResponse>> {
    let raw = body
        .support_code
        .as_deref()
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AppError::Validation("Support code is required".into()))?;

    let validated = state.engine.validate(raw)?;
    let outcome = state.engine.redeem_code(validated).await?;

    if outcome.cache_hit {
        state
            .engine
            .spawn_track_download(outcome.support_code.code.clone(), None);
    }

    Ok(Json(InstallerResponse {
        success: true,
        download_url: outcome.package.download_url(),
        package_name: outcome.package.package_name.clone(),
        support_code: outcome.support_code.code.clone(),
        expires_at: outcome.support_code.expires_at,
        customer_data: outcome.support_code.metadata(),
        cache_hit: outcome.cache_hit,
    }))
}

#[derive(Debug, Deserialize)]
pub struct TrackDownloadRequest {
    #[serde(default)]
    pub support_code: Option<String>,
    #[serde(default)]
    pub timestamp: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct TrackDownloadResponse {
    pub success: bool,
}

/// POST /api/track-download - Portal reports that the customer downloaded
/// the installer. Always succeeds.
pub async fn track_download(
    State(state): State<AppState>,
    Json(body): Json<TrackDownloadRequest>,
) -> Json<TrackDownloadResponse> {
    if let Some(code) = body
        .support_code
        .as_deref()
        .filter(|c| !c.is_empty())
    {
        let at = body.timestamp.as_ref().and_then(parse_client_timestamp);
        state.engine.track_download(code, at);
    }

    Json(TrackDownloadResponse { success: true })
}
