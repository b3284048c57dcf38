use axum::extract::State;
use serde::Serialize;

use crate::db::AppState;
use crate::error::Result;
use crate::extractors::{Json, Path, Query};
use crate::models::{CreateSupportCode, CustomerMetadata, SupportCodeListing};
use crate::pagination::{Paginated, PaginationQuery};

#[derive(Debug, Serialize)]
pub struct CreateSupportCodeResponse {
    pub success: bool,
    pub support_code: String,
    pub expires_at: i64,
    pub customer_data: CustomerMetadata,
    /// Set when the installer was built alongside the code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
    /// Set when building the installer failed. The code stays issued and the
    /// customer portal will retry the build on redemption.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package_error: Option<String>,
}

/// POST /api/support-codes - Issue a code and build its installer eagerly
pub async fn create_support_code(
    State(state): State<AppState>,
    Json(input): Json<CreateSupportCode>,
) -> Result<Json<CreateSupportCodeResponse>> {
    let metadata = input.into_metadata()?;
    let support_code = state.engine.issue_code(&metadata)?;

    let mut response = CreateSupportCodeResponse {
        success: true,
        support_code: support_code.code.clone(),
        expires_at: support_code.expires_at,
        customer_data: metadata,
        package_name: None,
        download_url: None,
        package_error: None,
    };

    match state.engine.redeem(&support_code.code).await {
        Ok(outcome) => {
            response.download_url = Some(outcome.package.download_url());
            response.package_name = Some(outcome.package.package_name);
        }
        Err(e) => {
            tracing::warn!(
                "Support code {} issued but installer build failed: {}",
                support_code.code,
                e
            );
            response.package_error = Some(e.to_string());
        }
    }

    Ok(Json(response))
}

/// GET /api/support-codes - Newest first, with validity evaluated now
pub async fn list_support_codes(
    State(state): State<AppState>,
    Query(page): Query<PaginationQuery>,
) -> Result<Json<Paginated<SupportCodeListing>>> {
    let (limit, offset) = (page.limit(), page.offset());
    let (items, total) = state.engine.list_support_codes(limit, offset)?;
    Ok(Json(Paginated::new(items, total, limit, offset)))
}

#[derive(Debug, Serialize)]
pub struct RevokeResponse {
    pub success: bool,
    pub support_code: String,
    pub revoked: usize,
}

/// POST /api/support-codes/{code}/revoke
pub async fn revoke_support_code(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<RevokeResponse>> {
    let revoked = state.engine.revoke_code(&code)?;
    Ok(Json(RevokeResponse {
        success: true,
        support_code: code,
        revoked,
    }))
}
