use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use subtle::ConstantTimeEq;

use crate::db::AppState;
use crate::error::AppError;
use crate::util::extract_bearer_token;

/// Guard the admin API with the static `ADMIN_API_KEY` bearer token.
///
/// With no key configured every request passes; startup logs a warning.
pub async fn admin_auth(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(expected) = state.admin_api_key.as_deref() else {
        return Ok(next.run(request).await);
    };

    let provided = extract_bearer_token(request.headers()).ok_or(AppError::Unauthorized)?;

    if bool::from(provided.as_bytes().ct_eq(expected.as_bytes())) {
        Ok(next.run(request).await)
    } else {
        tracing::warn!("Rejected admin request to {} with bad API key", request.uri().path());
        Err(AppError::Unauthorized)
    }
}
