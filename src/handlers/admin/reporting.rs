use axum::extract::State;

use crate::db::AppState;
use crate::error::Result;
use crate::extractors::Json;
use crate::models::{Activity, DashboardStats};

/// GET /api/stats
pub async fn get_stats(State(state): State<AppState>) -> Result<Json<DashboardStats>> {
    Ok(Json(state.engine.stats()?))
}

/// GET /api/activity - At most 10 entries from the last 24 hours
pub async fn get_activity(State(state): State<AppState>) -> Result<Json<Vec<Activity>>> {
    Ok(Json(state.engine.recent_activity()?))
}
