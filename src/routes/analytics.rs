//! Admin routes for analytics summaries.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::Deserialize;

use crate::routes::auth::AuthUser;
use crate::services::analytics;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct SummaryQuery {
    /// Window start, epoch milliseconds (inclusive).
    pub since_ms: Option<i64>,
    /// Window end, epoch milliseconds (exclusive).
    pub until_ms: Option<i64>,
}

/// `GET /api/admin/analytics/summary` — event counts grouped by type,
/// device, and locale over an optional window.
pub async fn summary(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<SummaryQuery>,
) -> Result<Json<analytics::Summary>, StatusCode> {
    let events = analytics::fetch_events(&state.pool, query.since_ms, query.until_ms)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    Ok(Json(analytics::summarize(&events)))
}
