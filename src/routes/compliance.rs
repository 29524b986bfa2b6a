//! Admin routes for compliance scans.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::routes::auth::AuthUser;
use crate::routes::content::team_error_to_status;
use crate::services::compliance::{self, ComplianceError, ScanRequest};
use crate::services::team::{self, Role};
use crate::state::AppState;

fn compliance_error_to_status(err: ComplianceError) -> StatusCode {
    match err {
        ComplianceError::ScannerNotConfigured => StatusCode::SERVICE_UNAVAILABLE,
        ComplianceError::EmptyText | ComplianceError::InvalidSource(_) => StatusCode::BAD_REQUEST,
        ComplianceError::NotFound(_) => StatusCode::NOT_FOUND,
        ComplianceError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
        ComplianceError::Provider(_) => StatusCode::BAD_GATEWAY,
        ComplianceError::Content(inner) => super::content::content_error_to_status(inner),
        ComplianceError::Newsletter(inner) => super::newsletters::newsletter_error_to_status(inner),
        ComplianceError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// `POST /api/admin/compliance/scans` — run a scan on pasted text or a
/// referenced entity, persist and return the run.
pub async fn create_scan(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<ScanRequest>,
) -> Result<(StatusCode, Json<compliance::ScanRow>), StatusCode> {
    team::ensure_role(&auth.user, Role::Editor).map_err(team_error_to_status)?;

    let row = compliance::run_scan(&state, auth.user.id, body)
        .await
        .map_err(|e| {
            if !matches!(e, ComplianceError::EmptyText | ComplianceError::InvalidSource(_)) {
                tracing::warn!(error = %e, "compliance scan failed");
            }
            compliance_error_to_status(e)
        })?;
    Ok((StatusCode::CREATED, Json(row)))
}

#[derive(Deserialize)]
pub struct ListScansQuery {
    pub limit: Option<i64>,
}

/// `GET /api/admin/compliance/scans` — list recent runs.
pub async fn list_scans(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<ListScansQuery>,
) -> Result<Json<Vec<compliance::ScanRow>>, StatusCode> {
    let rows = compliance::list_scans(&state.pool, query.limit.unwrap_or(50))
        .await
        .map_err(compliance_error_to_status)?;
    Ok(Json(rows))
}

/// `GET /api/admin/compliance/scans/:id` — fetch one run.
pub async fn get_scan(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<compliance::ScanRow>, StatusCode> {
    let row = compliance::get_scan(&state.pool, id)
        .await
        .map_err(compliance_error_to_status)?;
    Ok(Json(row))
}
