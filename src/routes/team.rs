//! Admin routes for team management (admin role only).

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::routes::auth::AuthUser;
use crate::routes::content::team_error_to_status;
use crate::services::team::{self, MemberPatch, Role};
use crate::state::AppState;

/// `GET /api/admin/team` — list members.
pub async fn list_members(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<team::MemberRow>>, StatusCode> {
    team::ensure_role(&auth.user, Role::Admin).map_err(team_error_to_status)?;

    let rows = team::list_members(&state.pool)
        .await
        .map_err(team_error_to_status)?;
    Ok(Json(rows))
}

#[derive(Deserialize)]
pub struct CreateMemberBody {
    pub email: String,
    pub name: String,
    pub role: Option<Role>,
}

/// `POST /api/admin/team` — invite a member.
pub async fn create_member(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<CreateMemberBody>,
) -> Result<(StatusCode, Json<team::MemberRow>), StatusCode> {
    team::ensure_role(&auth.user, Role::Admin).map_err(team_error_to_status)?;

    if body.name.trim().is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }

    let row = team::create_member(&state.pool, &body.email, &body.name, body.role.unwrap_or(Role::Viewer))
        .await
        .map_err(team_error_to_status)?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// `GET /api/admin/team/:id` — fetch one member.
pub async fn get_member(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<team::MemberRow>, StatusCode> {
    team::ensure_role(&auth.user, Role::Admin).map_err(team_error_to_status)?;

    let row = team::get_member(&state.pool, id)
        .await
        .map_err(team_error_to_status)?;
    Ok(Json(row))
}

/// `PATCH /api/admin/team/:id` — update role, name, or active flag.
/// Deactivation stands in for deletion: content rows keep their author refs.
pub async fn update_member(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<MemberPatch>,
) -> Result<Json<team::MemberRow>, StatusCode> {
    team::ensure_role(&auth.user, Role::Admin).map_err(team_error_to_status)?;

    let row = team::update_member(&state.pool, auth.user.id, id, body)
        .await
        .map_err(team_error_to_status)?;
    Ok(Json(row))
}
