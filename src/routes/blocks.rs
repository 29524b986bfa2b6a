//! Admin routes for the block library: definitions and templates.
//!
//! Definitions are admin-only (they change the shape available to every
//! template); templates are editor-level content.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::routes::auth::AuthUser;
use crate::routes::content::team_error_to_status;
use crate::services::blocks::{self, BlocksError, TemplateBlock};
use crate::services::team::{self, Role};
use crate::state::AppState;

pub(crate) fn blocks_error_to_status(err: BlocksError) -> StatusCode {
    match err {
        BlocksError::DefinitionNotFound(_) | BlocksError::TemplateNotFound(_) => StatusCode::NOT_FOUND,
        BlocksError::BlockTypeTaken(_) | BlocksError::DefinitionInUse(_) | BlocksError::TemplateInUse(_) => {
            StatusCode::CONFLICT
        }
        BlocksError::UnknownBlockType(_) | BlocksError::InvalidZone(_) => StatusCode::BAD_REQUEST,
        BlocksError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

// =============================================================================
// DEFINITIONS
// =============================================================================

/// `GET /api/admin/block-definitions` — list definitions.
pub async fn list_definitions(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Result<Json<Vec<blocks::DefinitionRow>>, StatusCode> {
    let rows = blocks::list_definitions(&state.pool)
        .await
        .map_err(blocks_error_to_status)?;
    Ok(Json(rows))
}

#[derive(Deserialize)]
pub struct CreateDefinitionBody {
    pub block_type: String,
    pub name: String,
    #[serde(default)]
    pub default_schema: serde_json::Value,
    #[serde(default)]
    pub default_settings: serde_json::Value,
}

/// `POST /api/admin/block-definitions` — create a definition (admin only).
pub async fn create_definition(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<CreateDefinitionBody>,
) -> Result<(StatusCode, Json<blocks::DefinitionRow>), StatusCode> {
    team::ensure_role(&auth.user, Role::Admin).map_err(team_error_to_status)?;

    let block_type = body.block_type.trim();
    if block_type.is_empty() || body.name.trim().is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }
    if !body.default_settings.is_object() && !body.default_settings.is_null() {
        return Err(StatusCode::BAD_REQUEST);
    }

    let default_schema = if body.default_schema.is_null() { serde_json::json!({}) } else { body.default_schema };
    let default_settings = if body.default_settings.is_null() {
        serde_json::json!({})
    } else {
        body.default_settings
    };

    let row = blocks::create_definition(&state.pool, block_type, body.name.trim(), default_schema, default_settings)
        .await
        .map_err(blocks_error_to_status)?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// `GET /api/admin/block-definitions/:id` — fetch one definition.
pub async fn get_definition(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<blocks::DefinitionRow>, StatusCode> {
    let row = blocks::get_definition(&state.pool, id)
        .await
        .map_err(blocks_error_to_status)?;
    Ok(Json(row))
}

#[derive(Deserialize)]
pub struct UpdateDefinitionBody {
    pub name: Option<String>,
    pub default_schema: Option<serde_json::Value>,
    pub default_settings: Option<serde_json::Value>,
}

/// `PATCH /api/admin/block-definitions/:id` — update a definition (admin only).
/// The `block_type` key is immutable; requests attempting to change it are
/// rejected by the absence of the field here.
pub async fn update_definition(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateDefinitionBody>,
) -> Result<Json<blocks::DefinitionRow>, StatusCode> {
    team::ensure_role(&auth.user, Role::Admin).map_err(team_error_to_status)?;

    if let Some(settings) = &body.default_settings {
        if !settings.is_object() {
            return Err(StatusCode::BAD_REQUEST);
        }
    }

    let row = blocks::update_definition(&state.pool, id, body.name, body.default_schema, body.default_settings)
        .await
        .map_err(blocks_error_to_status)?;
    Ok(Json(row))
}

/// `DELETE /api/admin/block-definitions/:id` — delete an unused definition.
pub async fn delete_definition(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    team::ensure_role(&auth.user, Role::Admin).map_err(team_error_to_status)?;

    blocks::delete_definition(&state.pool, id)
        .await
        .map_err(blocks_error_to_status)?;
    Ok(Json(serde_json::json!({ "ok": true })))
}

// =============================================================================
// TEMPLATES
// =============================================================================

/// `GET /api/admin/newsletter-templates` — list templates.
pub async fn list_templates(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Result<Json<Vec<blocks::TemplateRow>>, StatusCode> {
    let rows = blocks::list_templates(&state.pool)
        .await
        .map_err(blocks_error_to_status)?;
    Ok(Json(rows))
}

#[derive(Deserialize)]
pub struct CreateTemplateBody {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub blocks: Vec<TemplateBlock>,
}

/// `POST /api/admin/newsletter-templates` — create a template.
pub async fn create_template(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<CreateTemplateBody>,
) -> Result<(StatusCode, Json<blocks::TemplateDetail>), StatusCode> {
    team::ensure_role(&auth.user, Role::Editor).map_err(team_error_to_status)?;

    if body.name.trim().is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }

    let detail = blocks::create_template(&state.pool, body.name.trim(), &body.description, body.blocks)
        .await
        .map_err(blocks_error_to_status)?;
    Ok((StatusCode::CREATED, Json(detail)))
}

/// `GET /api/admin/newsletter-templates/:id` — fetch one template with blocks.
pub async fn get_template(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<blocks::TemplateDetail>, StatusCode> {
    let detail = blocks::get_template(&state.pool, id)
        .await
        .map_err(blocks_error_to_status)?;
    Ok(Json(detail))
}

#[derive(Deserialize)]
pub struct UpdateTemplateBody {
    pub name: Option<String>,
    pub description: Option<String>,
    /// Replaces all placements when present.
    pub blocks: Option<Vec<TemplateBlock>>,
}

/// `PATCH /api/admin/newsletter-templates/:id` — update a template.
pub async fn update_template(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateTemplateBody>,
) -> Result<Json<blocks::TemplateDetail>, StatusCode> {
    team::ensure_role(&auth.user, Role::Editor).map_err(team_error_to_status)?;

    let detail = blocks::update_template(&state.pool, id, body.name, body.description, body.blocks)
        .await
        .map_err(blocks_error_to_status)?;
    Ok(Json(detail))
}

/// `DELETE /api/admin/newsletter-templates/:id` — delete an unused template.
pub async fn delete_template(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    team::ensure_role(&auth.user, Role::Editor).map_err(team_error_to_status)?;

    blocks::delete_template(&state.pool, id)
        .await
        .map_err(blocks_error_to_status)?;
    Ok(Json(serde_json::json!({ "ok": true })))
}
