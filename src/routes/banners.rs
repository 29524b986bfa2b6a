//! Admin routes for spotlight banners, CTAs, and install banners.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::routes::auth::AuthUser;
use crate::routes::content::team_error_to_status;
use crate::services::banners::{
    self, CtaPatch, InstallBannerPatch, NewCta, NewInstallBanner, NewSpotlight, SpotlightPatch,
};
use crate::services::team::{self, Role};
use crate::state::AppState;

pub(crate) fn banner_error_to_status(err: banners::BannerError) -> StatusCode {
    match err {
        banners::BannerError::NotFound(_) => StatusCode::NOT_FOUND,
        banners::BannerError::InvalidPlatform(_) | banners::BannerError::InvalidTimestamp(_) => {
            StatusCode::BAD_REQUEST
        }
        banners::BannerError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

// =============================================================================
// SPOTLIGHTS
// =============================================================================

/// `GET /api/admin/spotlights` — list all spotlights.
pub async fn list_spotlights(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Result<Json<Vec<banners::SpotlightRow>>, StatusCode> {
    let rows = banners::list_spotlights(&state.pool)
        .await
        .map_err(banner_error_to_status)?;
    Ok(Json(rows))
}

/// `POST /api/admin/spotlights` — create a spotlight.
pub async fn create_spotlight(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<NewSpotlight>,
) -> Result<(StatusCode, Json<banners::SpotlightRow>), StatusCode> {
    team::ensure_role(&auth.user, Role::Editor).map_err(team_error_to_status)?;

    if body.title_en.trim().is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }

    let row = banners::create_spotlight(&state.pool, body)
        .await
        .map_err(banner_error_to_status)?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// `GET /api/admin/spotlights/:id` — fetch one spotlight.
pub async fn get_spotlight(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<banners::SpotlightRow>, StatusCode> {
    let row = banners::get_spotlight(&state.pool, id)
        .await
        .map_err(banner_error_to_status)?;
    Ok(Json(row))
}

/// `PATCH /api/admin/spotlights/:id` — update a spotlight.
pub async fn update_spotlight(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<SpotlightPatch>,
) -> Result<Json<banners::SpotlightRow>, StatusCode> {
    team::ensure_role(&auth.user, Role::Editor).map_err(team_error_to_status)?;

    let row = banners::update_spotlight(&state.pool, id, body)
        .await
        .map_err(banner_error_to_status)?;
    Ok(Json(row))
}

/// `DELETE /api/admin/spotlights/:id` — delete a spotlight.
pub async fn delete_spotlight(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    team::ensure_role(&auth.user, Role::Editor).map_err(team_error_to_status)?;

    banners::delete_spotlight(&state.pool, id)
        .await
        .map_err(banner_error_to_status)?;
    Ok(Json(serde_json::json!({ "ok": true })))
}

// =============================================================================
// CALLS TO ACTION
// =============================================================================

#[derive(Deserialize)]
pub struct CtaListQuery {
    pub placement: Option<String>,
}

/// `GET /api/admin/ctas` — list all CTAs, optionally by placement.
pub async fn list_ctas(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<CtaListQuery>,
) -> Result<Json<Vec<banners::CtaRow>>, StatusCode> {
    let rows = banners::list_ctas(&state.pool)
        .await
        .map_err(banner_error_to_status)?;
    Ok(Json(banners::apply_cta_filter(rows, query.placement.as_deref())))
}

/// `POST /api/admin/ctas` — create a CTA.
pub async fn create_cta(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<NewCta>,
) -> Result<(StatusCode, Json<banners::CtaRow>), StatusCode> {
    team::ensure_role(&auth.user, Role::Editor).map_err(team_error_to_status)?;

    if body.placement.trim().is_empty() || body.label_en.trim().is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }

    let row = banners::create_cta(&state.pool, body)
        .await
        .map_err(banner_error_to_status)?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// `GET /api/admin/ctas/:id` — fetch one CTA.
pub async fn get_cta(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<banners::CtaRow>, StatusCode> {
    let row = banners::get_cta(&state.pool, id)
        .await
        .map_err(banner_error_to_status)?;
    Ok(Json(row))
}

/// `PATCH /api/admin/ctas/:id` — update a CTA.
pub async fn update_cta(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<CtaPatch>,
) -> Result<Json<banners::CtaRow>, StatusCode> {
    team::ensure_role(&auth.user, Role::Editor).map_err(team_error_to_status)?;

    let row = banners::update_cta(&state.pool, id, body)
        .await
        .map_err(banner_error_to_status)?;
    Ok(Json(row))
}

/// `DELETE /api/admin/ctas/:id` — delete a CTA.
pub async fn delete_cta(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    team::ensure_role(&auth.user, Role::Editor).map_err(team_error_to_status)?;

    banners::delete_cta(&state.pool, id)
        .await
        .map_err(banner_error_to_status)?;
    Ok(Json(serde_json::json!({ "ok": true })))
}

// =============================================================================
// INSTALL BANNERS
// =============================================================================

#[derive(Deserialize)]
pub struct InstallBannerListQuery {
    pub platform: Option<String>,
}

/// `GET /api/admin/install-banners` — list all install banners, optionally by
/// platform.
pub async fn list_install_banners(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<InstallBannerListQuery>,
) -> Result<Json<Vec<banners::InstallBannerRow>>, StatusCode> {
    let rows = banners::list_install_banners(&state.pool)
        .await
        .map_err(banner_error_to_status)?;
    Ok(Json(banners::apply_install_banner_filter(rows, query.platform.as_deref())))
}

/// `POST /api/admin/install-banners` — create an install banner.
pub async fn create_install_banner(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<NewInstallBanner>,
) -> Result<(StatusCode, Json<banners::InstallBannerRow>), StatusCode> {
    team::ensure_role(&auth.user, Role::Editor).map_err(team_error_to_status)?;

    let row = banners::create_install_banner(&state.pool, body)
        .await
        .map_err(banner_error_to_status)?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// `GET /api/admin/install-banners/:id` — fetch one install banner.
pub async fn get_install_banner(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<banners::InstallBannerRow>, StatusCode> {
    let row = banners::get_install_banner(&state.pool, id)
        .await
        .map_err(banner_error_to_status)?;
    Ok(Json(row))
}

/// `PATCH /api/admin/install-banners/:id` — update an install banner.
pub async fn update_install_banner(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<InstallBannerPatch>,
) -> Result<Json<banners::InstallBannerRow>, StatusCode> {
    team::ensure_role(&auth.user, Role::Editor).map_err(team_error_to_status)?;

    let row = banners::update_install_banner(&state.pool, id, body)
        .await
        .map_err(banner_error_to_status)?;
    Ok(Json(row))
}

/// `DELETE /api/admin/install-banners/:id` — delete an install banner.
pub async fn delete_install_banner(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    team::ensure_role(&auth.user, Role::Editor).map_err(team_error_to_status)?;

    banners::delete_install_banner(&state.pool, id)
        .await
        .map_err(banner_error_to_status)?;
    Ok(Json(serde_json::json!({ "ok": true })))
}
