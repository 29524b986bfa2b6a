//! Admin routes for crypto and bond discovery pages.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use uuid::Uuid;

use crate::routes::auth::AuthUser;
use crate::routes::content::{content_error_to_status, team_error_to_status};
use crate::services::pages::{self, BondPagePatch, CryptoPagePatch, NewBondPage, NewCryptoPage, PageFilter};
use crate::services::team::{self, Role};
use crate::state::AppState;

// =============================================================================
// CRYPTO PAGES
// =============================================================================

/// `GET /api/admin/crypto-pages` — list crypto pages, filtered by `q` / `status`.
pub async fn list_crypto_pages(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(filter): Query<PageFilter>,
) -> Result<Json<Vec<pages::CryptoPageRow>>, StatusCode> {
    let rows = pages::list_crypto_pages(&state.pool)
        .await
        .map_err(content_error_to_status)?;
    Ok(Json(pages::apply_crypto_filter(rows, &filter)))
}

/// `POST /api/admin/crypto-pages` — create a crypto page.
pub async fn create_crypto_page(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<NewCryptoPage>,
) -> Result<(StatusCode, Json<pages::CryptoPageRow>), StatusCode> {
    team::ensure_role(&auth.user, Role::Editor).map_err(team_error_to_status)?;

    if body.symbol.trim().is_empty() || body.name_en.trim().is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }

    let row = pages::create_crypto_page(&state.pool, body)
        .await
        .map_err(content_error_to_status)?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// `GET /api/admin/crypto-pages/:id` — fetch one crypto page.
pub async fn get_crypto_page(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<pages::CryptoPageRow>, StatusCode> {
    let row = pages::get_crypto_page(&state.pool, id)
        .await
        .map_err(content_error_to_status)?;
    Ok(Json(row))
}

/// `PATCH /api/admin/crypto-pages/:id` — update a crypto page.
pub async fn update_crypto_page(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<CryptoPagePatch>,
) -> Result<Json<pages::CryptoPageRow>, StatusCode> {
    team::ensure_role(&auth.user, Role::Editor).map_err(team_error_to_status)?;

    let row = pages::update_crypto_page(&state.pool, id, body)
        .await
        .map_err(content_error_to_status)?;
    Ok(Json(row))
}

/// `DELETE /api/admin/crypto-pages/:id` — delete a crypto page.
pub async fn delete_crypto_page(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    team::ensure_role(&auth.user, Role::Editor).map_err(team_error_to_status)?;

    pages::delete_crypto_page(&state.pool, id)
        .await
        .map_err(content_error_to_status)?;
    Ok(Json(serde_json::json!({ "ok": true })))
}

// =============================================================================
// BOND PAGES
// =============================================================================

/// `GET /api/admin/bond-pages` — list bond pages, filtered by `q` / `status`.
pub async fn list_bond_pages(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(filter): Query<PageFilter>,
) -> Result<Json<Vec<pages::BondPageRow>>, StatusCode> {
    let rows = pages::list_bond_pages(&state.pool)
        .await
        .map_err(content_error_to_status)?;
    Ok(Json(pages::apply_bond_filter(rows, &filter)))
}

/// `POST /api/admin/bond-pages` — create a bond page.
pub async fn create_bond_page(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<NewBondPage>,
) -> Result<(StatusCode, Json<pages::BondPageRow>), StatusCode> {
    team::ensure_role(&auth.user, Role::Editor).map_err(team_error_to_status)?;

    if body.issuer.trim().is_empty() || body.name_en.trim().is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }

    let row = pages::create_bond_page(&state.pool, body)
        .await
        .map_err(content_error_to_status)?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// `GET /api/admin/bond-pages/:id` — fetch one bond page.
pub async fn get_bond_page(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<pages::BondPageRow>, StatusCode> {
    let row = pages::get_bond_page(&state.pool, id)
        .await
        .map_err(content_error_to_status)?;
    Ok(Json(row))
}

/// `PATCH /api/admin/bond-pages/:id` — update a bond page.
pub async fn update_bond_page(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<BondPagePatch>,
) -> Result<Json<pages::BondPageRow>, StatusCode> {
    team::ensure_role(&auth.user, Role::Editor).map_err(team_error_to_status)?;

    let row = pages::update_bond_page(&state.pool, id, body)
        .await
        .map_err(content_error_to_status)?;
    Ok(Json(row))
}

/// `DELETE /api/admin/bond-pages/:id` — delete a bond page.
pub async fn delete_bond_page(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    team::ensure_role(&auth.user, Role::Editor).map_err(team_error_to_status)?;

    pages::delete_bond_page(&state.pool, id)
        .await
        .map_err(content_error_to_status)?;
    Ok(Json(serde_json::json!({ "ok": true })))
}
