//! Public routes — the unauthenticated read surface behind the marketing
//! pages, plus subscribe/unsubscribe and analytics event ingestion.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::Deserialize;

use crate::routes::banners::banner_error_to_status;
use crate::routes::content::content_error_to_status;
use crate::routes::newsletters::newsletter_error_to_status;
use crate::services::{analytics, banners, content, newsletter, pages};
use crate::state::AppState;

// =============================================================================
// CONTENT
// =============================================================================

/// `GET /api/public/blog` — published posts, newest first.
pub async fn list_blog(State(state): State<AppState>) -> Result<Json<Vec<content::BlogPostRow>>, StatusCode> {
    let rows = content::list_published_posts(&state.pool)
        .await
        .map_err(content_error_to_status)?;
    Ok(Json(rows))
}

/// `GET /api/public/blog/:slug` — one published post.
pub async fn get_blog_post(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<content::BlogPostRow>, StatusCode> {
    let row = content::get_published_post_by_slug(&state.pool, &slug)
        .await
        .map_err(content_error_to_status)?
        .ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(row))
}

/// `GET /api/public/stories` — published stories in display order.
pub async fn list_stories(State(state): State<AppState>) -> Result<Json<Vec<content::StoryRow>>, StatusCode> {
    let rows = content::list_published_stories(&state.pool)
        .await
        .map_err(content_error_to_status)?;
    Ok(Json(rows))
}

// =============================================================================
// BANNERS
// =============================================================================

/// `GET /api/public/spotlights` — active spotlights inside their window.
pub async fn list_spotlights(State(state): State<AppState>) -> Result<Json<Vec<banners::SpotlightRow>>, StatusCode> {
    let rows = banners::list_live_spotlights(&state.pool)
        .await
        .map_err(banner_error_to_status)?;
    Ok(Json(rows))
}

#[derive(Deserialize)]
pub struct CtaQuery {
    pub placement: Option<String>,
}

/// `GET /api/public/ctas` — active CTAs, optionally by placement.
pub async fn list_ctas(
    State(state): State<AppState>,
    Query(query): Query<CtaQuery>,
) -> Result<Json<Vec<banners::CtaRow>>, StatusCode> {
    let rows = banners::list_active_ctas(&state.pool, query.placement.as_deref())
        .await
        .map_err(banner_error_to_status)?;
    Ok(Json(rows))
}

#[derive(Deserialize)]
pub struct InstallBannerQuery {
    pub platform: Option<String>,
}

/// `GET /api/public/install-banners` — active install banners, optionally by
/// platform.
pub async fn list_install_banners(
    State(state): State<AppState>,
    Query(query): Query<InstallBannerQuery>,
) -> Result<Json<Vec<banners::InstallBannerRow>>, StatusCode> {
    let rows = banners::list_active_install_banners(&state.pool, query.platform.as_deref())
        .await
        .map_err(banner_error_to_status)?;
    Ok(Json(rows))
}

// =============================================================================
// DISCOVERY PAGES
// =============================================================================

/// `GET /api/public/crypto` — published crypto pages.
pub async fn list_crypto(State(state): State<AppState>) -> Result<Json<Vec<pages::CryptoPageRow>>, StatusCode> {
    let rows = pages::list_published_crypto_pages(&state.pool)
        .await
        .map_err(content_error_to_status)?;
    Ok(Json(rows))
}

/// `GET /api/public/crypto/:slug` — one published crypto page.
pub async fn get_crypto(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<pages::CryptoPageRow>, StatusCode> {
    let row = pages::get_published_crypto_page(&state.pool, &slug)
        .await
        .map_err(content_error_to_status)?
        .ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(row))
}

/// `GET /api/public/bonds` — published bond pages.
pub async fn list_bonds(State(state): State<AppState>) -> Result<Json<Vec<pages::BondPageRow>>, StatusCode> {
    let rows = pages::list_published_bond_pages(&state.pool)
        .await
        .map_err(content_error_to_status)?;
    Ok(Json(rows))
}

/// `GET /api/public/bonds/:slug` — one published bond page.
pub async fn get_bond(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<pages::BondPageRow>, StatusCode> {
    let row = pages::get_published_bond_page(&state.pool, &slug)
        .await
        .map_err(content_error_to_status)?
        .ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(row))
}

// =============================================================================
// SUBSCRIPTIONS
// =============================================================================

#[derive(Deserialize)]
pub struct SubscribeBody {
    pub email: String,
    #[serde(default)]
    pub locale: String,
}

/// `POST /api/public/subscribe` — subscribe an email to the newsletter.
pub async fn subscribe(
    State(state): State<AppState>,
    Json(body): Json<SubscribeBody>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    newsletter::subscribe(&state.pool, &body.email, &body.locale)
        .await
        .map_err(newsletter_error_to_status)?;
    Ok(Json(serde_json::json!({ "ok": true })))
}

#[derive(Deserialize)]
pub struct UnsubscribeBody {
    pub email: String,
}

/// `POST /api/public/unsubscribe` — unsubscribe an email. Unknown addresses
/// answer `{ok: true}` as well.
pub async fn unsubscribe(
    State(state): State<AppState>,
    Json(body): Json<UnsubscribeBody>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    newsletter::unsubscribe(&state.pool, &body.email)
        .await
        .map_err(newsletter_error_to_status)?;
    Ok(Json(serde_json::json!({ "ok": true })))
}

// =============================================================================
// ANALYTICS INGESTION
// =============================================================================

/// `POST /api/public/events` — record a marketing event, fire-and-forget.
pub async fn record_event(
    State(state): State<AppState>,
    Json(body): Json<analytics::EventInput>,
) -> Result<StatusCode, StatusCode> {
    if body.event_type.trim().is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }

    analytics::record_event(&state.pool, &body)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    Ok(StatusCode::ACCEPTED)
}
