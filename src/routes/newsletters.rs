//! Admin routes for newsletter issues and subscribers.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::{Html, IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::routes::auth::AuthUser;
use crate::routes::blocks::blocks_error_to_status;
use crate::routes::content::team_error_to_status;
use crate::services::blocks::ResolvedBlock;
use crate::services::newsletter::{
    self, IssueBlock, NewNewsletter, NewsletterError, NewsletterPatch, SubscriberFilter,
};
use crate::services::team::{self, Role};
use crate::state::AppState;

pub(crate) fn newsletter_error_to_status(err: NewsletterError) -> StatusCode {
    match err {
        NewsletterError::NotFound(_) | NewsletterError::TemplateNotFound(_) => StatusCode::NOT_FOUND,
        NewsletterError::AlreadySent(_) => StatusCode::CONFLICT,
        NewsletterError::EmailDisabled => StatusCode::SERVICE_UNAVAILABLE,
        NewsletterError::InvalidEmail | NewsletterError::InvalidZone(_) => StatusCode::BAD_REQUEST,
        NewsletterError::Blocks(inner) => blocks_error_to_status(inner),
        NewsletterError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

// =============================================================================
// ISSUES
// =============================================================================

/// `GET /api/admin/newsletters` — list issues.
pub async fn list_newsletters(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Result<Json<Vec<newsletter::NewsletterRow>>, StatusCode> {
    let rows = newsletter::list_newsletters(&state.pool)
        .await
        .map_err(newsletter_error_to_status)?;
    Ok(Json(rows))
}

/// `POST /api/admin/newsletters` — create a draft issue from a template.
pub async fn create_newsletter(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<NewNewsletter>,
) -> Result<(StatusCode, Json<newsletter::NewsletterRow>), StatusCode> {
    team::ensure_role(&auth.user, Role::Editor).map_err(team_error_to_status)?;

    if body.title.trim().is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }

    let row = newsletter::create_newsletter(&state.pool, body)
        .await
        .map_err(newsletter_error_to_status)?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// `GET /api/admin/newsletters/:id` — fetch one issue.
pub async fn get_newsletter(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<newsletter::NewsletterRow>, StatusCode> {
    let row = newsletter::get_newsletter(&state.pool, id)
        .await
        .map_err(newsletter_error_to_status)?;
    Ok(Json(row))
}

/// `PATCH /api/admin/newsletters/:id` — update a draft issue.
pub async fn update_newsletter(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<NewsletterPatch>,
) -> Result<Json<newsletter::NewsletterRow>, StatusCode> {
    team::ensure_role(&auth.user, Role::Editor).map_err(team_error_to_status)?;

    let row = newsletter::update_newsletter(&state.pool, id, body)
        .await
        .map_err(newsletter_error_to_status)?;
    Ok(Json(row))
}

/// `DELETE /api/admin/newsletters/:id` — delete an issue.
pub async fn delete_newsletter(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    team::ensure_role(&auth.user, Role::Editor).map_err(team_error_to_status)?;

    newsletter::delete_newsletter(&state.pool, id)
        .await
        .map_err(newsletter_error_to_status)?;
    Ok(Json(serde_json::json!({ "ok": true })))
}

// =============================================================================
// BLOCK VALUES & RESOLUTION
// =============================================================================

/// `GET /api/admin/newsletters/:id/blocks` — list issue-level block values.
pub async fn list_issue_blocks(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<IssueBlock>>, StatusCode> {
    // Surface 404 for unknown ids rather than an empty list.
    newsletter::get_newsletter(&state.pool, id)
        .await
        .map_err(newsletter_error_to_status)?;

    let blocks = newsletter::list_issue_blocks(&state.pool, id)
        .await
        .map_err(newsletter_error_to_status)?;
    Ok(Json(blocks))
}

#[derive(Deserialize)]
pub struct SetIssueBlocksBody {
    pub blocks: Vec<IssueBlock>,
}

/// `PUT /api/admin/newsletters/:id/blocks` — replace issue-level values.
pub async fn set_issue_blocks(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<SetIssueBlocksBody>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    team::ensure_role(&auth.user, Role::Editor).map_err(team_error_to_status)?;

    newsletter::set_issue_blocks(&state.pool, id, body.blocks)
        .await
        .map_err(newsletter_error_to_status)?;
    Ok(Json(serde_json::json!({ "ok": true })))
}

/// `GET /api/admin/newsletters/:id/resolved` — effective block configurations.
pub async fn resolved(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<ResolvedBlock>>, StatusCode> {
    let blocks = newsletter::resolve_newsletter(&state.pool, id)
        .await
        .map_err(newsletter_error_to_status)?;
    Ok(Json(blocks))
}

/// `GET /api/admin/newsletters/:id/preview` — rendered HTML preview.
pub async fn preview(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Html<String>, StatusCode> {
    let issue = newsletter::get_newsletter(&state.pool, id)
        .await
        .map_err(newsletter_error_to_status)?;
    let blocks = newsletter::resolve_newsletter(&state.pool, id)
        .await
        .map_err(newsletter_error_to_status)?;

    let subject = if issue.subject_en.is_empty() { &issue.title } else { &issue.subject_en };
    Ok(Html(newsletter::render_newsletter_html(subject, &blocks)))
}

/// `POST /api/admin/newsletters/:id/send` — render and dispatch to subscribers.
pub async fn send(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<newsletter::SendOutcome>, StatusCode> {
    team::ensure_role(&auth.user, Role::Editor).map_err(team_error_to_status)?;

    let outcome = newsletter::send_newsletter(&state.pool, state.email.as_ref(), id)
        .await
        .map_err(newsletter_error_to_status)?;
    Ok(Json(outcome))
}

// =============================================================================
// SUBSCRIBERS
// =============================================================================

/// `GET /api/admin/subscribers` — list subscribers, filtered by `q` / `status`.
pub async fn list_subscribers(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(filter): Query<SubscriberFilter>,
) -> Result<Json<Vec<newsletter::SubscriberRow>>, StatusCode> {
    let rows = newsletter::list_subscribers(&state.pool)
        .await
        .map_err(newsletter_error_to_status)?;
    Ok(Json(newsletter::apply_subscriber_filter(rows, &filter)))
}

#[derive(Deserialize)]
pub struct CreateSubscriberBody {
    pub email: String,
    #[serde(default)]
    pub locale: String,
}

/// `POST /api/admin/subscribers` — add a subscriber manually.
pub async fn create_subscriber(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<CreateSubscriberBody>,
) -> Result<(StatusCode, Json<newsletter::SubscriberRow>), StatusCode> {
    team::ensure_role(&auth.user, Role::Editor).map_err(team_error_to_status)?;

    let row = newsletter::subscribe(&state.pool, &body.email, &body.locale)
        .await
        .map_err(newsletter_error_to_status)?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// `DELETE /api/admin/subscribers/:id` — remove a subscriber outright.
pub async fn delete_subscriber(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    team::ensure_role(&auth.user, Role::Editor).map_err(team_error_to_status)?;

    newsletter::delete_subscriber(&state.pool, id)
        .await
        .map_err(newsletter_error_to_status)?;
    Ok(Json(serde_json::json!({ "ok": true })))
}

#[derive(Serialize)]
struct SubscriberExportMetaLine {
    #[serde(rename = "type")]
    line_type: &'static str,
    version: u8,
    subscriber_count: usize,
}

#[derive(Serialize)]
struct SubscriberExportLine {
    #[serde(rename = "type")]
    line_type: &'static str,
    #[serde(flatten)]
    subscriber: newsletter::SubscriberRow,
}

/// `GET /api/admin/subscribers/export.jsonl` — download the subscriber list
/// as NDJSON/JSONL.
pub async fn export_subscribers_jsonl(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Result<Response, StatusCode> {
    let subscribers = newsletter::list_subscribers(&state.pool)
        .await
        .map_err(newsletter_error_to_status)?;

    let mut lines = Vec::with_capacity(subscribers.len() + 1);
    let meta = SubscriberExportMetaLine {
        line_type: "subscriber_export_meta",
        version: 1,
        subscriber_count: subscribers.len(),
    };
    let meta_line = serde_json::to_string(&meta).map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    lines.push(format!("{meta_line}\n"));

    for subscriber in subscribers {
        let line = SubscriberExportLine { line_type: "subscriber", subscriber };
        let serialized = serde_json::to_string(&line).map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
        lines.push(format!("{serialized}\n"));
    }

    let stream = futures::stream::iter(
        lines
            .into_iter()
            .map(|line| Ok::<axum::body::Bytes, std::convert::Infallible>(axum::body::Bytes::from(line))),
    );
    let body = axum::body::Body::from_stream(stream);

    Ok((
        [
            (CONTENT_TYPE, "application/x-ndjson; charset=utf-8"),
            (CONTENT_DISPOSITION, "attachment; filename=\"subscribers.jsonl\""),
        ],
        body,
    )
        .into_response())
}
