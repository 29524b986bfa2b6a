//! Admin routes for blog posts and stories.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use uuid::Uuid;

use crate::routes::auth::AuthUser;
use crate::services::content::{self, BlogPostPatch, NewBlogPost, NewStory, PostFilter, StoryPatch};
use crate::services::team::{self, Role, TeamError};
use crate::state::AppState;

pub(crate) fn content_error_to_status(err: content::ContentError) -> StatusCode {
    match err {
        content::ContentError::NotFound(_) => StatusCode::NOT_FOUND,
        content::ContentError::SlugTaken(_) => StatusCode::CONFLICT,
        content::ContentError::InvalidStatus(_) => StatusCode::BAD_REQUEST,
        content::ContentError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub(crate) fn team_error_to_status(err: TeamError) -> StatusCode {
    match err {
        TeamError::NotFound(_) => StatusCode::NOT_FOUND,
        TeamError::InvalidEmail => StatusCode::BAD_REQUEST,
        TeamError::EmailTaken(_) => StatusCode::CONFLICT,
        TeamError::Forbidden(_) | TeamError::SelfLockout => StatusCode::FORBIDDEN,
        TeamError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

// =============================================================================
// BLOG POSTS
// =============================================================================

/// `GET /api/admin/posts` — list posts, filtered by `q` / `status`.
pub async fn list_posts(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(filter): Query<PostFilter>,
) -> Result<Json<Vec<content::BlogPostRow>>, StatusCode> {
    let posts = content::list_posts(&state.pool)
        .await
        .map_err(content_error_to_status)?;
    Ok(Json(content::apply_post_filter(posts, &filter)))
}

/// `POST /api/admin/posts` — create a draft post.
pub async fn create_post(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<NewBlogPost>,
) -> Result<(StatusCode, Json<content::BlogPostRow>), StatusCode> {
    team::ensure_role(&auth.user, Role::Editor).map_err(team_error_to_status)?;

    if body.title_en.trim().is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }

    let post = content::create_post(&state.pool, body, auth.user.id)
        .await
        .map_err(content_error_to_status)?;
    Ok((StatusCode::CREATED, Json(post)))
}

/// `GET /api/admin/posts/:id` — fetch one post.
pub async fn get_post(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<content::BlogPostRow>, StatusCode> {
    let post = content::get_post(&state.pool, id)
        .await
        .map_err(content_error_to_status)?;
    Ok(Json(post))
}

/// `PATCH /api/admin/posts/:id` — update a post.
pub async fn update_post(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<BlogPostPatch>,
) -> Result<Json<content::BlogPostRow>, StatusCode> {
    team::ensure_role(&auth.user, Role::Editor).map_err(team_error_to_status)?;

    let post = content::update_post(&state.pool, id, body)
        .await
        .map_err(content_error_to_status)?;
    Ok(Json(post))
}

/// `DELETE /api/admin/posts/:id` — delete a post.
pub async fn delete_post(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    team::ensure_role(&auth.user, Role::Editor).map_err(team_error_to_status)?;

    content::delete_post(&state.pool, id)
        .await
        .map_err(content_error_to_status)?;
    Ok(Json(serde_json::json!({ "ok": true })))
}

// =============================================================================
// STORIES
// =============================================================================

/// `GET /api/admin/stories` — list stories in display order.
pub async fn list_stories(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Result<Json<Vec<content::StoryRow>>, StatusCode> {
    let stories = content::list_stories(&state.pool)
        .await
        .map_err(content_error_to_status)?;
    Ok(Json(stories))
}

/// `POST /api/admin/stories` — create a draft story.
pub async fn create_story(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<NewStory>,
) -> Result<(StatusCode, Json<content::StoryRow>), StatusCode> {
    team::ensure_role(&auth.user, Role::Editor).map_err(team_error_to_status)?;

    if body.title_en.trim().is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }

    let story = content::create_story(&state.pool, body)
        .await
        .map_err(content_error_to_status)?;
    Ok((StatusCode::CREATED, Json(story)))
}

/// `GET /api/admin/stories/:id` — fetch one story.
pub async fn get_story(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<content::StoryRow>, StatusCode> {
    let story = content::get_story(&state.pool, id)
        .await
        .map_err(content_error_to_status)?;
    Ok(Json(story))
}

/// `PATCH /api/admin/stories/:id` — update a story.
pub async fn update_story(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<StoryPatch>,
) -> Result<Json<content::StoryRow>, StatusCode> {
    team::ensure_role(&auth.user, Role::Editor).map_err(team_error_to_status)?;

    let story = content::update_story(&state.pool, id, body)
        .await
        .map_err(content_error_to_status)?;
    Ok(Json(story))
}

/// `DELETE /api/admin/stories/:id` — delete a story.
pub async fn delete_story(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    team::ensure_role(&auth.user, Role::Editor).map_err(team_error_to_status)?;

    content::delete_story(&state.pool, id)
        .await
        .map_err(content_error_to_status)?;
    Ok(Json(serde_json::json!({ "ok": true })))
}
