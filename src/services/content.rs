//! Content service — blog posts and discovery stories.
//!
//! DESIGN
//! ======
//! Straight CRUD over Postgres. List endpoints fetch rows and apply pure
//! in-process filters so search behavior is deterministic and idempotent.
//! Publishing stamps `published_at` the first time a post leaves draft.

use sqlx::{PgPool, Row};
use uuid::Uuid;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("not found: {0}")]
    NotFound(Uuid),
    #[error("slug already in use: {0}")]
    SlugTaken(String),
    #[error("invalid status: {0}")]
    InvalidStatus(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Publication status shared by posts, stories, and discovery pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublishStatus {
    Draft,
    Published,
    Archived,
}

impl PublishStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Published => "published",
            Self::Archived => "archived",
        }
    }

    #[must_use]
    pub fn from_str(raw: &str) -> Option<Self> {
        match raw {
            "draft" => Some(Self::Draft),
            "published" => Some(Self::Published),
            "archived" => Some(Self::Archived),
            _ => None,
        }
    }
}

/// Row returned from blog post queries.
#[derive(Debug, Clone, serde::Serialize)]
pub struct BlogPostRow {
    pub id: Uuid,
    pub slug: String,
    pub title_en: String,
    pub title_ar: String,
    pub excerpt_en: String,
    pub excerpt_ar: String,
    pub body_en: String,
    pub body_ar: String,
    pub cover_image_url: Option<String>,
    pub status: String,
    pub published_at: Option<String>,
    pub author_id: Option<Uuid>,
    pub created_at: Option<String>,
}

const POST_COLUMNS: &str = "id, slug, title_en, title_ar, excerpt_en, excerpt_ar, body_en, body_ar, \
     cover_image_url, status, to_char(published_at, 'YYYY-MM-DD HH24:MI') AS published_at, author_id, \
     to_char(created_at, 'YYYY-MM-DD HH24:MI') AS created_at";

fn post_from_row(row: &sqlx::postgres::PgRow) -> BlogPostRow {
    BlogPostRow {
        id: row.get("id"),
        slug: row.get("slug"),
        title_en: row.get("title_en"),
        title_ar: row.get("title_ar"),
        excerpt_en: row.get("excerpt_en"),
        excerpt_ar: row.get("excerpt_ar"),
        body_en: row.get("body_en"),
        body_ar: row.get("body_ar"),
        cover_image_url: row.get("cover_image_url"),
        status: row.get("status"),
        published_at: row.get("published_at"),
        author_id: row.get("author_id"),
        created_at: row.get("created_at"),
    }
}

// =============================================================================
// PURE HELPERS
// =============================================================================

/// Derive a URL slug from a title: lowercase ASCII alphanumerics joined by
/// single dashes.
#[must_use]
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut last_dash = true;
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

/// Filter selections for post lists.
#[derive(Debug, Default, Clone, serde::Deserialize)]
pub struct PostFilter {
    /// Free-text match against slug and bilingual titles/excerpts.
    pub q: Option<String>,
    pub status: Option<String>,
}

/// Apply a filter to fetched posts. Pure and idempotent: re-applying the
/// same filter to its own output is a no-op.
#[must_use]
pub fn apply_post_filter(posts: Vec<BlogPostRow>, filter: &PostFilter) -> Vec<BlogPostRow> {
    let query = filter
        .q
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .map(str::to_lowercase);
    let status = filter.status.as_deref().filter(|s| !s.is_empty());

    posts
        .into_iter()
        .filter(|post| status.is_none_or(|s| post.status == s))
        .filter(|post| {
            query.as_deref().is_none_or(|q| {
                post.slug.to_lowercase().contains(q)
                    || post.title_en.to_lowercase().contains(q)
                    || post.title_ar.contains(q)
                    || post.excerpt_en.to_lowercase().contains(q)
            })
        })
        .collect()
}

// =============================================================================
// BLOG POST CRUD
// =============================================================================

/// Fields accepted when creating a post.
#[derive(Debug, serde::Deserialize)]
pub struct NewBlogPost {
    pub slug: Option<String>,
    pub title_en: String,
    #[serde(default)]
    pub title_ar: String,
    #[serde(default)]
    pub excerpt_en: String,
    #[serde(default)]
    pub excerpt_ar: String,
    #[serde(default)]
    pub body_en: String,
    #[serde(default)]
    pub body_ar: String,
    pub cover_image_url: Option<String>,
}

/// Create a draft post. The slug defaults to a slugified English title.
///
/// # Errors
///
/// Returns [`ContentError::SlugTaken`] on slug collision.
pub async fn create_post(pool: &PgPool, new: NewBlogPost, author_id: Uuid) -> Result<BlogPostRow, ContentError> {
    let slug = match new.slug.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(given) => given.to_owned(),
        None => slugify(&new.title_en),
    };

    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM blog_posts WHERE slug = $1)")
        .bind(&slug)
        .fetch_one(pool)
        .await?;
    if exists {
        return Err(ContentError::SlugTaken(slug));
    }

    let id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO blog_posts \
         (id, slug, title_en, title_ar, excerpt_en, excerpt_ar, body_en, body_ar, cover_image_url, author_id) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
    )
    .bind(id)
    .bind(&slug)
    .bind(&new.title_en)
    .bind(&new.title_ar)
    .bind(&new.excerpt_en)
    .bind(&new.excerpt_ar)
    .bind(&new.body_en)
    .bind(&new.body_ar)
    .bind(&new.cover_image_url)
    .bind(author_id)
    .execute(pool)
    .await?;

    get_post(pool, id).await
}

/// List all posts, newest first. Filtering happens in the route layer via
/// [`apply_post_filter`].
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_posts(pool: &PgPool) -> Result<Vec<BlogPostRow>, ContentError> {
    let rows = sqlx::query(&format!("SELECT {POST_COLUMNS} FROM blog_posts ORDER BY created_at DESC"))
        .fetch_all(pool)
        .await?;
    Ok(rows.iter().map(post_from_row).collect())
}

/// Fetch one post.
///
/// # Errors
///
/// Returns [`ContentError::NotFound`] for an unknown id.
pub async fn get_post(pool: &PgPool, id: Uuid) -> Result<BlogPostRow, ContentError> {
    let row = sqlx::query(&format!("SELECT {POST_COLUMNS} FROM blog_posts WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(ContentError::NotFound(id))?;
    Ok(post_from_row(&row))
}

/// Fields accepted when patching a post. Absent fields keep their value.
#[derive(Debug, Default, serde::Deserialize)]
pub struct BlogPostPatch {
    pub slug: Option<String>,
    pub title_en: Option<String>,
    pub title_ar: Option<String>,
    pub excerpt_en: Option<String>,
    pub excerpt_ar: Option<String>,
    pub body_en: Option<String>,
    pub body_ar: Option<String>,
    pub cover_image_url: Option<Option<String>>,
    pub status: Option<String>,
}

/// Patch a post. Moving into `published` stamps `published_at` once.
///
/// # Errors
///
/// Returns [`ContentError::InvalidStatus`] for unknown status values and
/// [`ContentError::SlugTaken`] on slug collision.
pub async fn update_post(pool: &PgPool, id: Uuid, patch: BlogPostPatch) -> Result<BlogPostRow, ContentError> {
    let current = get_post(pool, id).await?;

    let status = match patch.status.as_deref() {
        Some(raw) => PublishStatus::from_str(raw)
            .ok_or_else(|| ContentError::InvalidStatus(raw.to_owned()))?
            .as_str()
            .to_owned(),
        None => current.status.clone(),
    };

    let slug = patch.slug.unwrap_or_else(|| current.slug.clone());
    if slug != current.slug {
        let taken: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM blog_posts WHERE slug = $1 AND id <> $2)")
            .bind(&slug)
            .bind(id)
            .fetch_one(pool)
            .await?;
        if taken {
            return Err(ContentError::SlugTaken(slug));
        }
    }

    let first_publish = status == "published" && current.published_at.is_none();

    sqlx::query(
        "UPDATE blog_posts SET \
             slug = $2, title_en = $3, title_ar = $4, excerpt_en = $5, excerpt_ar = $6, \
             body_en = $7, body_ar = $8, cover_image_url = $9, status = $10, \
             published_at = CASE WHEN $11 THEN now() ELSE published_at END, \
             updated_at = now() \
         WHERE id = $1",
    )
    .bind(id)
    .bind(&slug)
    .bind(patch.title_en.unwrap_or(current.title_en))
    .bind(patch.title_ar.unwrap_or(current.title_ar))
    .bind(patch.excerpt_en.unwrap_or(current.excerpt_en))
    .bind(patch.excerpt_ar.unwrap_or(current.excerpt_ar))
    .bind(patch.body_en.unwrap_or(current.body_en))
    .bind(patch.body_ar.unwrap_or(current.body_ar))
    .bind(patch.cover_image_url.unwrap_or(current.cover_image_url))
    .bind(&status)
    .bind(first_publish)
    .execute(pool)
    .await?;

    get_post(pool, id).await
}

/// Delete a post.
///
/// # Errors
///
/// Returns [`ContentError::NotFound`] for an unknown id.
pub async fn delete_post(pool: &PgPool, id: Uuid) -> Result<(), ContentError> {
    let result = sqlx::query("DELETE FROM blog_posts WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(ContentError::NotFound(id));
    }
    Ok(())
}

/// List published posts for the public site, newest first.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_published_posts(pool: &PgPool) -> Result<Vec<BlogPostRow>, ContentError> {
    let rows = sqlx::query(&format!(
        "SELECT {POST_COLUMNS} FROM blog_posts WHERE status = 'published' ORDER BY published_at DESC"
    ))
    .fetch_all(pool)
    .await?;
    Ok(rows.iter().map(post_from_row).collect())
}

/// Fetch a published post by slug for the public site.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn get_published_post_by_slug(pool: &PgPool, slug: &str) -> Result<Option<BlogPostRow>, ContentError> {
    let row = sqlx::query(&format!(
        "SELECT {POST_COLUMNS} FROM blog_posts WHERE slug = $1 AND status = 'published'"
    ))
    .bind(slug)
    .fetch_optional(pool)
    .await?;
    Ok(row.as_ref().map(post_from_row))
}

// =============================================================================
// STORIES
// =============================================================================

/// Row returned from story queries.
#[derive(Debug, Clone, serde::Serialize)]
pub struct StoryRow {
    pub id: Uuid,
    pub title_en: String,
    pub title_ar: String,
    pub image_url: String,
    pub link_url: Option<String>,
    pub spotlight_id: Option<Uuid>,
    pub status: String,
    pub position: i32,
}

const STORY_COLUMNS: &str = "id, title_en, title_ar, image_url, link_url, spotlight_id, status, position";

fn story_from_row(row: &sqlx::postgres::PgRow) -> StoryRow {
    StoryRow {
        id: row.get("id"),
        title_en: row.get("title_en"),
        title_ar: row.get("title_ar"),
        image_url: row.get("image_url"),
        link_url: row.get("link_url"),
        spotlight_id: row.get("spotlight_id"),
        status: row.get("status"),
        position: row.get("position"),
    }
}

/// Fields accepted when creating a story.
#[derive(Debug, serde::Deserialize)]
pub struct NewStory {
    pub title_en: String,
    #[serde(default)]
    pub title_ar: String,
    #[serde(default)]
    pub image_url: String,
    pub link_url: Option<String>,
    pub spotlight_id: Option<Uuid>,
    #[serde(default)]
    pub position: i32,
}

/// Create a draft story, optionally linked to a spotlight banner.
///
/// # Errors
///
/// Returns a database error if the insert fails (including an unknown
/// `spotlight_id`).
pub async fn create_story(pool: &PgPool, new: NewStory) -> Result<StoryRow, ContentError> {
    let id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO stories (id, title_en, title_ar, image_url, link_url, spotlight_id, position) \
         VALUES ($1, $2, $3, $4, $5, $6, $7)",
    )
    .bind(id)
    .bind(&new.title_en)
    .bind(&new.title_ar)
    .bind(&new.image_url)
    .bind(&new.link_url)
    .bind(new.spotlight_id)
    .bind(new.position)
    .execute(pool)
    .await?;

    get_story(pool, id).await
}

/// List all stories in display order.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_stories(pool: &PgPool) -> Result<Vec<StoryRow>, ContentError> {
    let rows = sqlx::query(&format!("SELECT {STORY_COLUMNS} FROM stories ORDER BY position, created_at"))
        .fetch_all(pool)
        .await?;
    Ok(rows.iter().map(story_from_row).collect())
}

/// Fetch one story.
///
/// # Errors
///
/// Returns [`ContentError::NotFound`] for an unknown id.
pub async fn get_story(pool: &PgPool, id: Uuid) -> Result<StoryRow, ContentError> {
    let row = sqlx::query(&format!("SELECT {STORY_COLUMNS} FROM stories WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(ContentError::NotFound(id))?;
    Ok(story_from_row(&row))
}

/// Fields accepted when patching a story.
#[derive(Debug, Default, serde::Deserialize)]
pub struct StoryPatch {
    pub title_en: Option<String>,
    pub title_ar: Option<String>,
    pub image_url: Option<String>,
    pub link_url: Option<Option<String>>,
    pub spotlight_id: Option<Option<Uuid>>,
    pub status: Option<String>,
    pub position: Option<i32>,
}

/// Patch a story.
///
/// # Errors
///
/// Returns [`ContentError::InvalidStatus`] for unknown status values.
pub async fn update_story(pool: &PgPool, id: Uuid, patch: StoryPatch) -> Result<StoryRow, ContentError> {
    let current = get_story(pool, id).await?;

    let status = match patch.status.as_deref() {
        Some(raw) => PublishStatus::from_str(raw)
            .ok_or_else(|| ContentError::InvalidStatus(raw.to_owned()))?
            .as_str()
            .to_owned(),
        None => current.status,
    };

    sqlx::query(
        "UPDATE stories SET \
             title_en = $2, title_ar = $3, image_url = $4, link_url = $5, \
             spotlight_id = $6, status = $7, position = $8, updated_at = now() \
         WHERE id = $1",
    )
    .bind(id)
    .bind(patch.title_en.unwrap_or(current.title_en))
    .bind(patch.title_ar.unwrap_or(current.title_ar))
    .bind(patch.image_url.unwrap_or(current.image_url))
    .bind(patch.link_url.unwrap_or(current.link_url))
    .bind(patch.spotlight_id.unwrap_or(current.spotlight_id))
    .bind(&status)
    .bind(patch.position.unwrap_or(current.position))
    .execute(pool)
    .await?;

    get_story(pool, id).await
}

/// Delete a story.
///
/// # Errors
///
/// Returns [`ContentError::NotFound`] for an unknown id.
pub async fn delete_story(pool: &PgPool, id: Uuid) -> Result<(), ContentError> {
    let result = sqlx::query("DELETE FROM stories WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(ContentError::NotFound(id));
    }
    Ok(())
}

/// List published stories for the public site, in display order.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_published_stories(pool: &PgPool) -> Result<Vec<StoryRow>, ContentError> {
    let rows = sqlx::query(&format!(
        "SELECT {STORY_COLUMNS} FROM stories WHERE status = 'published' ORDER BY position, created_at"
    ))
    .fetch_all(pool)
    .await?;
    Ok(rows.iter().map(story_from_row).collect())
}

#[cfg(test)]
#[path = "content_test.rs"]
mod tests;
