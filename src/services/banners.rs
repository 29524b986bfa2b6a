//! Banner service — spotlight banners, calls to action, install banners.
//!
//! DESIGN
//! ======
//! Three small promotional entities behind the marketing pages. Spotlights
//! carry an optional scheduling window; the public query returns only
//! banners that are active and currently inside their window.

use sqlx::{PgPool, Row};
use uuid::Uuid;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum BannerError {
    #[error("not found: {0}")]
    NotFound(Uuid),
    #[error("invalid platform: {0}")]
    InvalidPlatform(String),
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Row returned from spotlight queries.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SpotlightRow {
    pub id: Uuid,
    pub title_en: String,
    pub title_ar: String,
    pub subtitle_en: String,
    pub subtitle_ar: String,
    pub image_url: String,
    pub target_url: String,
    pub blog_post_id: Option<Uuid>,
    pub active: bool,
    pub starts_at: Option<String>,
    pub ends_at: Option<String>,
}

const SPOTLIGHT_COLUMNS: &str = "id, title_en, title_ar, subtitle_en, subtitle_ar, image_url, target_url, \
     blog_post_id, active, \
     to_char(starts_at, 'YYYY-MM-DD\"T\"HH24:MI:SS\"Z\"') AS starts_at, \
     to_char(ends_at, 'YYYY-MM-DD\"T\"HH24:MI:SS\"Z\"') AS ends_at";

fn spotlight_from_row(row: &sqlx::postgres::PgRow) -> SpotlightRow {
    SpotlightRow {
        id: row.get("id"),
        title_en: row.get("title_en"),
        title_ar: row.get("title_ar"),
        subtitle_en: row.get("subtitle_en"),
        subtitle_ar: row.get("subtitle_ar"),
        image_url: row.get("image_url"),
        target_url: row.get("target_url"),
        blog_post_id: row.get("blog_post_id"),
        active: row.get("active"),
        starts_at: row.get("starts_at"),
        ends_at: row.get("ends_at"),
    }
}

/// Validate an RFC 3339-ish timestamp string before handing it to Postgres.
/// Postgres does the real parsing via a `::timestamptz` cast; this only
/// rejects obviously malformed input early with a typed error.
fn validate_timestamp(raw: &Option<String>) -> Result<Option<String>, BannerError> {
    match raw.as_deref().map(str::trim) {
        None => Ok(None),
        Some("") => Ok(None),
        Some(value) => {
            let plausible = value.len() >= 10 && value.as_bytes()[4] == b'-' && value.as_bytes()[7] == b'-';
            if plausible {
                Ok(Some(value.to_owned()))
            } else {
                Err(BannerError::InvalidTimestamp(value.to_owned()))
            }
        }
    }
}

// =============================================================================
// SPOTLIGHTS
// =============================================================================

/// Fields accepted when creating a spotlight.
#[derive(Debug, serde::Deserialize)]
pub struct NewSpotlight {
    pub title_en: String,
    #[serde(default)]
    pub title_ar: String,
    #[serde(default)]
    pub subtitle_en: String,
    #[serde(default)]
    pub subtitle_ar: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub target_url: String,
    pub blog_post_id: Option<Uuid>,
    #[serde(default)]
    pub active: bool,
    pub starts_at: Option<String>,
    pub ends_at: Option<String>,
}

/// Create a spotlight banner, optionally derived from a blog post.
///
/// # Errors
///
/// Returns [`BannerError::InvalidTimestamp`] for malformed window bounds.
pub async fn create_spotlight(pool: &PgPool, new: NewSpotlight) -> Result<SpotlightRow, BannerError> {
    let starts_at = validate_timestamp(&new.starts_at)?;
    let ends_at = validate_timestamp(&new.ends_at)?;

    let id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO spotlight_banners \
         (id, title_en, title_ar, subtitle_en, subtitle_ar, image_url, target_url, blog_post_id, active, starts_at, ends_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10::timestamptz, $11::timestamptz)",
    )
    .bind(id)
    .bind(&new.title_en)
    .bind(&new.title_ar)
    .bind(&new.subtitle_en)
    .bind(&new.subtitle_ar)
    .bind(&new.image_url)
    .bind(&new.target_url)
    .bind(new.blog_post_id)
    .bind(new.active)
    .bind(&starts_at)
    .bind(&ends_at)
    .execute(pool)
    .await?;

    get_spotlight(pool, id).await
}

/// List all spotlights, newest first.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_spotlights(pool: &PgPool) -> Result<Vec<SpotlightRow>, BannerError> {
    let rows = sqlx::query(&format!(
        "SELECT {SPOTLIGHT_COLUMNS} FROM spotlight_banners ORDER BY created_at DESC"
    ))
    .fetch_all(pool)
    .await?;
    Ok(rows.iter().map(spotlight_from_row).collect())
}

/// Fetch one spotlight.
///
/// # Errors
///
/// Returns [`BannerError::NotFound`] for an unknown id.
pub async fn get_spotlight(pool: &PgPool, id: Uuid) -> Result<SpotlightRow, BannerError> {
    let row = sqlx::query(&format!("SELECT {SPOTLIGHT_COLUMNS} FROM spotlight_banners WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(BannerError::NotFound(id))?;
    Ok(spotlight_from_row(&row))
}

/// Fields accepted when patching a spotlight.
#[derive(Debug, Default, serde::Deserialize)]
pub struct SpotlightPatch {
    pub title_en: Option<String>,
    pub title_ar: Option<String>,
    pub subtitle_en: Option<String>,
    pub subtitle_ar: Option<String>,
    pub image_url: Option<String>,
    pub target_url: Option<String>,
    pub blog_post_id: Option<Option<Uuid>>,
    pub active: Option<bool>,
    pub starts_at: Option<Option<String>>,
    pub ends_at: Option<Option<String>>,
}

/// Patch a spotlight.
///
/// # Errors
///
/// Returns [`BannerError::InvalidTimestamp`] for malformed window bounds.
pub async fn update_spotlight(pool: &PgPool, id: Uuid, patch: SpotlightPatch) -> Result<SpotlightRow, BannerError> {
    let current = get_spotlight(pool, id).await?;

    let starts_at = match patch.starts_at {
        Some(value) => validate_timestamp(&value)?,
        None => current.starts_at.clone(),
    };
    let ends_at = match patch.ends_at {
        Some(value) => validate_timestamp(&value)?,
        None => current.ends_at.clone(),
    };

    sqlx::query(
        "UPDATE spotlight_banners SET \
             title_en = $2, title_ar = $3, subtitle_en = $4, subtitle_ar = $5, \
             image_url = $6, target_url = $7, blog_post_id = $8, active = $9, \
             starts_at = $10::timestamptz, ends_at = $11::timestamptz, updated_at = now() \
         WHERE id = $1",
    )
    .bind(id)
    .bind(patch.title_en.unwrap_or(current.title_en))
    .bind(patch.title_ar.unwrap_or(current.title_ar))
    .bind(patch.subtitle_en.unwrap_or(current.subtitle_en))
    .bind(patch.subtitle_ar.unwrap_or(current.subtitle_ar))
    .bind(patch.image_url.unwrap_or(current.image_url))
    .bind(patch.target_url.unwrap_or(current.target_url))
    .bind(patch.blog_post_id.unwrap_or(current.blog_post_id))
    .bind(patch.active.unwrap_or(current.active))
    .bind(&starts_at)
    .bind(&ends_at)
    .execute(pool)
    .await?;

    get_spotlight(pool, id).await
}

/// Delete a spotlight.
///
/// # Errors
///
/// Returns [`BannerError::NotFound`] for an unknown id.
pub async fn delete_spotlight(pool: &PgPool, id: Uuid) -> Result<(), BannerError> {
    let result = sqlx::query("DELETE FROM spotlight_banners WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(BannerError::NotFound(id));
    }
    Ok(())
}

/// List spotlights currently visible to the public: active and inside the
/// optional scheduling window.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_live_spotlights(pool: &PgPool) -> Result<Vec<SpotlightRow>, BannerError> {
    let rows = sqlx::query(&format!(
        "SELECT {SPOTLIGHT_COLUMNS} FROM spotlight_banners \
         WHERE active \
           AND (starts_at IS NULL OR starts_at <= now()) \
           AND (ends_at IS NULL OR ends_at > now()) \
         ORDER BY created_at DESC"
    ))
    .fetch_all(pool)
    .await?;
    Ok(rows.iter().map(spotlight_from_row).collect())
}

// =============================================================================
// CALLS TO ACTION
// =============================================================================

/// Row returned from CTA queries.
#[derive(Debug, Clone, serde::Serialize)]
pub struct CtaRow {
    pub id: Uuid,
    pub placement: String,
    pub label_en: String,
    pub label_ar: String,
    pub target_url: String,
    pub active: bool,
}

fn cta_from_row(row: &sqlx::postgres::PgRow) -> CtaRow {
    CtaRow {
        id: row.get("id"),
        placement: row.get("placement"),
        label_en: row.get("label_en"),
        label_ar: row.get("label_ar"),
        target_url: row.get("target_url"),
        active: row.get("active"),
    }
}

/// Fields accepted when creating a CTA.
#[derive(Debug, serde::Deserialize)]
pub struct NewCta {
    pub placement: String,
    pub label_en: String,
    #[serde(default)]
    pub label_ar: String,
    pub target_url: String,
    #[serde(default = "default_true")]
    pub active: bool,
}

fn default_true() -> bool {
    true
}

/// Create a call to action.
///
/// # Errors
///
/// Returns a database error if the insert fails.
pub async fn create_cta(pool: &PgPool, new: NewCta) -> Result<CtaRow, BannerError> {
    let id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO call_to_actions (id, placement, label_en, label_ar, target_url, active) \
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(id)
    .bind(&new.placement)
    .bind(&new.label_en)
    .bind(&new.label_ar)
    .bind(&new.target_url)
    .bind(new.active)
    .execute(pool)
    .await?;

    get_cta(pool, id).await
}

/// List all CTAs grouped by placement.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_ctas(pool: &PgPool) -> Result<Vec<CtaRow>, BannerError> {
    let rows = sqlx::query(
        "SELECT id, placement, label_en, label_ar, target_url, active \
         FROM call_to_actions ORDER BY placement, created_at",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows.iter().map(cta_from_row).collect())
}

/// Fetch one CTA.
///
/// # Errors
///
/// Returns [`BannerError::NotFound`] for an unknown id.
pub async fn get_cta(pool: &PgPool, id: Uuid) -> Result<CtaRow, BannerError> {
    let row = sqlx::query("SELECT id, placement, label_en, label_ar, target_url, active FROM call_to_actions WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(BannerError::NotFound(id))?;
    Ok(cta_from_row(&row))
}

/// Fields accepted when patching a CTA.
#[derive(Debug, Default, serde::Deserialize)]
pub struct CtaPatch {
    pub placement: Option<String>,
    pub label_en: Option<String>,
    pub label_ar: Option<String>,
    pub target_url: Option<String>,
    pub active: Option<bool>,
}

/// Patch a CTA.
///
/// # Errors
///
/// Returns [`BannerError::NotFound`] for an unknown id.
pub async fn update_cta(pool: &PgPool, id: Uuid, patch: CtaPatch) -> Result<CtaRow, BannerError> {
    let current = get_cta(pool, id).await?;

    sqlx::query(
        "UPDATE call_to_actions SET \
             placement = $2, label_en = $3, label_ar = $4, target_url = $5, active = $6, updated_at = now() \
         WHERE id = $1",
    )
    .bind(id)
    .bind(patch.placement.unwrap_or(current.placement))
    .bind(patch.label_en.unwrap_or(current.label_en))
    .bind(patch.label_ar.unwrap_or(current.label_ar))
    .bind(patch.target_url.unwrap_or(current.target_url))
    .bind(patch.active.unwrap_or(current.active))
    .execute(pool)
    .await?;

    get_cta(pool, id).await
}

/// Delete a CTA.
///
/// # Errors
///
/// Returns [`BannerError::NotFound`] for an unknown id.
pub async fn delete_cta(pool: &PgPool, id: Uuid) -> Result<(), BannerError> {
    let result = sqlx::query("DELETE FROM call_to_actions WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(BannerError::NotFound(id));
    }
    Ok(())
}

/// Restrict fetched CTAs to one placement. Pure and idempotent.
#[must_use]
pub fn apply_cta_filter(rows: Vec<CtaRow>, placement: Option<&str>) -> Vec<CtaRow> {
    match placement.map(str::trim).filter(|p| !p.is_empty()) {
        Some(placement) => rows.into_iter().filter(|cta| cta.placement == placement).collect(),
        None => rows,
    }
}

/// List active CTAs for the public site, optionally by placement.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_active_ctas(pool: &PgPool, placement: Option<&str>) -> Result<Vec<CtaRow>, BannerError> {
    let rows = match placement {
        Some(placement) => {
            sqlx::query(
                "SELECT id, placement, label_en, label_ar, target_url, active \
                 FROM call_to_actions WHERE active AND placement = $1 ORDER BY created_at",
            )
            .bind(placement)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query(
                "SELECT id, placement, label_en, label_ar, target_url, active \
                 FROM call_to_actions WHERE active ORDER BY placement, created_at",
            )
            .fetch_all(pool)
            .await?
        }
    };
    Ok(rows.iter().map(cta_from_row).collect())
}

// =============================================================================
// MOBILE INSTALL BANNERS
// =============================================================================

const PLATFORMS: &[&str] = &["ios", "android"];

/// Row returned from install banner queries.
#[derive(Debug, Clone, serde::Serialize)]
pub struct InstallBannerRow {
    pub id: Uuid,
    pub platform: String,
    pub headline_en: String,
    pub headline_ar: String,
    pub store_url: String,
    pub active: bool,
}

fn install_banner_from_row(row: &sqlx::postgres::PgRow) -> InstallBannerRow {
    InstallBannerRow {
        id: row.get("id"),
        platform: row.get("platform"),
        headline_en: row.get("headline_en"),
        headline_ar: row.get("headline_ar"),
        store_url: row.get("store_url"),
        active: row.get("active"),
    }
}

fn validate_platform(raw: &str) -> Result<(), BannerError> {
    if PLATFORMS.contains(&raw) {
        Ok(())
    } else {
        Err(BannerError::InvalidPlatform(raw.to_owned()))
    }
}

/// Fields accepted when creating an install banner.
#[derive(Debug, serde::Deserialize)]
pub struct NewInstallBanner {
    pub platform: String,
    pub headline_en: String,
    #[serde(default)]
    pub headline_ar: String,
    pub store_url: String,
    #[serde(default = "default_true")]
    pub active: bool,
}

/// Create a mobile install banner.
///
/// # Errors
///
/// Returns [`BannerError::InvalidPlatform`] for platforms other than
/// `ios`/`android`.
pub async fn create_install_banner(pool: &PgPool, new: NewInstallBanner) -> Result<InstallBannerRow, BannerError> {
    validate_platform(&new.platform)?;

    let id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO mobile_install_banners (id, platform, headline_en, headline_ar, store_url, active) \
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(id)
    .bind(&new.platform)
    .bind(&new.headline_en)
    .bind(&new.headline_ar)
    .bind(&new.store_url)
    .bind(new.active)
    .execute(pool)
    .await?;

    get_install_banner(pool, id).await
}

/// List all install banners.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_install_banners(pool: &PgPool) -> Result<Vec<InstallBannerRow>, BannerError> {
    let rows = sqlx::query(
        "SELECT id, platform, headline_en, headline_ar, store_url, active \
         FROM mobile_install_banners ORDER BY platform, created_at",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows.iter().map(install_banner_from_row).collect())
}

/// Fetch one install banner.
///
/// # Errors
///
/// Returns [`BannerError::NotFound`] for an unknown id.
pub async fn get_install_banner(pool: &PgPool, id: Uuid) -> Result<InstallBannerRow, BannerError> {
    let row = sqlx::query(
        "SELECT id, platform, headline_en, headline_ar, store_url, active FROM mobile_install_banners WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(BannerError::NotFound(id))?;
    Ok(install_banner_from_row(&row))
}

/// Fields accepted when patching an install banner.
#[derive(Debug, Default, serde::Deserialize)]
pub struct InstallBannerPatch {
    pub platform: Option<String>,
    pub headline_en: Option<String>,
    pub headline_ar: Option<String>,
    pub store_url: Option<String>,
    pub active: Option<bool>,
}

/// Patch an install banner.
///
/// # Errors
///
/// Returns [`BannerError::InvalidPlatform`] for unknown platforms.
pub async fn update_install_banner(
    pool: &PgPool,
    id: Uuid,
    patch: InstallBannerPatch,
) -> Result<InstallBannerRow, BannerError> {
    let current = get_install_banner(pool, id).await?;

    let platform = patch.platform.unwrap_or(current.platform);
    validate_platform(&platform)?;

    sqlx::query(
        "UPDATE mobile_install_banners SET \
             platform = $2, headline_en = $3, headline_ar = $4, store_url = $5, active = $6, updated_at = now() \
         WHERE id = $1",
    )
    .bind(id)
    .bind(&platform)
    .bind(patch.headline_en.unwrap_or(current.headline_en))
    .bind(patch.headline_ar.unwrap_or(current.headline_ar))
    .bind(patch.store_url.unwrap_or(current.store_url))
    .bind(patch.active.unwrap_or(current.active))
    .execute(pool)
    .await?;

    get_install_banner(pool, id).await
}

/// Delete an install banner.
///
/// # Errors
///
/// Returns [`BannerError::NotFound`] for an unknown id.
pub async fn delete_install_banner(pool: &PgPool, id: Uuid) -> Result<(), BannerError> {
    let result = sqlx::query("DELETE FROM mobile_install_banners WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(BannerError::NotFound(id));
    }
    Ok(())
}

/// Restrict fetched install banners to one platform. Pure and idempotent.
#[must_use]
pub fn apply_install_banner_filter(rows: Vec<InstallBannerRow>, platform: Option<&str>) -> Vec<InstallBannerRow> {
    match platform.map(str::trim).filter(|p| !p.is_empty()) {
        Some(platform) => rows
            .into_iter()
            .filter(|banner| banner.platform == platform)
            .collect(),
        None => rows,
    }
}

/// List active install banners, optionally by platform.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_active_install_banners(
    pool: &PgPool,
    platform: Option<&str>,
) -> Result<Vec<InstallBannerRow>, BannerError> {
    let rows = match platform {
        Some(platform) => {
            sqlx::query(
                "SELECT id, platform, headline_en, headline_ar, store_url, active \
                 FROM mobile_install_banners WHERE active AND platform = $1 ORDER BY created_at",
            )
            .bind(platform)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query(
                "SELECT id, platform, headline_en, headline_ar, store_url, active \
                 FROM mobile_install_banners WHERE active ORDER BY platform, created_at",
            )
            .fetch_all(pool)
            .await?
        }
    };
    Ok(rows.iter().map(install_banner_from_row).collect())
}

#[cfg(test)]
#[path = "banners_test.rs"]
mod tests;
