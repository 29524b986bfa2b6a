//! Discovery page service — crypto and bond landing pages.

use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::services::content::{ContentError, PublishStatus, slugify};

/// Filter selections for discovery page lists.
#[derive(Debug, Default, Clone, serde::Deserialize)]
pub struct PageFilter {
    /// Free-text match against slug, symbol/issuer, and English name.
    pub q: Option<String>,
    pub status: Option<String>,
}

fn filter_parts(filter: &PageFilter) -> (Option<String>, Option<&str>) {
    let query = filter
        .q
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .map(str::to_lowercase);
    let status = filter.status.as_deref().filter(|s| !s.is_empty());
    (query, status)
}

/// Apply a filter to fetched crypto pages. Pure and idempotent.
#[must_use]
pub fn apply_crypto_filter(rows: Vec<CryptoPageRow>, filter: &PageFilter) -> Vec<CryptoPageRow> {
    let (query, status) = filter_parts(filter);
    rows.into_iter()
        .filter(|page| status.is_none_or(|s| page.status == s))
        .filter(|page| {
            query.as_deref().is_none_or(|q| {
                page.slug.contains(q) || page.symbol.to_lowercase().contains(q) || page.name_en.to_lowercase().contains(q)
            })
        })
        .collect()
}

/// Apply a filter to fetched bond pages. Pure and idempotent.
#[must_use]
pub fn apply_bond_filter(rows: Vec<BondPageRow>, filter: &PageFilter) -> Vec<BondPageRow> {
    let (query, status) = filter_parts(filter);
    rows.into_iter()
        .filter(|page| status.is_none_or(|s| page.status == s))
        .filter(|page| {
            query.as_deref().is_none_or(|q| {
                page.slug.contains(q) || page.issuer.to_lowercase().contains(q) || page.name_en.to_lowercase().contains(q)
            })
        })
        .collect()
}

// =============================================================================
// CRYPTO PAGES
// =============================================================================

/// Row returned from crypto page queries.
#[derive(Debug, Clone, serde::Serialize)]
pub struct CryptoPageRow {
    pub id: Uuid,
    pub slug: String,
    pub symbol: String,
    pub name_en: String,
    pub name_ar: String,
    pub summary_en: String,
    pub summary_ar: String,
    pub status: String,
}

const CRYPTO_COLUMNS: &str = "id, slug, symbol, name_en, name_ar, summary_en, summary_ar, status";

fn crypto_from_row(row: &sqlx::postgres::PgRow) -> CryptoPageRow {
    CryptoPageRow {
        id: row.get("id"),
        slug: row.get("slug"),
        symbol: row.get("symbol"),
        name_en: row.get("name_en"),
        name_ar: row.get("name_ar"),
        summary_en: row.get("summary_en"),
        summary_ar: row.get("summary_ar"),
        status: row.get("status"),
    }
}

/// Fields accepted when creating a crypto page.
#[derive(Debug, serde::Deserialize)]
pub struct NewCryptoPage {
    pub slug: Option<String>,
    pub symbol: String,
    pub name_en: String,
    #[serde(default)]
    pub name_ar: String,
    #[serde(default)]
    pub summary_en: String,
    #[serde(default)]
    pub summary_ar: String,
}

async fn ensure_slug_free(pool: &PgPool, table: &str, slug: &str, exclude: Option<Uuid>) -> Result<(), ContentError> {
    let taken: bool = match exclude {
        Some(id) => {
            sqlx::query_scalar(&format!("SELECT EXISTS(SELECT 1 FROM {table} WHERE slug = $1 AND id <> $2)"))
                .bind(slug)
                .bind(id)
                .fetch_one(pool)
                .await?
        }
        None => {
            sqlx::query_scalar(&format!("SELECT EXISTS(SELECT 1 FROM {table} WHERE slug = $1)"))
                .bind(slug)
                .fetch_one(pool)
                .await?
        }
    };
    if taken {
        return Err(ContentError::SlugTaken(slug.to_owned()));
    }
    Ok(())
}

/// Create a draft crypto page. The slug defaults to a slugified English name.
///
/// # Errors
///
/// Returns [`ContentError::SlugTaken`] on slug collision.
pub async fn create_crypto_page(pool: &PgPool, new: NewCryptoPage) -> Result<CryptoPageRow, ContentError> {
    let slug = match new.slug.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(given) => given.to_owned(),
        None => slugify(&new.name_en),
    };
    ensure_slug_free(pool, "crypto_pages", &slug, None).await?;

    let id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO crypto_pages (id, slug, symbol, name_en, name_ar, summary_en, summary_ar) \
         VALUES ($1, $2, $3, $4, $5, $6, $7)",
    )
    .bind(id)
    .bind(&slug)
    .bind(&new.symbol)
    .bind(&new.name_en)
    .bind(&new.name_ar)
    .bind(&new.summary_en)
    .bind(&new.summary_ar)
    .execute(pool)
    .await?;

    get_crypto_page(pool, id).await
}

/// List all crypto pages ordered by symbol.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_crypto_pages(pool: &PgPool) -> Result<Vec<CryptoPageRow>, ContentError> {
    let rows = sqlx::query(&format!("SELECT {CRYPTO_COLUMNS} FROM crypto_pages ORDER BY symbol"))
        .fetch_all(pool)
        .await?;
    Ok(rows.iter().map(crypto_from_row).collect())
}

/// Fetch one crypto page.
///
/// # Errors
///
/// Returns [`ContentError::NotFound`] for an unknown id.
pub async fn get_crypto_page(pool: &PgPool, id: Uuid) -> Result<CryptoPageRow, ContentError> {
    let row = sqlx::query(&format!("SELECT {CRYPTO_COLUMNS} FROM crypto_pages WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(ContentError::NotFound(id))?;
    Ok(crypto_from_row(&row))
}

/// Fields accepted when patching a crypto page.
#[derive(Debug, Default, serde::Deserialize)]
pub struct CryptoPagePatch {
    pub slug: Option<String>,
    pub symbol: Option<String>,
    pub name_en: Option<String>,
    pub name_ar: Option<String>,
    pub summary_en: Option<String>,
    pub summary_ar: Option<String>,
    pub status: Option<String>,
}

/// Patch a crypto page.
///
/// # Errors
///
/// Returns [`ContentError::InvalidStatus`] / [`ContentError::SlugTaken`] on
/// bad input.
pub async fn update_crypto_page(pool: &PgPool, id: Uuid, patch: CryptoPagePatch) -> Result<CryptoPageRow, ContentError> {
    let current = get_crypto_page(pool, id).await?;

    let status = match patch.status.as_deref() {
        Some(raw) => PublishStatus::from_str(raw)
            .ok_or_else(|| ContentError::InvalidStatus(raw.to_owned()))?
            .as_str()
            .to_owned(),
        None => current.status,
    };

    let slug = patch.slug.unwrap_or_else(|| current.slug.clone());
    if slug != current.slug {
        ensure_slug_free(pool, "crypto_pages", &slug, Some(id)).await?;
    }

    sqlx::query(
        "UPDATE crypto_pages SET \
             slug = $2, symbol = $3, name_en = $4, name_ar = $5, summary_en = $6, summary_ar = $7, \
             status = $8, updated_at = now() \
         WHERE id = $1",
    )
    .bind(id)
    .bind(&slug)
    .bind(patch.symbol.unwrap_or(current.symbol))
    .bind(patch.name_en.unwrap_or(current.name_en))
    .bind(patch.name_ar.unwrap_or(current.name_ar))
    .bind(patch.summary_en.unwrap_or(current.summary_en))
    .bind(patch.summary_ar.unwrap_or(current.summary_ar))
    .bind(&status)
    .execute(pool)
    .await?;

    get_crypto_page(pool, id).await
}

/// Delete a crypto page.
///
/// # Errors
///
/// Returns [`ContentError::NotFound`] for an unknown id.
pub async fn delete_crypto_page(pool: &PgPool, id: Uuid) -> Result<(), ContentError> {
    let result = sqlx::query("DELETE FROM crypto_pages WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(ContentError::NotFound(id));
    }
    Ok(())
}

/// List published crypto pages for the public site.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_published_crypto_pages(pool: &PgPool) -> Result<Vec<CryptoPageRow>, ContentError> {
    let rows = sqlx::query(&format!(
        "SELECT {CRYPTO_COLUMNS} FROM crypto_pages WHERE status = 'published' ORDER BY symbol"
    ))
    .fetch_all(pool)
    .await?;
    Ok(rows.iter().map(crypto_from_row).collect())
}

/// Fetch a published crypto page by slug.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn get_published_crypto_page(pool: &PgPool, slug: &str) -> Result<Option<CryptoPageRow>, ContentError> {
    let row = sqlx::query(&format!(
        "SELECT {CRYPTO_COLUMNS} FROM crypto_pages WHERE slug = $1 AND status = 'published'"
    ))
    .bind(slug)
    .fetch_optional(pool)
    .await?;
    Ok(row.as_ref().map(crypto_from_row))
}

// =============================================================================
// BOND PAGES
// =============================================================================

/// Row returned from bond page queries.
#[derive(Debug, Clone, serde::Serialize)]
pub struct BondPageRow {
    pub id: Uuid,
    pub slug: String,
    pub issuer: String,
    pub coupon_pct: Option<f64>,
    pub name_en: String,
    pub name_ar: String,
    pub summary_en: String,
    pub summary_ar: String,
    pub status: String,
}

const BOND_COLUMNS: &str = "id, slug, issuer, coupon_pct, name_en, name_ar, summary_en, summary_ar, status";

fn bond_from_row(row: &sqlx::postgres::PgRow) -> BondPageRow {
    BondPageRow {
        id: row.get("id"),
        slug: row.get("slug"),
        issuer: row.get("issuer"),
        coupon_pct: row.get("coupon_pct"),
        name_en: row.get("name_en"),
        name_ar: row.get("name_ar"),
        summary_en: row.get("summary_en"),
        summary_ar: row.get("summary_ar"),
        status: row.get("status"),
    }
}

/// Fields accepted when creating a bond page.
#[derive(Debug, serde::Deserialize)]
pub struct NewBondPage {
    pub slug: Option<String>,
    pub issuer: String,
    pub coupon_pct: Option<f64>,
    pub name_en: String,
    #[serde(default)]
    pub name_ar: String,
    #[serde(default)]
    pub summary_en: String,
    #[serde(default)]
    pub summary_ar: String,
}

/// Create a draft bond page.
///
/// # Errors
///
/// Returns [`ContentError::SlugTaken`] on slug collision.
pub async fn create_bond_page(pool: &PgPool, new: NewBondPage) -> Result<BondPageRow, ContentError> {
    let slug = match new.slug.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(given) => given.to_owned(),
        None => slugify(&new.name_en),
    };
    ensure_slug_free(pool, "bond_pages", &slug, None).await?;

    let id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO bond_pages (id, slug, issuer, coupon_pct, name_en, name_ar, summary_en, summary_ar) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
    )
    .bind(id)
    .bind(&slug)
    .bind(&new.issuer)
    .bind(new.coupon_pct)
    .bind(&new.name_en)
    .bind(&new.name_ar)
    .bind(&new.summary_en)
    .bind(&new.summary_ar)
    .execute(pool)
    .await?;

    get_bond_page(pool, id).await
}

/// List all bond pages ordered by issuer.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_bond_pages(pool: &PgPool) -> Result<Vec<BondPageRow>, ContentError> {
    let rows = sqlx::query(&format!("SELECT {BOND_COLUMNS} FROM bond_pages ORDER BY issuer"))
        .fetch_all(pool)
        .await?;
    Ok(rows.iter().map(bond_from_row).collect())
}

/// Fetch one bond page.
///
/// # Errors
///
/// Returns [`ContentError::NotFound`] for an unknown id.
pub async fn get_bond_page(pool: &PgPool, id: Uuid) -> Result<BondPageRow, ContentError> {
    let row = sqlx::query(&format!("SELECT {BOND_COLUMNS} FROM bond_pages WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(ContentError::NotFound(id))?;
    Ok(bond_from_row(&row))
}

/// Fields accepted when patching a bond page.
#[derive(Debug, Default, serde::Deserialize)]
pub struct BondPagePatch {
    pub slug: Option<String>,
    pub issuer: Option<String>,
    pub coupon_pct: Option<Option<f64>>,
    pub name_en: Option<String>,
    pub name_ar: Option<String>,
    pub summary_en: Option<String>,
    pub summary_ar: Option<String>,
    pub status: Option<String>,
}

/// Patch a bond page.
///
/// # Errors
///
/// Returns [`ContentError::InvalidStatus`] / [`ContentError::SlugTaken`] on
/// bad input.
pub async fn update_bond_page(pool: &PgPool, id: Uuid, patch: BondPagePatch) -> Result<BondPageRow, ContentError> {
    let current = get_bond_page(pool, id).await?;

    let status = match patch.status.as_deref() {
        Some(raw) => PublishStatus::from_str(raw)
            .ok_or_else(|| ContentError::InvalidStatus(raw.to_owned()))?
            .as_str()
            .to_owned(),
        None => current.status,
    };

    let slug = patch.slug.unwrap_or_else(|| current.slug.clone());
    if slug != current.slug {
        ensure_slug_free(pool, "bond_pages", &slug, Some(id)).await?;
    }

    sqlx::query(
        "UPDATE bond_pages SET \
             slug = $2, issuer = $3, coupon_pct = $4, name_en = $5, name_ar = $6, \
             summary_en = $7, summary_ar = $8, status = $9, updated_at = now() \
         WHERE id = $1",
    )
    .bind(id)
    .bind(&slug)
    .bind(patch.issuer.unwrap_or(current.issuer))
    .bind(patch.coupon_pct.unwrap_or(current.coupon_pct))
    .bind(patch.name_en.unwrap_or(current.name_en))
    .bind(patch.name_ar.unwrap_or(current.name_ar))
    .bind(patch.summary_en.unwrap_or(current.summary_en))
    .bind(patch.summary_ar.unwrap_or(current.summary_ar))
    .bind(&status)
    .execute(pool)
    .await?;

    get_bond_page(pool, id).await
}

/// Delete a bond page.
///
/// # Errors
///
/// Returns [`ContentError::NotFound`] for an unknown id.
pub async fn delete_bond_page(pool: &PgPool, id: Uuid) -> Result<(), ContentError> {
    let result = sqlx::query("DELETE FROM bond_pages WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(ContentError::NotFound(id));
    }
    Ok(())
}

/// List published bond pages for the public site.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_published_bond_pages(pool: &PgPool) -> Result<Vec<BondPageRow>, ContentError> {
    let rows = sqlx::query(&format!(
        "SELECT {BOND_COLUMNS} FROM bond_pages WHERE status = 'published' ORDER BY issuer"
    ))
    .fetch_all(pool)
    .await?;
    Ok(rows.iter().map(bond_from_row).collect())
}

/// Fetch a published bond page by slug.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn get_published_bond_page(pool: &PgPool, slug: &str) -> Result<Option<BondPageRow>, ContentError> {
    let row = sqlx::query(&format!(
        "SELECT {BOND_COLUMNS} FROM bond_pages WHERE slug = $1 AND status = 'published'"
    ))
    .bind(slug)
    .fetch_optional(pool)
    .await?;
    Ok(row.as_ref().map(bond_from_row))
}

#[cfg(test)]
#[path = "pages_test.rs"]
mod tests;
