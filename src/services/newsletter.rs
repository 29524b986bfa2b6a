//! Newsletter service — issues, block values, rendering, and dispatch.
//!
//! DESIGN
//! ======
//! An issue references a template and layers its own block values on top of
//! the template's overrides and the definitions' defaults (see the blocks
//! service for the merge contract). Sending renders the resolved blocks to a
//! simple HTML email and fans it out to subscribed recipients through
//! Resend. Delivery is best-effort: per-recipient failures are logged and
//! counted, never fatal to the batch.

use std::collections::HashMap;

use resend_rs::Resend;
use resend_rs::types::CreateEmailBaseOptions;
use sqlx::{PgPool, Row};
use tracing::{info, warn};
use uuid::Uuid;

use crate::services::blocks::{self, BlocksError, ResolvedBlock, Settings, Zone};
use crate::services::email_auth::normalize_email;
use crate::state::EmailConfig;

const NEWSLETTER_TEMPLATE: &str = include_str!("../../templates/newsletter.html");

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum NewsletterError {
    #[error("newsletter not found: {0}")]
    NotFound(Uuid),
    #[error("template not found: {0}")]
    TemplateNotFound(Uuid),
    #[error("newsletter already sent: {0}")]
    AlreadySent(Uuid),
    #[error("outbound email is not configured")]
    EmailDisabled,
    #[error("invalid email")]
    InvalidEmail,
    #[error("invalid zone: {0}")]
    InvalidZone(String),
    #[error(transparent)]
    Blocks(#[from] BlocksError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Row returned from newsletter queries.
#[derive(Debug, Clone, serde::Serialize)]
pub struct NewsletterRow {
    pub id: Uuid,
    pub template_id: Uuid,
    pub title: String,
    pub subject_en: String,
    pub subject_ar: String,
    pub status: String,
    pub sent_at: Option<String>,
    pub created_at: Option<String>,
}

const NEWSLETTER_COLUMNS: &str = "id, template_id, title, subject_en, subject_ar, status, \
     to_char(sent_at, 'YYYY-MM-DD HH24:MI') AS sent_at, \
     to_char(created_at, 'YYYY-MM-DD HH24:MI') AS created_at";

fn newsletter_from_row(row: &sqlx::postgres::PgRow) -> NewsletterRow {
    NewsletterRow {
        id: row.get("id"),
        template_id: row.get("template_id"),
        title: row.get("title"),
        subject_en: row.get("subject_en"),
        subject_ar: row.get("subject_ar"),
        status: row.get("status"),
        sent_at: row.get("sent_at"),
        created_at: row.get("created_at"),
    }
}

/// Issue-level values for one placed block.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct IssueBlock {
    pub zone: Zone,
    pub block_type: String,
    #[serde(default)]
    pub values: serde_json::Value,
}

// =============================================================================
// ISSUE CRUD
// =============================================================================

/// Fields accepted when creating an issue.
#[derive(Debug, serde::Deserialize)]
pub struct NewNewsletter {
    pub template_id: Uuid,
    pub title: String,
    #[serde(default)]
    pub subject_en: String,
    #[serde(default)]
    pub subject_ar: String,
}

/// Create a draft issue from a template.
///
/// # Errors
///
/// Returns [`NewsletterError::TemplateNotFound`] for an unknown template.
pub async fn create_newsletter(pool: &PgPool, new: NewNewsletter) -> Result<NewsletterRow, NewsletterError> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM newsletter_templates WHERE id = $1)")
        .bind(new.template_id)
        .fetch_one(pool)
        .await?;
    if !exists {
        return Err(NewsletterError::TemplateNotFound(new.template_id));
    }

    let id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO newsletters (id, template_id, title, subject_en, subject_ar) VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(id)
    .bind(new.template_id)
    .bind(&new.title)
    .bind(&new.subject_en)
    .bind(&new.subject_ar)
    .execute(pool)
    .await?;

    get_newsletter(pool, id).await
}

/// List all issues, newest first.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_newsletters(pool: &PgPool) -> Result<Vec<NewsletterRow>, NewsletterError> {
    let rows = sqlx::query(&format!("SELECT {NEWSLETTER_COLUMNS} FROM newsletters ORDER BY created_at DESC"))
        .fetch_all(pool)
        .await?;
    Ok(rows.iter().map(newsletter_from_row).collect())
}

/// Fetch one issue.
///
/// # Errors
///
/// Returns [`NewsletterError::NotFound`] for an unknown id.
pub async fn get_newsletter(pool: &PgPool, id: Uuid) -> Result<NewsletterRow, NewsletterError> {
    let row = sqlx::query(&format!("SELECT {NEWSLETTER_COLUMNS} FROM newsletters WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(NewsletterError::NotFound(id))?;
    Ok(newsletter_from_row(&row))
}

/// Fields accepted when patching an issue.
#[derive(Debug, Default, serde::Deserialize)]
pub struct NewsletterPatch {
    pub title: Option<String>,
    pub subject_en: Option<String>,
    pub subject_ar: Option<String>,
}

/// Patch a draft issue. Sent issues are immutable.
///
/// # Errors
///
/// Returns [`NewsletterError::AlreadySent`] for sent issues.
pub async fn update_newsletter(pool: &PgPool, id: Uuid, patch: NewsletterPatch) -> Result<NewsletterRow, NewsletterError> {
    let current = get_newsletter(pool, id).await?;
    if current.status == "sent" {
        return Err(NewsletterError::AlreadySent(id));
    }

    sqlx::query(
        "UPDATE newsletters SET title = $2, subject_en = $3, subject_ar = $4, updated_at = now() WHERE id = $1",
    )
    .bind(id)
    .bind(patch.title.unwrap_or(current.title))
    .bind(patch.subject_en.unwrap_or(current.subject_en))
    .bind(patch.subject_ar.unwrap_or(current.subject_ar))
    .execute(pool)
    .await?;

    get_newsletter(pool, id).await
}

/// Delete an issue and its block values.
///
/// # Errors
///
/// Returns [`NewsletterError::NotFound`] for an unknown id.
pub async fn delete_newsletter(pool: &PgPool, id: Uuid) -> Result<(), NewsletterError> {
    let result = sqlx::query("DELETE FROM newsletters WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(NewsletterError::NotFound(id));
    }
    Ok(())
}

// =============================================================================
// BLOCK VALUES & RESOLUTION
// =============================================================================

/// Replace the issue-level block values wholesale.
///
/// # Errors
///
/// Returns [`NewsletterError::AlreadySent`] for sent issues.
pub async fn set_issue_blocks(pool: &PgPool, id: Uuid, blocks: Vec<IssueBlock>) -> Result<(), NewsletterError> {
    let current = get_newsletter(pool, id).await?;
    if current.status == "sent" {
        return Err(NewsletterError::AlreadySent(id));
    }

    sqlx::query("DELETE FROM newsletter_blocks WHERE newsletter_id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    for block in &blocks {
        sqlx::query(
            "INSERT INTO newsletter_blocks (id, newsletter_id, zone, block_type, block_values) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(Uuid::new_v4())
        .bind(id)
        .bind(block.zone.as_str())
        .bind(&block.block_type)
        .bind(&block.values)
        .execute(pool)
        .await?;
    }
    Ok(())
}

/// List the issue-level block values.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_issue_blocks(pool: &PgPool, id: Uuid) -> Result<Vec<IssueBlock>, NewsletterError> {
    let rows = sqlx::query("SELECT zone, block_type, block_values FROM newsletter_blocks WHERE newsletter_id = $1")
        .bind(id)
        .fetch_all(pool)
        .await?;

    Ok(rows
        .iter()
        .filter_map(|row| {
            let zone: String = row.get("zone");
            Some(IssueBlock {
                zone: Zone::from_str(&zone)?,
                block_type: row.get("block_type"),
                values: row.get("block_values"),
            })
        })
        .collect())
}

/// Resolve the issue's effective block configurations: definition defaults,
/// template overrides, then issue values, per top-level field.
///
/// # Errors
///
/// Returns [`NewsletterError::NotFound`] for an unknown id.
pub async fn resolve_newsletter(pool: &PgPool, id: Uuid) -> Result<Vec<ResolvedBlock>, NewsletterError> {
    let newsletter = get_newsletter(pool, id).await?;
    let template_blocks = blocks::load_template_blocks(pool, newsletter.template_id).await?;

    let mut block_types: Vec<String> = template_blocks
        .iter()
        .map(|block| block.block_type.clone())
        .collect();
    block_types.sort();
    block_types.dedup();
    let definitions = blocks::load_default_settings(pool, &block_types).await?;

    let issue_blocks = list_issue_blocks(pool, id).await?;
    let mut issue_values: HashMap<(Zone, String), Settings> = HashMap::new();
    for block in issue_blocks {
        let values = block.values.as_object().cloned().unwrap_or_default();
        issue_values.insert((block.zone, block.block_type), values);
    }

    Ok(blocks::resolve_blocks(&definitions, &template_blocks, &issue_values))
}

// =============================================================================
// RENDERING
// =============================================================================

/// Minimal HTML escaping for text interpolated into the email shell.
#[must_use]
pub(crate) fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn setting_str<'a>(settings: &'a Settings, key: &str) -> Option<&'a str> {
    settings.get(key).and_then(|value| value.as_str())
}

/// Render one resolved block as an HTML section. Conventional settings keys
/// (`title`/`headline`, `text`/`body`, `image_url`, `cta_label` + `cta_url`)
/// are rendered; everything else is ignored.
fn render_block(block: &ResolvedBlock) -> String {
    let mut html = String::from("                <div style=\"padding-bottom:24px;\">\n");

    if let Some(title) = setting_str(&block.settings, "title").or_else(|| setting_str(&block.settings, "headline")) {
        html.push_str(&format!(
            "                  <h2 style=\"font-size:18px;color:#111827;margin:0 0 8px;\">{}</h2>\n",
            escape_html(title)
        ));
    }
    if let Some(image_url) = setting_str(&block.settings, "image_url") {
        html.push_str(&format!(
            "                  <img src=\"{}\" alt=\"\" style=\"max-width:100%;border-radius:4px;\" />\n",
            escape_html(image_url)
        ));
    }
    if let Some(text) = setting_str(&block.settings, "text").or_else(|| setting_str(&block.settings, "body")) {
        html.push_str(&format!(
            "                  <p style=\"font-size:14px;color:#374151;margin:8px 0;\">{}</p>\n",
            escape_html(text)
        ));
    }
    if let (Some(label), Some(url)) = (
        setting_str(&block.settings, "cta_label"),
        setting_str(&block.settings, "cta_url"),
    ) {
        html.push_str(&format!(
            "                  <a href=\"{}\" style=\"display:inline-block;background:#6d28d9;color:#ffffff;\
             border-radius:6px;padding:10px 20px;font-size:14px;text-decoration:none;\">{}</a>\n",
            escape_html(url),
            escape_html(label)
        ));
    }

    html.push_str("                </div>");
    html
}

/// Render the full issue HTML from its resolved blocks.
#[must_use]
pub fn render_newsletter_html(subject: &str, blocks: &[ResolvedBlock]) -> String {
    let body = blocks
        .iter()
        .map(render_block)
        .collect::<Vec<_>>()
        .join("\n");
    NEWSLETTER_TEMPLATE
        .replace("{{SUBJECT}}", &escape_html(subject))
        .replace("{{BODY}}", &body)
}

// =============================================================================
// SENDING
// =============================================================================

/// Outcome of a newsletter send.
#[derive(Debug, serde::Serialize)]
pub struct SendOutcome {
    pub recipients: usize,
    pub delivered: usize,
    pub failed: usize,
}

/// Render and dispatch an issue to all subscribed recipients, then mark it
/// sent. Per-recipient delivery failures are logged and counted; an issue
/// with no recipients is still marked sent.
///
/// # Errors
///
/// Returns [`NewsletterError::AlreadySent`] for sent issues and
/// [`NewsletterError::EmailDisabled`] when Resend is not configured.
pub async fn send_newsletter(pool: &PgPool, email: Option<&EmailConfig>, id: Uuid) -> Result<SendOutcome, NewsletterError> {
    let newsletter = get_newsletter(pool, id).await?;
    if newsletter.status == "sent" {
        return Err(NewsletterError::AlreadySent(id));
    }
    let email = email.ok_or(NewsletterError::EmailDisabled)?;

    let resolved = resolve_newsletter(pool, id).await?;
    let subject = if newsletter.subject_en.is_empty() { &newsletter.title } else { &newsletter.subject_en };
    let html = render_newsletter_html(subject, &resolved);

    let recipients: Vec<String> = sqlx::query_scalar("SELECT email FROM subscribers WHERE status = 'subscribed'")
        .fetch_all(pool)
        .await?;

    let resend = Resend::new(&email.api_key);
    let mut delivered = 0_usize;
    let mut failed = 0_usize;
    for recipient in &recipients {
        let message = CreateEmailBaseOptions::new(&email.from, [recipient.as_str()], subject).with_html(&html);
        match resend.emails.send(message).await {
            Ok(_) => delivered += 1,
            Err(e) => {
                warn!(error = %e, recipient = %recipient, newsletter_id = %id, "newsletter delivery failed");
                failed += 1;
            }
        }
    }

    sqlx::query("UPDATE newsletters SET status = 'sent', sent_at = now(), updated_at = now() WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    info!(newsletter_id = %id, recipients = recipients.len(), delivered, failed, "newsletter sent");
    Ok(SendOutcome { recipients: recipients.len(), delivered, failed })
}

// =============================================================================
// SUBSCRIBERS
// =============================================================================

/// Row returned from subscriber queries.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SubscriberRow {
    pub id: Uuid,
    pub email: String,
    pub locale: String,
    pub status: String,
    pub subscribed_at: Option<String>,
    pub unsubscribed_at: Option<String>,
}

const SUBSCRIBER_COLUMNS: &str = "id, email, locale, status, \
     to_char(subscribed_at, 'YYYY-MM-DD HH24:MI') AS subscribed_at, \
     to_char(unsubscribed_at, 'YYYY-MM-DD HH24:MI') AS unsubscribed_at";

fn subscriber_from_row(row: &sqlx::postgres::PgRow) -> SubscriberRow {
    SubscriberRow {
        id: row.get("id"),
        email: row.get("email"),
        locale: row.get("locale"),
        status: row.get("status"),
        subscribed_at: row.get("subscribed_at"),
        unsubscribed_at: row.get("unsubscribed_at"),
    }
}

/// Subscribe an email, re-activating it if it previously unsubscribed.
///
/// # Errors
///
/// Returns [`NewsletterError::InvalidEmail`] for unparseable addresses.
pub async fn subscribe(pool: &PgPool, email: &str, locale: &str) -> Result<SubscriberRow, NewsletterError> {
    let normalized = normalize_email(email).ok_or(NewsletterError::InvalidEmail)?;
    let locale = if locale.is_empty() { "en" } else { locale };

    let row = sqlx::query(&format!(
        "INSERT INTO subscribers (id, email, locale) VALUES ($1, $2, $3) \
         ON CONFLICT (email) DO UPDATE SET \
             status = 'subscribed', \
             locale = EXCLUDED.locale, \
             subscribed_at = CASE WHEN subscribers.status = 'unsubscribed' THEN now() ELSE subscribers.subscribed_at END, \
             unsubscribed_at = NULL, \
             updated_at = now() \
         RETURNING {SUBSCRIBER_COLUMNS}"
    ))
    .bind(Uuid::new_v4())
    .bind(&normalized)
    .bind(locale)
    .fetch_one(pool)
    .await?;

    Ok(subscriber_from_row(&row))
}

/// Unsubscribe an email. Unknown addresses are a silent no-op.
///
/// # Errors
///
/// Returns [`NewsletterError::InvalidEmail`] for unparseable addresses.
pub async fn unsubscribe(pool: &PgPool, email: &str) -> Result<(), NewsletterError> {
    let normalized = normalize_email(email).ok_or(NewsletterError::InvalidEmail)?;
    sqlx::query(
        "UPDATE subscribers SET status = 'unsubscribed', unsubscribed_at = now(), updated_at = now() \
         WHERE email = $1 AND status = 'subscribed'",
    )
    .bind(&normalized)
    .execute(pool)
    .await?;
    Ok(())
}

/// Filter selections for subscriber lists.
#[derive(Debug, Default, Clone, serde::Deserialize)]
pub struct SubscriberFilter {
    pub q: Option<String>,
    pub status: Option<String>,
}

/// Apply a filter to fetched subscribers. Pure and idempotent.
#[must_use]
pub fn apply_subscriber_filter(subscribers: Vec<SubscriberRow>, filter: &SubscriberFilter) -> Vec<SubscriberRow> {
    let query = filter
        .q
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .map(str::to_lowercase);
    let status = filter.status.as_deref().filter(|s| !s.is_empty());

    subscribers
        .into_iter()
        .filter(|s| status.is_none_or(|wanted| s.status == wanted))
        .filter(|s| query.as_deref().is_none_or(|q| s.email.contains(q)))
        .collect()
}

/// List all subscribers, newest first.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_subscribers(pool: &PgPool) -> Result<Vec<SubscriberRow>, NewsletterError> {
    let rows = sqlx::query(&format!(
        "SELECT {SUBSCRIBER_COLUMNS} FROM subscribers ORDER BY subscribed_at DESC"
    ))
    .fetch_all(pool)
    .await?;
    Ok(rows.iter().map(subscriber_from_row).collect())
}

/// Delete a subscriber outright (admin only; public traffic unsubscribes).
///
/// # Errors
///
/// Returns [`NewsletterError::NotFound`] for an unknown id.
pub async fn delete_subscriber(pool: &PgPool, id: Uuid) -> Result<(), NewsletterError> {
    let result = sqlx::query("DELETE FROM subscribers WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(NewsletterError::NotFound(id));
    }
    Ok(())
}

#[cfg(test)]
#[path = "newsletter_test.rs"]
mod tests;
