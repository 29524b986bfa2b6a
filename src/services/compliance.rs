//! Compliance service — scan orchestration and run history.
//!
//! DESIGN
//! ======
//! A scan submits text (pasted, or assembled from existing content) to the
//! external provider, classifies the returned score into a label using
//! configured cut-points, and persists the run. The provider's findings are
//! stored verbatim as JSONB; nothing is persisted when the provider fails.

use sqlx::{PgPool, Row};
use tracing::info;
use uuid::Uuid;

use crate::rate_limit::ScanLimitError;
use crate::scan::{ProviderReport, ScanError};
use crate::services::content::ContentError;
use crate::services::newsletter::NewsletterError;
use crate::state::AppState;

const DEFAULT_COMPLIANT_MIN: i32 = 80;
const DEFAULT_REVIEW_MIN: i32 = 50;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ComplianceError {
    #[error("scan provider not configured")]
    ScannerNotConfigured,
    #[error("nothing to scan: input text is empty")]
    EmptyText,
    #[error("invalid scan source: {0}")]
    InvalidSource(String),
    #[error("scan run not found: {0}")]
    NotFound(Uuid),
    #[error(transparent)]
    RateLimited(#[from] ScanLimitError),
    #[error("provider error: {0}")]
    Provider(#[from] ScanError),
    #[error(transparent)]
    Content(#[from] ContentError),
    #[error(transparent)]
    Newsletter(#[from] NewsletterError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// What the scanned text was assembled from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanSource {
    Text,
    BlogPost,
    Newsletter,
}

impl ScanSource {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::BlogPost => "blog_post",
            Self::Newsletter => "newsletter",
        }
    }

    #[must_use]
    pub fn from_str(raw: &str) -> Option<Self> {
        match raw {
            "text" => Some(Self::Text),
            "blog_post" => Some(Self::BlogPost),
            "newsletter" => Some(Self::Newsletter),
            _ => None,
        }
    }
}

/// Label cut-points. Scores at or above `compliant_min` are compliant,
/// at or above `review_min` need review, anything below fails.
#[derive(Debug, Clone, Copy)]
pub struct Thresholds {
    pub compliant_min: i32,
    pub review_min: i32,
}

impl Thresholds {
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            compliant_min: env_parse("SCAN_COMPLIANT_MIN", DEFAULT_COMPLIANT_MIN),
            review_min: env_parse("SCAN_REVIEW_MIN", DEFAULT_REVIEW_MIN),
        }
    }
}

fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

/// Scan verdict derived from the score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Label {
    Compliant,
    NeedsReview,
    Fail,
}

impl Label {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Compliant => "compliant",
            Self::NeedsReview => "needs_review",
            Self::Fail => "fail",
        }
    }
}

/// Clamp a provider score into the 0–100 contract.
#[must_use]
pub fn clamp_score(score: i32) -> i32 {
    score.clamp(0, 100)
}

/// Classify a (clamped) score against the cut-points.
#[must_use]
pub fn classify_score(score: i32, thresholds: Thresholds) -> Label {
    if score >= thresholds.compliant_min {
        Label::Compliant
    } else if score >= thresholds.review_min {
        Label::NeedsReview
    } else {
        Label::Fail
    }
}

/// Clamp and classify a provider report.
#[must_use]
pub fn evaluate_report(report: &ProviderReport, thresholds: Thresholds) -> (i32, Label) {
    let score = clamp_score(report.score);
    (score, classify_score(score, thresholds))
}

/// Row returned from scan history queries.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ScanRow {
    pub id: Uuid,
    pub source: String,
    pub source_id: Option<Uuid>,
    pub input_text: String,
    pub score: i32,
    pub label: String,
    pub findings: serde_json::Value,
    pub model: String,
    pub created_by: Option<Uuid>,
    pub created_at: Option<String>,
}

const SCAN_COLUMNS: &str = "id, source, source_id, input_text, score, label, findings, model, created_by, \
     to_char(created_at, 'YYYY-MM-DD HH24:MI') AS created_at";

fn scan_from_row(row: &sqlx::postgres::PgRow) -> ScanRow {
    ScanRow {
        id: row.get("id"),
        source: row.get("source"),
        source_id: row.get("source_id"),
        input_text: row.get("input_text"),
        score: row.get("score"),
        label: row.get("label"),
        findings: row.get("findings"),
        model: row.get("model"),
        created_by: row.get("created_by"),
        created_at: row.get("created_at"),
    }
}

// =============================================================================
// TEXT ASSEMBLY
// =============================================================================

/// A scan request: pasted text, or a reference to existing content.
#[derive(Debug, Default, serde::Deserialize)]
pub struct ScanRequest {
    pub text: Option<String>,
    pub source: Option<String>,
    pub source_id: Option<Uuid>,
}

/// Assemble the English text of a referenced entity.
async fn assemble_source_text(pool: &PgPool, source: ScanSource, source_id: Uuid) -> Result<String, ComplianceError> {
    match source {
        ScanSource::Text => Ok(String::new()),
        ScanSource::BlogPost => {
            let post = crate::services::content::get_post(pool, source_id).await?;
            Ok([post.title_en, post.excerpt_en, post.body_en]
                .into_iter()
                .filter(|part| !part.trim().is_empty())
                .collect::<Vec<_>>()
                .join("\n\n"))
        }
        ScanSource::Newsletter => {
            let newsletter = crate::services::newsletter::get_newsletter(pool, source_id).await?;
            let resolved = crate::services::newsletter::resolve_newsletter(pool, source_id).await?;
            let mut parts = vec![newsletter.title, newsletter.subject_en];
            for block in &resolved {
                for value in block.settings.values() {
                    if let Some(text) = value.as_str() {
                        parts.push(text.to_owned());
                    }
                }
            }
            Ok(parts
                .into_iter()
                .filter(|part| !part.trim().is_empty())
                .collect::<Vec<_>>()
                .join("\n\n"))
        }
    }
}

/// Resolve the request into (source, source id, text to scan).
async fn resolve_request(
    pool: &PgPool,
    request: &ScanRequest,
) -> Result<(ScanSource, Option<Uuid>, String), ComplianceError> {
    if let Some(text) = request.text.as_deref() {
        if !text.trim().is_empty() {
            return Ok((ScanSource::Text, None, text.to_owned()));
        }
    }

    let raw = request
        .source
        .as_deref()
        .ok_or_else(|| ComplianceError::InvalidSource("missing source and text".into()))?;
    let source = ScanSource::from_str(raw).ok_or_else(|| ComplianceError::InvalidSource(raw.to_owned()))?;
    if source == ScanSource::Text {
        return Err(ComplianceError::EmptyText);
    }
    let source_id = request
        .source_id
        .ok_or_else(|| ComplianceError::InvalidSource(format!("{raw} requires source_id")))?;

    let text = assemble_source_text(pool, source, source_id).await?;
    Ok((source, Some(source_id), text))
}

// =============================================================================
// SCAN EXECUTION
// =============================================================================

/// Run a scan end to end: assemble text, call the provider, classify, persist.
///
/// # Errors
///
/// Returns [`ComplianceError::ScannerNotConfigured`] with no provider,
/// [`ComplianceError::RateLimited`] when the operator exhausts a window, and
/// [`ComplianceError::Provider`] when the provider fails — nothing is
/// persisted in any of these cases.
pub async fn run_scan(state: &AppState, operator_id: Uuid, request: ScanRequest) -> Result<ScanRow, ComplianceError> {
    let scanner = state
        .scanner
        .as_ref()
        .ok_or(ComplianceError::ScannerNotConfigured)?;

    let (source, source_id, text) = resolve_request(&state.pool, &request).await?;
    if text.trim().is_empty() {
        return Err(ComplianceError::EmptyText);
    }

    state.scan_limiter.check_and_record(operator_id)?;

    let response = scanner.analyze(&text).await?;
    state
        .scan_limiter
        .record_tokens(operator_id, response.input_tokens + response.output_tokens);

    let (score, label) = evaluate_report(&response.report, Thresholds::from_env());
    let findings = serde_json::to_value(&response.report.findings).unwrap_or_else(|_| serde_json::json!([]));

    let id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO compliance_scans (id, source, source_id, input_text, score, label, findings, model, created_by) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
    )
    .bind(id)
    .bind(source.as_str())
    .bind(source_id)
    .bind(&text)
    .bind(score)
    .bind(label.as_str())
    .bind(&findings)
    .bind(scanner.model())
    .bind(operator_id)
    .execute(&state.pool)
    .await?;

    info!(
        scan_id = %id,
        source = source.as_str(),
        score,
        label = label.as_str(),
        findings = response.report.findings.len(),
        "compliance scan complete"
    );

    get_scan(&state.pool, id).await
}

/// List recent scan runs, newest first.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_scans(pool: &PgPool, limit: i64) -> Result<Vec<ScanRow>, ComplianceError> {
    let rows = sqlx::query(&format!(
        "SELECT {SCAN_COLUMNS} FROM compliance_scans ORDER BY created_at DESC LIMIT $1"
    ))
    .bind(limit.clamp(1, 500))
    .fetch_all(pool)
    .await?;
    Ok(rows.iter().map(scan_from_row).collect())
}

/// Fetch one scan run.
///
/// # Errors
///
/// Returns [`ComplianceError::NotFound`] for an unknown id.
pub async fn get_scan(pool: &PgPool, id: Uuid) -> Result<ScanRow, ComplianceError> {
    let row = sqlx::query(&format!("SELECT {SCAN_COLUMNS} FROM compliance_scans WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(ComplianceError::NotFound(id))?;
    Ok(scan_from_row(&row))
}

#[cfg(test)]
#[path = "compliance_test.rs"]
mod tests;
