//! Scan types — provider-neutral report types and errors.

use serde::{Deserialize, Serialize};

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by scan client operations.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// A configuration value could not be parsed.
    #[error("config parse failed: {0}")]
    ConfigParse(String),

    /// The required API key environment variable is not set.
    #[error("missing API key: env var {var} not set")]
    MissingApiKey { var: String },

    /// The HTTP request to the provider failed.
    #[error("API request failed: {0}")]
    ApiRequest(String),

    /// The provider returned a non-success HTTP status.
    #[error("API response error: status {status}")]
    ApiResponse { status: u16, body: String },

    /// The provider response body could not be deserialized.
    #[error("API response parse failed: {0}")]
    ApiParse(String),

    /// The provider answered, but not with a well-formed JSON report.
    #[error("report parse failed: {0}")]
    ReportParse(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

// =============================================================================
// REPORT
// =============================================================================

/// Finding severity, ordered least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Minor,
    Major,
    Critical,
}

/// A single rule finding returned by the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    /// Short snake_case rule name (e.g. `guaranteed_returns`).
    pub rule_id: String,
    pub severity: Severity,
    /// What is wrong and where.
    pub message: String,
    /// Optional replacement wording.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

/// The JSON report the provider is prompted to produce.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderReport {
    /// 0–100; 100 = fully compliant and well written. Clamped downstream.
    pub score: i32,
    #[serde(default)]
    pub findings: Vec<Finding>,
}

/// A provider response: the parsed report plus token accounting.
#[derive(Debug)]
pub struct ScanResponse {
    pub report: ProviderReport,
    pub input_tokens: u64,
    pub output_tokens: u64,
}

// =============================================================================
// REPORT PARSING
// =============================================================================

/// Locate the outermost JSON object in raw model output. Providers are
/// prompted for bare JSON but occasionally wrap it in markdown fences or a
/// leading sentence.
pub(crate) fn extract_json(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&raw[start..=end])
}

/// Parse raw provider text into a [`ProviderReport`].
///
/// # Errors
///
/// Returns [`ScanError::ReportParse`] if no JSON object is present or the
/// object does not match the report shape.
pub fn parse_report(raw: &str) -> Result<ProviderReport, ScanError> {
    let json = extract_json(raw).ok_or_else(|| ScanError::ReportParse("no JSON object in provider output".into()))?;
    serde_json::from_str(json).map_err(|e| ScanError::ReportParse(e.to_string()))
}

// =============================================================================
// SCAN BACKEND TRAIT
// =============================================================================

/// Provider-neutral async trait for compliance analysis. Enables mocking in tests.
#[async_trait::async_trait]
pub trait ScanBackend: Send + Sync {
    /// Submit text for analysis and return the parsed report.
    ///
    /// # Errors
    ///
    /// Returns a [`ScanError`] if the request fails, the response is
    /// malformed, or the report cannot be parsed.
    async fn analyze(&self, text: &str) -> Result<ScanResponse, ScanError>;

    /// The model name runs are attributed to.
    fn model(&self) -> &str;
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
