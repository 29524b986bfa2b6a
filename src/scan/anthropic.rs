//! Anthropic Messages API client.
//!
//! Thin HTTP wrapper for `/v1/messages`. Pure parsing in `parse_response`
//! for testability.

use std::time::Duration;

use super::config::ScanTimeouts;
use super::types::{ScanError, ScanResponse, parse_report};

const API_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";

// =============================================================================
// CLIENT
// =============================================================================

pub struct AnthropicClient {
    http: reqwest::Client,
    api_key: String,
}

impl AnthropicClient {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(api_key: String, timeouts: ScanTimeouts) -> Result<Self, ScanError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeouts.request_secs))
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()
            .map_err(|e| ScanError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, api_key })
    }

    /// Submit one system + user exchange and parse the JSON report.
    ///
    /// # Errors
    ///
    /// Returns a [`ScanError`] on transport failure, non-200 status, or an
    /// unparseable response or report.
    pub async fn analyze(
        &self,
        model: &str,
        max_tokens: u32,
        system: &str,
        user: &str,
    ) -> Result<ScanResponse, ScanError> {
        let body = ApiRequest {
            model,
            max_tokens,
            system,
            messages: &[ApiMessage { role: "user", content: user }],
        };

        let response = self
            .http
            .post(API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| ScanError::ApiRequest(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| ScanError::ApiRequest(e.to_string()))?;

        if status != 200 {
            return Err(ScanError::ApiResponse { status, body: text });
        }

        parse_response(&text)
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(serde::Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: &'a [ApiMessage<'a>],
}

#[derive(serde::Serialize)]
struct ApiMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(serde::Deserialize)]
struct ApiResponse {
    content: Vec<ContentBlock>,
    usage: Usage,
}

#[derive(serde::Deserialize)]
#[serde(tag = "type")]
enum ContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(other)]
    Unknown,
}

#[derive(serde::Deserialize)]
struct Usage {
    input_tokens: u64,
    output_tokens: u64,
}

// =============================================================================
// PARSING
// =============================================================================

fn parse_response(json: &str) -> Result<ScanResponse, ScanError> {
    let api: ApiResponse = serde_json::from_str(json).map_err(|e| ScanError::ApiParse(e.to_string()))?;

    let text: String = api
        .content
        .iter()
        .filter_map(|block| match block {
            ContentBlock::Text { text } => Some(text.as_str()),
            ContentBlock::Unknown => None,
        })
        .collect::<Vec<_>>()
        .join("\n");

    let report = parse_report(&text)?;
    Ok(ScanResponse { report, input_tokens: api.usage.input_tokens, output_tokens: api.usage.output_tokens })
}

#[cfg(test)]
#[path = "anthropic_test.rs"]
mod tests;
