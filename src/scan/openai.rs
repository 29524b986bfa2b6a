//! OpenAI Chat Completions client.
//!
//! Thin HTTP wrapper for `{base_url}/chat/completions`. Pure parsing in
//! `parse_response` for testability.

use std::time::Duration;

use super::config::ScanTimeouts;
use super::types::{ScanError, ScanResponse, parse_report};

// =============================================================================
// CLIENT
// =============================================================================

pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl OpenAiClient {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(api_key: String, base_url: String, timeouts: ScanTimeouts) -> Result<Self, ScanError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeouts.request_secs))
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()
            .map_err(|e| ScanError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, api_key, base_url })
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
            max_completion_tokens: max_tokens,
            messages: &[
                ApiMessage { role: "system", content: system },
                ApiMessage { role: "user", content: user },
            ],
        };

        let url = format!("{}/chat/completions", self.base_url);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
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
    max_completion_tokens: u32,
    messages: &'a [ApiMessage<'a>],
}

#[derive(serde::Serialize)]
struct ApiMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(serde::Deserialize)]
struct ApiResponse {
    choices: Vec<Choice>,
    usage: Usage,
}

#[derive(serde::Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(serde::Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(serde::Deserialize)]
struct Usage {
    prompt_tokens: u64,
    completion_tokens: u64,
}

// =============================================================================
// PARSING
// =============================================================================

fn parse_response(json: &str) -> Result<ScanResponse, ScanError> {
    let api: ApiResponse = serde_json::from_str(json).map_err(|e| ScanError::ApiParse(e.to_string()))?;

    let text = api
        .choices
        .first()
        .and_then(|choice| choice.message.content.as_deref())
        .ok_or_else(|| ScanError::ApiParse("response has no message content".into()))?;

    let report = parse_report(text)?;
    Ok(ScanResponse { report, input_tokens: api.usage.prompt_tokens, output_tokens: api.usage.completion_tokens })
}

#[cfg(test)]
#[path = "openai_test.rs"]
mod tests;
