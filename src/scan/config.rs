//! Scan provider configuration parsed from environment variables.

use super::types::ScanError;

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_SCAN_REQUEST_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_SCAN_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_SCAN_MAX_TOKENS: u32 = 2048;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanProviderKind {
    Anthropic,
    OpenAi,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    pub provider: ScanProviderKind,
    pub api_key: String,
    pub model: String,
    pub max_tokens: u32,
    pub base_url: String,
    pub timeouts: ScanTimeouts,
}

impl ScanConfig {
    /// Build typed scan config from environment variables.
    ///
    /// Required:
    /// - `SCAN_API_KEY_ENV` (names the env var containing the key)
    ///
    /// Optional:
    /// - `SCAN_PROVIDER`: `anthropic` (default) or `openai`
    /// - `SCAN_MODEL`: provider default when absent
    /// - `SCAN_MAX_TOKENS`: default 2048
    /// - `SCAN_OPENAI_BASE_URL`: default OpenAI API base URL
    /// - `SCAN_REQUEST_TIMEOUT_SECS`: default 60
    /// - `SCAN_CONNECT_TIMEOUT_SECS`: default 10
    ///
    /// # Errors
    ///
    /// Returns an error if the provider is unknown or the API key is absent.
    pub fn from_env() -> Result<Self, ScanError> {
        let provider = parse_provider(std::env::var("SCAN_PROVIDER").ok().as_deref())?;

        let key_var =
            std::env::var("SCAN_API_KEY_ENV").map_err(|_| ScanError::MissingApiKey { var: "SCAN_API_KEY_ENV".into() })?;
        let api_key = std::env::var(&key_var).map_err(|_| ScanError::MissingApiKey { var: key_var.clone() })?;

        let model = std::env::var("SCAN_MODEL").unwrap_or_else(|_| default_model(provider).to_string());
        let max_tokens = env_parse_u32("SCAN_MAX_TOKENS", DEFAULT_SCAN_MAX_TOKENS);
        let base_url = std::env::var("SCAN_OPENAI_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_OPENAI_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let timeouts = ScanTimeouts {
            request_secs: env_parse_u64("SCAN_REQUEST_TIMEOUT_SECS", DEFAULT_SCAN_REQUEST_TIMEOUT_SECS),
            connect_secs: env_parse_u64("SCAN_CONNECT_TIMEOUT_SECS", DEFAULT_SCAN_CONNECT_TIMEOUT_SECS),
        };

        Ok(Self { provider, api_key, model, max_tokens, base_url, timeouts })
    }
}

fn env_parse_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default)
}

fn env_parse_u32(key: &str, default: u32) -> u32 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(default)
}

fn parse_provider(raw: Option<&str>) -> Result<ScanProviderKind, ScanError> {
    match raw.unwrap_or("anthropic") {
        "anthropic" => Ok(ScanProviderKind::Anthropic),
        "openai" => Ok(ScanProviderKind::OpenAi),
        other => Err(ScanError::ConfigParse(format!("unknown SCAN_PROVIDER: {other}"))),
    }
}

fn default_model(provider: ScanProviderKind) -> &'static str {
    match provider {
        ScanProviderKind::Anthropic => "claude-sonnet-4-5-20250929",
        ScanProviderKind::OpenAi => "gpt-4o",
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
