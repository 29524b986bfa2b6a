use super::*;

#[test]
fn parse_provider_accepts_known_values() {
    assert_eq!(parse_provider(None).unwrap(), ScanProviderKind::Anthropic);
    assert_eq!(parse_provider(Some("anthropic")).unwrap(), ScanProviderKind::Anthropic);
    assert_eq!(parse_provider(Some("openai")).unwrap(), ScanProviderKind::OpenAi);
}

#[test]
fn parse_provider_rejects_unknown_values() {
    assert!(matches!(parse_provider(Some("gemini")), Err(ScanError::ConfigParse(_))));
}

#[test]
fn default_models_per_provider() {
    assert!(default_model(ScanProviderKind::Anthropic).starts_with("claude"));
    assert!(default_model(ScanProviderKind::OpenAi).starts_with("gpt"));
}

// Single test for env-derived config: env mutation is process-global, so the
// scenarios run sequentially inside one test body.
#[test]
fn from_env_scenarios() {
    unsafe {
        std::env::remove_var("SCAN_PROVIDER");
        std::env::remove_var("SCAN_MODEL");
        std::env::remove_var("SCAN_MAX_TOKENS");
        std::env::remove_var("SCAN_OPENAI_BASE_URL");
        std::env::remove_var("SCAN_API_KEY_ENV");
        std::env::remove_var("SCAN_TEST_KEY");
    }

    // Missing key env is an error.
    assert!(matches!(ScanConfig::from_env(), Err(ScanError::MissingApiKey { .. })));

    // Defaults with only the key configured.
    unsafe {
        std::env::set_var("SCAN_API_KEY_ENV", "SCAN_TEST_KEY");
        std::env::set_var("SCAN_TEST_KEY", "secret");
    }
    let cfg = ScanConfig::from_env().unwrap();
    assert_eq!(cfg.provider, ScanProviderKind::Anthropic);
    assert_eq!(cfg.api_key, "secret");
    assert_eq!(cfg.max_tokens, DEFAULT_SCAN_MAX_TOKENS);
    assert_eq!(cfg.base_url, DEFAULT_OPENAI_BASE_URL);

    // OpenAI overrides; trailing slash on base URL is trimmed.
    unsafe {
        std::env::set_var("SCAN_PROVIDER", "openai");
        std::env::set_var("SCAN_MODEL", "gpt-4o-mini");
        std::env::set_var("SCAN_MAX_TOKENS", "512");
        std::env::set_var("SCAN_OPENAI_BASE_URL", "https://example.test/v1/");
    }
    let cfg = ScanConfig::from_env().unwrap();
    assert_eq!(cfg.provider, ScanProviderKind::OpenAi);
    assert_eq!(cfg.model, "gpt-4o-mini");
    assert_eq!(cfg.max_tokens, 512);
    assert_eq!(cfg.base_url, "https://example.test/v1");

    unsafe {
        std::env::remove_var("SCAN_PROVIDER");
        std::env::remove_var("SCAN_MODEL");
        std::env::remove_var("SCAN_MAX_TOKENS");
        std::env::remove_var("SCAN_OPENAI_BASE_URL");
        std::env::remove_var("SCAN_API_KEY_ENV");
        std::env::remove_var("SCAN_TEST_KEY");
    }
}
