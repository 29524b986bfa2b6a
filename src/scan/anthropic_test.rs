use super::*;
use crate::scan::types::Severity;

#[test]
fn parse_response_extracts_report_from_text_blocks() {
    let json = r#"{
        "content": [
            {"type": "text", "text": "{\"score\": 55, \"findings\": [{\"rule_id\": \"hype_language\", \"severity\": \"minor\", \"message\": \"'skyrocket' is promissory\", \"suggestion\": \"use 'grow'\"}]}"}
        ],
        "usage": {"input_tokens": 120, "output_tokens": 60}
    }"#;

    let response = parse_response(json).unwrap();
    assert_eq!(response.report.score, 55);
    assert_eq!(response.report.findings.len(), 1);
    assert_eq!(response.report.findings[0].severity, Severity::Minor);
    assert_eq!(response.input_tokens, 120);
    assert_eq!(response.output_tokens, 60);
}

#[test]
fn parse_response_skips_unknown_blocks() {
    let json = r#"{
        "content": [
            {"type": "thinking", "thinking": "hmm"},
            {"type": "text", "text": "{\"score\": 100, \"findings\": []}"}
        ],
        "usage": {"input_tokens": 10, "output_tokens": 5}
    }"#;

    let response = parse_response(json).unwrap();
    assert_eq!(response.report.score, 100);
}

#[test]
fn parse_response_rejects_malformed_envelope() {
    assert!(matches!(parse_response("not json"), Err(ScanError::ApiParse(_))));
}

#[test]
fn parse_response_rejects_reportless_text() {
    let json = r#"{
        "content": [{"type": "text", "text": "I cannot review this."}],
        "usage": {"input_tokens": 10, "output_tokens": 5}
    }"#;
    assert!(matches!(parse_response(json), Err(ScanError::ReportParse(_))));
}
