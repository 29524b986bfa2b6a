use super::*;

#[test]
fn parse_response_extracts_report_from_first_choice() {
    let json = r#"{
        "choices": [{"message": {"content": "{\"score\": 78, \"findings\": []}"}}],
        "usage": {"prompt_tokens": 200, "completion_tokens": 30}
    }"#;

    let response = parse_response(json).unwrap();
    assert_eq!(response.report.score, 78);
    assert_eq!(response.input_tokens, 200);
    assert_eq!(response.output_tokens, 30);
}

#[test]
fn parse_response_handles_fenced_report() {
    let json = r#"{
        "choices": [{"message": {"content": "```json\n{\"score\": 10, \"findings\": []}\n```"}}],
        "usage": {"prompt_tokens": 1, "completion_tokens": 1}
    }"#;
    assert_eq!(parse_response(json).unwrap().report.score, 10);
}

#[test]
fn parse_response_rejects_empty_choices() {
    let json = r#"{"choices": [], "usage": {"prompt_tokens": 0, "completion_tokens": 0}}"#;
    assert!(matches!(parse_response(json), Err(ScanError::ApiParse(_))));
}

#[test]
fn parse_response_rejects_null_content() {
    let json = r#"{
        "choices": [{"message": {"content": null}}],
        "usage": {"prompt_tokens": 0, "completion_tokens": 0}
    }"#;
    assert!(matches!(parse_response(json), Err(ScanError::ApiParse(_))));
}
