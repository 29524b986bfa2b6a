use super::*;

#[test]
fn parse_report_accepts_bare_json() {
    let raw = r#"{"score": 85, "findings": []}"#;
    let report = parse_report(raw).unwrap();
    assert_eq!(report.score, 85);
    assert!(report.findings.is_empty());
}

#[test]
fn parse_report_accepts_markdown_fenced_json() {
    let raw = "```json\n{\"score\": 40, \"findings\": [{\"rule_id\": \"guaranteed_returns\", \
               \"severity\": \"critical\", \"message\": \"promises a fixed profit\"}]}\n```";
    let report = parse_report(raw).unwrap();
    assert_eq!(report.score, 40);
    assert_eq!(report.findings.len(), 1);
    assert_eq!(report.findings[0].rule_id, "guaranteed_returns");
    assert_eq!(report.findings[0].severity, Severity::Critical);
    assert!(report.findings[0].suggestion.is_none());
}

#[test]
fn parse_report_accepts_leading_prose() {
    let raw = "Here is the report: {\"score\": 92, \"findings\": []}";
    assert_eq!(parse_report(raw).unwrap().score, 92);
}

#[test]
fn parse_report_rejects_non_json() {
    assert!(matches!(parse_report("all clear!"), Err(ScanError::ReportParse(_))));
    assert!(matches!(parse_report(""), Err(ScanError::ReportParse(_))));
}

#[test]
fn parse_report_rejects_wrong_shape() {
    // A JSON object without a score is not a report.
    assert!(matches!(parse_report(r#"{"findings": []}"#), Err(ScanError::ReportParse(_))));
}

#[test]
fn parse_report_defaults_missing_findings() {
    let report = parse_report(r#"{"score": 70}"#).unwrap();
    assert!(report.findings.is_empty());
}

#[test]
fn extract_json_handles_edge_shapes() {
    assert_eq!(extract_json("{}"), Some("{}"));
    assert_eq!(extract_json("x } y { z"), None);
    assert_eq!(extract_json("no braces"), None);
}

#[test]
fn severity_orders_least_to_most_severe() {
    assert!(Severity::Info < Severity::Minor);
    assert!(Severity::Minor < Severity::Major);
    assert!(Severity::Major < Severity::Critical);
}

#[test]
fn finding_serde_round_trip() {
    let finding = Finding {
        rule_id: "missing_disclaimer".into(),
        severity: Severity::Major,
        message: "performance claim lacks a risk disclaimer".into(),
        suggestion: Some("add 'capital at risk'".into()),
    };
    let json = serde_json::to_string(&finding).unwrap();
    let restored: Finding = serde_json::from_str(&json).unwrap();
    assert_eq!(restored.rule_id, "missing_disclaimer");
    assert_eq!(restored.severity, Severity::Major);
    assert_eq!(restored.suggestion.as_deref(), Some("add 'capital at risk'"));
}
