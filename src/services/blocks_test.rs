use super::*;
use serde_json::json;

fn settings(value: serde_json::Value) -> Settings {
    value.as_object().cloned().expect("test settings must be objects")
}

fn placement(zone: Zone, block_type: &str, position: i32, enabled: bool, overrides: serde_json::Value) -> TemplateBlock {
    TemplateBlock { zone, block_type: block_type.into(), position, enabled, overrides }
}

#[test]
fn merge_later_layers_win_per_field() {
    let defaults = settings(json!({"title": "Top stocks", "limit": 5, "theme": "light"}));
    let template = settings(json!({"limit": 10}));
    let issue = settings(json!({"title": "This week's movers"}));

    let merged = merge_block_settings(&defaults, &[&template, &issue]);

    // Issue wins where present, else template, else definition.
    assert_eq!(merged["title"], json!("This week's movers"));
    assert_eq!(merged["limit"], json!(10));
    assert_eq!(merged["theme"], json!("light"));
}

#[test]
fn merge_is_shallow_not_recursive() {
    let defaults = settings(json!({"cta": {"label": "Open account", "url": "/signup"}}));
    let issue = settings(json!({"cta": {"label": "Join now"}}));

    let merged = merge_block_settings(&defaults, &[&issue]);

    // The nested object is replaced wholesale: the default url is gone.
    assert_eq!(merged["cta"], json!({"label": "Join now"}));
}

#[test]
fn merge_with_no_layers_returns_defaults() {
    let defaults = settings(json!({"text": "hello"}));
    let merged = merge_block_settings(&defaults, &[]);
    assert_eq!(merged, defaults);
}

#[test]
fn resolve_prefers_issue_then_template_then_definition() {
    let mut definitions = HashMap::new();
    definitions.insert(
        "promo_banner".to_owned(),
        settings(json!({"headline": "default", "color": "blue", "footer_note": "defaults"})),
    );

    let template_blocks = vec![placement(Zone::Body, "promo_banner", 0, true, json!({"headline": "template"}))];

    let mut issue_values = HashMap::new();
    issue_values.insert((Zone::Body, "promo_banner".to_owned()), settings(json!({"color": "gold"})));

    let resolved = resolve_blocks(&definitions, &template_blocks, &issue_values);
    assert_eq!(resolved.len(), 1);
    let block = &resolved[0];
    assert_eq!(block.settings["headline"], json!("template"));
    assert_eq!(block.settings["color"], json!("gold"));
    assert_eq!(block.settings["footer_note"], json!("defaults"));
}

#[test]
fn resolve_drops_disabled_blocks_despite_issue_values() {
    let mut definitions = HashMap::new();
    definitions.insert("promo_banner".to_owned(), settings(json!({"headline": "default"})));

    let template_blocks = vec![placement(Zone::Body, "promo_banner", 0, false, json!({}))];

    let mut issue_values = HashMap::new();
    issue_values.insert(
        (Zone::Body, "promo_banner".to_owned()),
        settings(json!({"headline": "issue override"})),
    );

    let resolved = resolve_blocks(&definitions, &template_blocks, &issue_values);
    assert!(resolved.is_empty());
}

#[test]
fn resolve_orders_header_body_footer_then_position() {
    let definitions = HashMap::new();
    let template_blocks = vec![
        placement(Zone::Footer, "legal", 0, true, json!({})),
        placement(Zone::Body, "stock_list_manual", 1, true, json!({})),
        placement(Zone::Body, "promo_banner", 0, true, json!({})),
        placement(Zone::Header, "hero", 0, true, json!({})),
    ];

    let resolved = resolve_blocks(&definitions, &template_blocks, &HashMap::new());
    let order: Vec<&str> = resolved.iter().map(|b| b.block_type.as_str()).collect();
    assert_eq!(order, vec!["hero", "promo_banner", "stock_list_manual", "legal"]);
}

#[test]
fn resolve_without_definition_uses_only_override_layers() {
    let template_blocks = vec![placement(Zone::Body, "unregistered", 0, true, json!({"text": "t"}))];
    let resolved = resolve_blocks(&HashMap::new(), &template_blocks, &HashMap::new());
    assert_eq!(resolved[0].settings["text"], json!("t"));
}

#[test]
fn resolve_is_stable_when_reapplied() {
    // Resolution over the same inputs is deterministic and repeatable.
    let mut definitions = HashMap::new();
    definitions.insert("hero".to_owned(), settings(json!({"headline": "hi"})));
    let template_blocks = vec![placement(Zone::Header, "hero", 0, true, json!({}))];

    let a = resolve_blocks(&definitions, &template_blocks, &HashMap::new());
    let b = resolve_blocks(&definitions, &template_blocks, &HashMap::new());
    assert_eq!(serde_json::to_value(&a).unwrap(), serde_json::to_value(&b).unwrap());
}

#[test]
fn zone_round_trips_through_strings() {
    for zone in [Zone::Header, Zone::Body, Zone::Footer] {
        assert_eq!(Zone::from_str(zone.as_str()), Some(zone));
    }
    assert_eq!(Zone::from_str("sidebar"), None);
}

#[test]
fn template_block_deserializes_with_defaults() {
    let block: TemplateBlock = serde_json::from_value(json!({
        "zone": "body",
        "block_type": "promo_banner"
    }))
    .unwrap();
    assert_eq!(block.position, 0);
    assert!(block.enabled);
    assert_eq!(block.overrides, json!({}));
}
