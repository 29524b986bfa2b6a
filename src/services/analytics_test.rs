use super::*;

fn event(event_type: &str, device: &str, locale: &str) -> EventRow {
    EventRow {
        event_type: event_type.into(),
        path: "/".into(),
        locale: locale.into(),
        device: device.into(),
        occurred_at_ms: 1_700_000_000_000,
    }
}

#[test]
fn summarize_counts_by_all_dimensions() {
    let events = vec![
        event("page_view", "mobile", "en"),
        event("page_view", "desktop", "en"),
        event("install_click", "mobile", "ar"),
    ];

    let summary = summarize(&events);
    assert_eq!(summary.total, 3);
    assert_eq!(
        summary.by_event_type,
        vec![
            GroupCount { key: "page_view".into(), count: 2 },
            GroupCount { key: "install_click".into(), count: 1 },
        ]
    );
    assert_eq!(
        summary.by_device,
        vec![
            GroupCount { key: "mobile".into(), count: 2 },
            GroupCount { key: "desktop".into(), count: 1 },
        ]
    );
    assert_eq!(
        summary.by_locale,
        vec![
            GroupCount { key: "en".into(), count: 2 },
            GroupCount { key: "ar".into(), count: 1 },
        ]
    );
}

#[test]
fn summarize_buckets_blank_values_as_unknown() {
    let events = vec![event("page_view", "", "  "), event("page_view", "mobile", "en")];

    let summary = summarize(&events);
    assert!(summary.by_device.iter().any(|g| g.key == "unknown" && g.count == 1));
    assert!(summary.by_locale.iter().any(|g| g.key == "unknown" && g.count == 1));
}

#[test]
fn summarize_empty_is_all_zero() {
    let summary = summarize(&[]);
    assert_eq!(summary.total, 0);
    assert!(summary.by_event_type.is_empty());
    assert!(summary.by_device.is_empty());
    assert!(summary.by_locale.is_empty());
}

#[test]
fn summarize_orders_by_volume_then_key() {
    let events = vec![
        event("b_event", "mobile", "en"),
        event("a_event", "mobile", "en"),
        event("a_event", "mobile", "en"),
        event("c_event", "mobile", "en"),
    ];

    let summary = summarize(&events);
    let keys: Vec<&str> = summary.by_event_type.iter().map(|g| g.key.as_str()).collect();
    assert_eq!(keys, vec!["a_event", "b_event", "c_event"]);
}

#[test]
fn summarize_is_deterministic() {
    let events = vec![
        event("page_view", "mobile", "en"),
        event("install_click", "desktop", "ar"),
    ];
    let a = summarize(&events);
    let b = summarize(&events);
    assert_eq!(serde_json::to_value(&a).unwrap(), serde_json::to_value(&b).unwrap());
}
