use super::*;

#[test]
fn validate_timestamp_passes_date_shapes() {
    assert_eq!(
        validate_timestamp(&Some("2026-08-01T00:00:00Z".into())).unwrap(),
        Some("2026-08-01T00:00:00Z".to_owned())
    );
    assert_eq!(
        validate_timestamp(&Some("2026-08-01".into())).unwrap(),
        Some("2026-08-01".to_owned())
    );
}

#[test]
fn validate_timestamp_treats_blank_as_none() {
    assert_eq!(validate_timestamp(&None).unwrap(), None);
    assert_eq!(validate_timestamp(&Some("  ".into())).unwrap(), None);
}

#[test]
fn validate_timestamp_rejects_garbage() {
    assert!(matches!(
        validate_timestamp(&Some("next tuesday".into())),
        Err(BannerError::InvalidTimestamp(_))
    ));
    assert!(matches!(
        validate_timestamp(&Some("01/08/2026".into())),
        Err(BannerError::InvalidTimestamp(_))
    ));
}

#[test]
fn validate_platform_known_values() {
    assert!(validate_platform("ios").is_ok());
    assert!(validate_platform("android").is_ok());
    assert!(matches!(validate_platform("web"), Err(BannerError::InvalidPlatform(_))));
    assert!(matches!(validate_platform("IOS"), Err(BannerError::InvalidPlatform(_))));
}

#[test]
fn cta_filter_restricts_to_placement() {
    let rows = vec![
        cta_row("home_hero"),
        cta_row("blog_footer"),
        cta_row("home_hero"),
    ];

    let filtered = apply_cta_filter(rows.clone(), Some("home_hero"));
    assert_eq!(filtered.len(), 2);
    assert!(filtered.iter().all(|c| c.placement == "home_hero"));

    assert_eq!(apply_cta_filter(rows.clone(), None).len(), 3);
    assert_eq!(apply_cta_filter(rows, Some("  ")).len(), 3);
}

#[test]
fn install_banner_filter_restricts_to_platform() {
    let rows = vec![banner_row("ios"), banner_row("android"), banner_row("ios")];

    let filtered = apply_install_banner_filter(rows, Some("android"));
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].platform, "android");
}

fn cta_row(placement: &str) -> CtaRow {
    CtaRow {
        id: Uuid::new_v4(),
        placement: placement.into(),
        label_en: "Open account".into(),
        label_ar: String::new(),
        target_url: "https://app.example.com/signup".into(),
        active: true,
    }
}

fn banner_row(platform: &str) -> InstallBannerRow {
    InstallBannerRow {
        id: Uuid::new_v4(),
        platform: platform.into(),
        headline_en: "Get the app".into(),
        headline_ar: String::new(),
        store_url: "https://store.example.com".into(),
        active: true,
    }
}
