use super::*;

fn crypto(slug: &str, symbol: &str, status: &str) -> CryptoPageRow {
    CryptoPageRow {
        id: Uuid::new_v4(),
        slug: slug.into(),
        symbol: symbol.into(),
        name_en: format!("{symbol} page"),
        name_ar: String::new(),
        summary_en: String::new(),
        summary_ar: String::new(),
        status: status.into(),
    }
}

fn bond(slug: &str, issuer: &str, status: &str) -> BondPageRow {
    BondPageRow {
        id: Uuid::new_v4(),
        slug: slug.into(),
        issuer: issuer.into(),
        coupon_pct: Some(4.25),
        name_en: format!("{issuer} bond"),
        name_ar: String::new(),
        summary_en: String::new(),
        summary_ar: String::new(),
        status: status.into(),
    }
}

#[test]
fn crypto_filter_matches_symbol_and_status() {
    let rows = vec![
        crypto("bitcoin", "BTC", "published"),
        crypto("ethereum", "ETH", "draft"),
        crypto("solana", "SOL", "published"),
    ];

    let filter = PageFilter { q: Some("btc".into()), status: None };
    let filtered = apply_crypto_filter(rows.clone(), &filter);
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].slug, "bitcoin");

    let filter = PageFilter { q: None, status: Some("published".into()) };
    assert_eq!(apply_crypto_filter(rows, &filter).len(), 2);
}

#[test]
fn bond_filter_matches_issuer() {
    let rows = vec![
        bond("uae-sukuk-2030", "Emirates Development Bank", "published"),
        bond("us-treasury-2027", "US Treasury", "published"),
    ];

    let filter = PageFilter { q: Some("treasury".into()), status: None };
    let filtered = apply_bond_filter(rows, &filter);
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].slug, "us-treasury-2027");
}

#[test]
fn page_filters_are_idempotent() {
    let rows = vec![
        crypto("bitcoin", "BTC", "published"),
        crypto("ethereum", "ETH", "draft"),
    ];
    let filter = PageFilter { q: Some("e".into()), status: Some("draft".into()) };

    let once = apply_crypto_filter(rows, &filter);
    let twice = apply_crypto_filter(once.clone(), &filter);
    assert_eq!(
        once.iter().map(|p| p.id).collect::<Vec<_>>(),
        twice.iter().map(|p| p.id).collect::<Vec<_>>()
    );
}

#[test]
fn empty_page_filter_keeps_everything() {
    let rows = vec![bond("a", "A", "draft"), bond("b", "B", "published")];
    assert_eq!(apply_bond_filter(rows, &PageFilter::default()).len(), 2);
}
