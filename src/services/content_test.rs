use super::*;

fn post(slug: &str, title_en: &str, status: &str) -> BlogPostRow {
    BlogPostRow {
        id: Uuid::new_v4(),
        slug: slug.into(),
        title_en: title_en.into(),
        title_ar: String::new(),
        excerpt_en: String::new(),
        excerpt_ar: String::new(),
        body_en: String::new(),
        body_ar: String::new(),
        cover_image_url: None,
        status: status.into(),
        published_at: None,
        author_id: None,
        created_at: None,
    }
}

#[test]
fn slugify_basic_titles() {
    assert_eq!(slugify("Top 5 Dividend Stocks"), "top-5-dividend-stocks");
    assert_eq!(slugify("  Crypto, Explained!  "), "crypto-explained");
    assert_eq!(slugify("UPPER"), "upper");
}

#[test]
fn slugify_collapses_runs_and_trims_dashes() {
    assert_eq!(slugify("a --- b"), "a-b");
    assert_eq!(slugify("!!leading and trailing!!"), "leading-and-trailing");
    assert_eq!(slugify(""), "");
    assert_eq!(slugify("!!!"), "");
}

#[test]
fn publish_status_round_trips() {
    for status in [PublishStatus::Draft, PublishStatus::Published, PublishStatus::Archived] {
        assert_eq!(PublishStatus::from_str(status.as_str()), Some(status));
    }
    assert_eq!(PublishStatus::from_str("live"), None);
}

#[test]
fn post_filter_matches_query_across_fields() {
    let posts = vec![
        post("top-stocks", "Top stocks this week", "published"),
        post("bonds-101", "Bonds explained", "draft"),
        post("crypto-rally", "The crypto rally", "published"),
    ];

    let filter = PostFilter { q: Some("crypto".into()), status: None };
    let filtered = apply_post_filter(posts, &filter);
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].slug, "crypto-rally");
}

#[test]
fn post_filter_combines_query_and_status() {
    let posts = vec![
        post("top-stocks", "Top stocks this week", "published"),
        post("stocks-draft", "Stocks draft", "draft"),
    ];

    let filter = PostFilter { q: Some("stocks".into()), status: Some("draft".into()) };
    let filtered = apply_post_filter(posts, &filter);
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].slug, "stocks-draft");
}

#[test]
fn post_filter_is_case_insensitive_and_trims() {
    let posts = vec![post("top-stocks", "Top Stocks", "published")];
    let filter = PostFilter { q: Some("  TOP  ".into()), status: None };
    assert_eq!(apply_post_filter(posts, &filter).len(), 1);
}

#[test]
fn post_filter_is_idempotent() {
    let posts = vec![
        post("top-stocks", "Top stocks this week", "published"),
        post("bonds-101", "Bonds explained", "draft"),
        post("crypto-rally", "The crypto rally", "published"),
    ];
    let filter = PostFilter { q: Some("o".into()), status: Some("published".into()) };

    let once = apply_post_filter(posts, &filter);
    let twice = apply_post_filter(once.clone(), &filter);
    assert_eq!(
        once.iter().map(|p| p.id).collect::<Vec<_>>(),
        twice.iter().map(|p| p.id).collect::<Vec<_>>()
    );
}

#[test]
fn empty_filter_keeps_everything() {
    let posts = vec![post("a", "A", "draft"), post("b", "B", "published")];
    let filtered = apply_post_filter(posts, &PostFilter::default());
    assert_eq!(filtered.len(), 2);
}

// =============================================================================
// LIVE DATABASE TESTS (require Postgres + `live-db-tests` feature)
// =============================================================================

#[cfg(feature = "live-db-tests")]
mod live {
    use super::*;
    use sqlx::postgres::PgPoolOptions;

    async fn live_pool() -> sqlx::PgPool {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required for live-db-tests");
        let pool = PgPoolOptions::new()
            .max_connections(2)
            .connect(&url)
            .await
            .expect("connect to live database");
        sqlx::migrate!("src/db/migrations")
            .run(&pool)
            .await
            .expect("migrations");
        pool
    }

    #[tokio::test]
    async fn post_crud_roundtrip() {
        let pool = live_pool().await;

        let author = Uuid::new_v4();
        sqlx::query("INSERT INTO users (id, email, name, role) VALUES ($1, $2, $3, 'editor')")
            .bind(author)
            .bind(format!("{author}@test.local"))
            .bind("Roundtrip Editor")
            .execute(&pool)
            .await
            .unwrap();

        let new = NewBlogPost {
            slug: None,
            title_en: format!("Roundtrip {author}"),
            title_ar: String::new(),
            excerpt_en: String::new(),
            excerpt_ar: String::new(),
            body_en: "body".into(),
            body_ar: String::new(),
            cover_image_url: None,
        };
        let created = create_post(&pool, new, author).await.unwrap();

        let listed = list_posts(&pool).await.unwrap();
        assert!(listed.iter().any(|p| p.id == created.id));

        delete_post(&pool, created.id).await.unwrap();
        let listed = list_posts(&pool).await.unwrap();
        assert!(!listed.iter().any(|p| p.id == created.id));

        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(author)
            .execute(&pool)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn publishing_stamps_published_at_once() {
        let pool = live_pool().await;

        let author = Uuid::new_v4();
        sqlx::query("INSERT INTO users (id, email, name, role) VALUES ($1, $2, $3, 'editor')")
            .bind(author)
            .bind(format!("{author}@test.local"))
            .bind("Publish Editor")
            .execute(&pool)
            .await
            .unwrap();

        let new = NewBlogPost {
            slug: Some(format!("publish-{author}")),
            title_en: "Publish me".into(),
            title_ar: String::new(),
            excerpt_en: String::new(),
            excerpt_ar: String::new(),
            body_en: String::new(),
            body_ar: String::new(),
            cover_image_url: None,
        };
        let created = create_post(&pool, new, author).await.unwrap();
        assert!(created.published_at.is_none());

        let patch = BlogPostPatch { status: Some("published".into()), ..BlogPostPatch::default() };
        let published = update_post(&pool, created.id, patch).await.unwrap();
        let stamped = published.published_at.clone().expect("published_at set");

        // A later archive keeps the original stamp.
        let patch = BlogPostPatch { status: Some("archived".into()), ..BlogPostPatch::default() };
        let archived = update_post(&pool, created.id, patch).await.unwrap();
        assert_eq!(archived.published_at.as_deref(), Some(stamped.as_str()));

        delete_post(&pool, created.id).await.unwrap();
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(author)
            .execute(&pool)
            .await
            .unwrap();
    }
}
