//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! Three surfaces share one Axum router: the session-authed admin API under
//! `/api/admin`, the login flow under `/api/auth`, and the unauthenticated
//! public read surface under `/api/public` that the marketing pages consume.

pub mod analytics;
pub mod auth;
pub mod banners;
pub mod blocks;
pub mod compliance;
pub mod content;
pub mod newsletters;
pub mod pages;
pub mod public;
pub mod team;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the application router.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Login flow.
        .route("/api/auth/request-code", post(auth::request_code))
        .route("/api/auth/verify-code", post(auth::verify_code))
        .route("/api/auth/me", get(auth::me))
        .route("/api/auth/logout", post(auth::logout))
        // Admin: blog posts and stories.
        .route("/api/admin/posts", get(content::list_posts).post(content::create_post))
        .route(
            "/api/admin/posts/{id}",
            get(content::get_post)
                .patch(content::update_post)
                .delete(content::delete_post),
        )
        .route("/api/admin/stories", get(content::list_stories).post(content::create_story))
        .route(
            "/api/admin/stories/{id}",
            get(content::get_story)
                .patch(content::update_story)
                .delete(content::delete_story),
        )
        // Admin: promotional banners.
        .route(
            "/api/admin/spotlights",
            get(banners::list_spotlights).post(banners::create_spotlight),
        )
        .route(
            "/api/admin/spotlights/{id}",
            get(banners::get_spotlight)
                .patch(banners::update_spotlight)
                .delete(banners::delete_spotlight),
        )
        .route("/api/admin/ctas", get(banners::list_ctas).post(banners::create_cta))
        .route(
            "/api/admin/ctas/{id}",
            get(banners::get_cta)
                .patch(banners::update_cta)
                .delete(banners::delete_cta),
        )
        .route(
            "/api/admin/install-banners",
            get(banners::list_install_banners).post(banners::create_install_banner),
        )
        .route(
            "/api/admin/install-banners/{id}",
            get(banners::get_install_banner)
                .patch(banners::update_install_banner)
                .delete(banners::delete_install_banner),
        )
        // Admin: discovery pages.
        .route(
            "/api/admin/crypto-pages",
            get(pages::list_crypto_pages).post(pages::create_crypto_page),
        )
        .route(
            "/api/admin/crypto-pages/{id}",
            get(pages::get_crypto_page)
                .patch(pages::update_crypto_page)
                .delete(pages::delete_crypto_page),
        )
        .route(
            "/api/admin/bond-pages",
            get(pages::list_bond_pages).post(pages::create_bond_page),
        )
        .route(
            "/api/admin/bond-pages/{id}",
            get(pages::get_bond_page)
                .patch(pages::update_bond_page)
                .delete(pages::delete_bond_page),
        )
        // Admin: team management.
        .route("/api/admin/team", get(team::list_members).post(team::create_member))
        .route("/api/admin/team/{id}", get(team::get_member).patch(team::update_member))
        // Admin: block library.
        .route(
            "/api/admin/block-definitions",
            get(blocks::list_definitions).post(blocks::create_definition),
        )
        .route(
            "/api/admin/block-definitions/{id}",
            get(blocks::get_definition)
                .patch(blocks::update_definition)
                .delete(blocks::delete_definition),
        )
        .route(
            "/api/admin/newsletter-templates",
            get(blocks::list_templates).post(blocks::create_template),
        )
        .route(
            "/api/admin/newsletter-templates/{id}",
            get(blocks::get_template)
                .patch(blocks::update_template)
                .delete(blocks::delete_template),
        )
        // Admin: newsletters and subscribers.
        .route(
            "/api/admin/newsletters",
            get(newsletters::list_newsletters).post(newsletters::create_newsletter),
        )
        .route(
            "/api/admin/newsletters/{id}",
            get(newsletters::get_newsletter)
                .patch(newsletters::update_newsletter)
                .delete(newsletters::delete_newsletter),
        )
        .route(
            "/api/admin/newsletters/{id}/blocks",
            get(newsletters::list_issue_blocks).put(newsletters::set_issue_blocks),
        )
        .route("/api/admin/newsletters/{id}/resolved", get(newsletters::resolved))
        .route("/api/admin/newsletters/{id}/preview", get(newsletters::preview))
        .route("/api/admin/newsletters/{id}/send", post(newsletters::send))
        .route(
            "/api/admin/subscribers",
            get(newsletters::list_subscribers).post(newsletters::create_subscriber),
        )
        .route("/api/admin/subscribers/{id}", delete(newsletters::delete_subscriber))
        .route("/api/admin/subscribers/export.jsonl", get(newsletters::export_subscribers_jsonl))
        // Admin: compliance and analytics.
        .route(
            "/api/admin/compliance/scans",
            get(compliance::list_scans).post(compliance::create_scan),
        )
        .route("/api/admin/compliance/scans/{id}", get(compliance::get_scan))
        .route("/api/admin/analytics/summary", get(analytics::summary))
        // Public surface.
        .route("/api/public/blog", get(public::list_blog))
        .route("/api/public/blog/{slug}", get(public::get_blog_post))
        .route("/api/public/stories", get(public::list_stories))
        .route("/api/public/spotlights", get(public::list_spotlights))
        .route("/api/public/ctas", get(public::list_ctas))
        .route("/api/public/install-banners", get(public::list_install_banners))
        .route("/api/public/crypto", get(public::list_crypto))
        .route("/api/public/crypto/{slug}", get(public::get_crypto))
        .route("/api/public/bonds", get(public::list_bonds))
        .route("/api/public/bonds/{slug}", get(public::get_bond))
        .route("/api/public/subscribe", post(public::subscribe))
        .route("/api/public/unsubscribe", post(public::unsubscribe))
        .route("/api/public/events", post(public::record_event))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}
