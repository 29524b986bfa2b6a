mod db;
mod rate_limit;
mod routes;
mod scan;
mod services;
mod state;

use std::sync::Arc;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()
        .expect("invalid PORT");

    let pool = db::init_pool(&database_url)
        .await
        .expect("database init failed");

    // Initialize the compliance scan client (non-fatal: scans disabled if config missing).
    let scanner: Option<Arc<dyn scan::ScanBackend>> = match scan::ScanClient::from_env() {
        Ok(client) => {
            tracing::info!(model = client.model(), "compliance scan client initialized");
            Some(Arc::new(client))
        }
        Err(e) => {
            tracing::warn!(error = %e, "scan provider not configured — compliance scans disabled");
            None
        }
    };

    // Email delivery config (non-fatal: login codes and newsletter sends disabled if missing).
    let email = state::EmailConfig::from_env();
    if email.is_none() {
        tracing::warn!("RESEND_API_KEY / EMAIL_FROM not set — outbound email disabled");
    }

    let state = state::AppState::new(pool, scanner, email);

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(%port, "baraka-cms listening");
    axum::serve(listener, app).await.expect("server failed");
}
