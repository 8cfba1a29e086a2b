mod commerce;
mod config;
mod cookies;
mod error;
mod routes;
mod state;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tower_http=info")))
        .init();

    let config = config::ProxyConfig::from_env().expect("invalid proxy configuration");
    let commerce = commerce::woo::WooClient::new(&config).expect("http client init failed");

    tracing::info!(
        store = %config.store_url,
        allowed = config.allowed_origins.origins().len(),
        cross_site_cookies = config.cookie_cross_site,
        timeout_secs = config.timeouts.request.as_secs(),
        "cart proxy configured"
    );

    let port = config.port;
    let state = state::AppState::new(config, Arc::new(commerce));
    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(%port, "cartrelay listening");
    axum::serve(listener, app).await.expect("server failed");
}
