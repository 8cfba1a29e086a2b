//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! The proxy sits between the embedded recipe app and the commerce
//! platform. Browsers on allow-listed origins call it with credentials;
//! every other origin gets no CORS grant.

pub mod cart;
pub mod catalog;

use axum::Router;
use axum::http::header::{ACCEPT, CONTENT_TYPE};
use axum::http::{HeaderValue, Method, StatusCode};
use axum::routing::{get, post};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Credentialed CORS for the configured origins only.
fn cors(state: &AppState) -> CorsLayer {
    let origins: Vec<HeaderValue> = state
        .config
        .allowed_origins
        .origins()
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin.as_str()).ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, ACCEPT])
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/add-to-cart", post(cart::add_to_cart))
        .route("/cart/get", get(cart::get_cart))
        .route("/cart/fragments", post(cart::refresh_fragments))
        .route("/spices", get(catalog::list_spices))
        .route("/spices/{id}", get(catalog::get_spice))
        .route("/healthz", get(healthz))
        .layer(cors(&state))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
