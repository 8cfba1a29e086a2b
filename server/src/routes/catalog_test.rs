use super::*;
use std::sync::Arc;

use axum::body::{Body, to_bytes};
use axum::http::Request;
use serde_json::Value;
use tower::ServiceExt;

use crate::state::test_helpers::{MockCommerce, MockMode, test_app_state};

async fn get(uri: &str) -> (StatusCode, Value) {
    let app = crate::routes::app(test_app_state(Arc::new(MockCommerce::new(MockMode::Healthy))));
    let response = app.oneshot(Request::get(uri).body(Body::empty()).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn list_returns_whole_catalog() {
    let (status, body) = get("/spices").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["spices"].as_array().unwrap().len(), catalog::catalog().len());
}

#[tokio::test]
async fn single_spice_by_id() {
    let (status, body) = get("/spices/16").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Kura Lover");
    assert_eq!(body["add_to_cart_url"], "/?add-to-cart=16");
}

#[tokio::test]
async fn unknown_spice_is_404() {
    let (status, body) = get("/spices/1").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "E_NOT_FOUND");
}
