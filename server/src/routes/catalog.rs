//! Read-only spice catalog routes.

use axum::extract::Path;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use messages::ProductId;
use messages::catalog::{self, Product};
use serde::Serialize;
use serde_json::json;

#[derive(Serialize)]
pub struct SpicesResponse {
    pub spices: &'static [Product],
}

/// `GET /spices`
pub async fn list_spices() -> Json<SpicesResponse> {
    Json(SpicesResponse { spices: catalog::catalog() })
}

/// `GET /spices/{id}`
pub async fn get_spice(Path(id): Path<ProductId>) -> Response {
    match catalog::find(id) {
        Some(product) => Json(product).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "success": false,
                "message": format!("no spice with id {id}"),
                "code": "E_NOT_FOUND",
                "retryable": false,
            })),
        )
            .into_response(),
    }
}

#[cfg(test)]
#[path = "catalog_test.rs"]
mod tests;
