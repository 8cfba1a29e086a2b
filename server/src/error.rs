//! HTTP error mapping.
//!
//! Every failure leaves the proxy as a structured JSON body, never as a
//! raw upstream page:
//!
//! `{ "success": false, "message", "code", "retryable", "statusCode"?, "details"? }`
//!
//! `statusCode` carries the upstream status when the platform answered
//! with one, so callers can tell a store outage from a proxy fault.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use messages::ErrorCode;
use serde_json::{Value, json};

use crate::commerce::CommerceError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("productId is required")]
    MissingProductId,
    #[error("productId must be a positive integer, got {0:?}")]
    InvalidProductId(String),
    #[error("quantity must be a positive integer, got {0:?}")]
    InvalidQuantity(String),
    #[error("cookie header is not valid ASCII")]
    MalformedCookies,
    #[error(transparent)]
    Commerce(#[from] CommerceError),
}

impl ErrorCode for ApiError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::MissingProductId => "E_MISSING_PRODUCT_ID",
            Self::InvalidProductId(_) => "E_INVALID_PRODUCT_ID",
            Self::InvalidQuantity(_) => "E_INVALID_QUANTITY",
            Self::MalformedCookies => "E_MALFORMED_COOKIES",
            Self::Commerce(e) => e.error_code(),
        }
    }

    fn retryable(&self) -> bool {
        match self {
            Self::Commerce(e) => e.retryable(),
            _ => false,
        }
    }
}

impl ApiError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingProductId | Self::InvalidProductId(_) | Self::InvalidQuantity(_) | Self::MalformedCookies => {
                StatusCode::BAD_REQUEST
            }
            Self::Commerce(CommerceError::Timeout { .. }) => StatusCode::GATEWAY_TIMEOUT,
            Self::Commerce(CommerceError::Rejected { .. }) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Commerce(CommerceError::HttpClientBuild(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Commerce(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// The JSON error body.
    #[must_use]
    pub fn body(&self) -> Value {
        let mut body = json!({
            "success": false,
            "message": self.to_string(),
            "code": self.error_code(),
            "retryable": self.retryable(),
        });
        match self {
            Self::Commerce(CommerceError::Status { status, body: parsed, snippet, .. }) => {
                body["statusCode"] = json!(status);
                body["details"] = parsed.clone().unwrap_or_else(|| json!(snippet));
            }
            Self::Commerce(CommerceError::NotJson { snippet }) => body["details"] = json!(snippet),
            Self::Commerce(CommerceError::Rejected { body: details, .. }) => body["details"] = details.clone(),
            _ => {}
        }
        body
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status().is_server_error() {
            tracing::warn!(code = self.error_code(), error = %self, "api: upstream failure");
        } else {
            tracing::debug!(code = self.error_code(), error = %self, "api: request rejected");
        }
        (self.status(), Json(self.body())).into_response()
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
