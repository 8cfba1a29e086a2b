//! Upstream reply and error types.

use messages::ErrorCode;
use serde_json::Value;

/// Parsed upstream body plus every `Set-Cookie` header, in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamReply {
    pub body: Value,
    pub set_cookies: Vec<String>,
}

/// Errors produced by commerce platform calls.
#[derive(Debug, thiserror::Error)]
pub enum CommerceError {
    /// No response within the configured deadline.
    #[error("the store did not respond within {secs}s")]
    Timeout { secs: u64 },

    /// Connection refused, DNS failure, reset.
    #[error("could not reach the store: {0}")]
    Unreachable(String),

    /// The platform answered with a non-success status. Cookies it set on
    /// the way are kept so the session survives the error.
    #[error("the store answered with HTTP {status}")]
    Status { status: u16, body: Option<Value>, snippet: String, set_cookies: Vec<String> },

    /// Neither strict nor permissive parsing found JSON in the body.
    #[error("the store returned a non-JSON response")]
    NotJson { snippet: String },

    /// The platform reported `{"error": true}`, e.g. out of stock.
    #[error("the store refused the request")]
    Rejected { body: Value, set_cookies: Vec<String> },

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl CommerceError {
    /// `Set-Cookie` headers the platform sent along with the failure.
    #[must_use]
    pub fn set_cookies(&self) -> &[String] {
        match self {
            Self::Status { set_cookies, .. } | Self::Rejected { set_cookies, .. } => set_cookies,
            _ => &[],
        }
    }
}

impl ErrorCode for CommerceError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Timeout { .. } => "E_UPSTREAM_TIMEOUT",
            Self::Unreachable(_) => "E_UPSTREAM_UNREACHABLE",
            Self::Status { .. } => "E_UPSTREAM_STATUS",
            Self::NotJson { .. } => "E_UPSTREAM_NOT_JSON",
            Self::Rejected { .. } => "E_REJECTED",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
        }
    }

    fn retryable(&self) -> bool {
        matches!(
            self,
            Self::Timeout { .. } | Self::Unreachable(_) | Self::Status { status: 429 | 500..=599, .. }
        )
    }
}
