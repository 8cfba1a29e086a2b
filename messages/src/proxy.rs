//! [`CartBackend`] over the cart relay proxy.
//!
//! The storefront page hands each mutation to the proxy's HTTP surface
//! (`POST /add-to-cart`, `POST /cart/fragments`) with the store session in
//! the `Cookie` header. Cookies the proxy relays back are folded into the
//! session so the next call continues the same cart.
//!
//! Status mapping: 504 is a timeout, other 4xx are rejections carrying the
//! proxy's `message`, everything else non-2xx means the store is
//! unavailable.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::{COOKIE, SET_COOKIE};
use serde_json::Value;
use tracing::{debug, warn};

use crate::bridge::{BackendError, CartBackend};
use crate::fragments::CartFragments;
use crate::message::ProductId;
use crate::origin::Origin;

pub const DEFAULT_BACKEND_TIMEOUT: Duration = Duration::from_secs(10);

pub struct ProxyBackend {
    http: reqwest::Client,
    base: Origin,
    session: Mutex<Option<String>>,
}

impl ProxyBackend {
    /// # Errors
    ///
    /// [`BackendError::Unavailable`] if the HTTP client cannot be built.
    pub fn new(base: Origin, timeout: Duration) -> Result<Self, BackendError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BackendError::Unavailable(e.to_string()))?;
        Ok(Self { http, base, session: Mutex::new(None) })
    }

    /// Start from an existing store session (`name=value; ...`).
    #[must_use]
    pub fn with_session(self, cookie: impl Into<String>) -> Self {
        *self.session.lock().unwrap_or_else(PoisonError::into_inner) = Some(cookie.into());
        self
    }

    #[must_use]
    pub fn session(&self) -> Option<String> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    async fn post(&self, path: &str, form: &[(&str, String)]) -> Result<Value, BackendError> {
        let url = format!("{}{path}", self.base);
        let mut request = self.http.post(&url).form(form);
        if let Some(cookie) = self.session() {
            request = request.header(COOKIE, cookie);
        }

        let response = request.send().await.map_err(map_transport)?;
        let status = response.status();
        let set_cookies: Vec<String> = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .map(str::to_owned)
            .collect();
        self.absorb(&set_cookies);

        let body: Value = response.json().await.unwrap_or(Value::Null);
        if status.is_success() {
            return Ok(body);
        }
        let message = body
            .get("message")
            .and_then(Value::as_str)
            .map_or_else(|| format!("proxy returned HTTP {}", status.as_u16()), str::to_owned);
        warn!(%url, status = status.as_u16(), %message, "proxy backend: request failed");
        Err(match status {
            StatusCode::GATEWAY_TIMEOUT => BackendError::Timeout,
            s if s.is_client_error() => BackendError::Rejected(message),
            _ => BackendError::Unavailable(message),
        })
    }

    fn absorb(&self, set_cookies: &[String]) {
        if set_cookies.is_empty() {
            return;
        }
        let mut session = self.session.lock().unwrap_or_else(PoisonError::into_inner);
        let merged = merge_session(session.as_deref(), set_cookies);
        debug!(relayed = set_cookies.len(), "proxy backend: session updated");
        *session = Some(merged);
    }
}

#[async_trait]
impl CartBackend for ProxyBackend {
    async fn add_to_cart(&self, product_id: ProductId, quantity: u32) -> Result<CartFragments, BackendError> {
        let form = [("productId", product_id.to_string()), ("quantity", quantity.to_string())];
        let body = self.post("/add-to-cart", &form).await?;
        let mut fragments = body.get("cartData").map(CartFragments::from_platform).unwrap_or_default();
        if fragments.cart_count.is_none() {
            fragments.cart_count = body.get("count").and_then(Value::as_u64).and_then(|n| u32::try_from(n).ok());
        }
        Ok(fragments)
    }

    async fn refresh(&self) -> Result<CartFragments, BackendError> {
        let body = self.post("/cart/fragments", &[]).await?;
        match body.get("fragments").cloned().map(serde_json::from_value::<CartFragments>) {
            Some(Ok(fragments)) => Ok(fragments),
            _ => Ok(body.get("data").map(CartFragments::from_platform).unwrap_or_default()),
        }
    }
}

fn map_transport(e: reqwest::Error) -> BackendError {
    if e.is_timeout() { BackendError::Timeout } else { BackendError::Unavailable(e.to_string()) }
}

/// Fold `Set-Cookie` values into a `Cookie` header. Later values replace
/// earlier ones with the same name; attributes are dropped.
pub(crate) fn merge_session(current: Option<&str>, set_cookies: &[String]) -> String {
    let mut pairs: Vec<(String, String)> = current
        .unwrap_or_default()
        .split(';')
        .filter_map(split_pair)
        .collect();
    for raw in set_cookies {
        let Some((name, value)) = raw.split(';').next().and_then(split_pair) else {
            continue;
        };
        match pairs.iter_mut().find(|(n, _)| *n == name) {
            Some(pair) => pair.1 = value,
            None => pairs.push((name, value)),
        }
    }
    pairs
        .iter()
        .map(|(name, value)| format!("{name}={value}"))
        .collect::<Vec<_>>()
        .join("; ")
}

fn split_pair(raw: &str) -> Option<(String, String)> {
    let (name, value) = raw.trim().split_once('=')?;
    let name = name.trim();
    (!name.is_empty()).then(|| (name.to_owned(), value.trim().to_owned()))
}

#[cfg(test)]
#[path = "proxy_test.rs"]
mod tests;
