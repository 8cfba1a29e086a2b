//! WooCommerce AJAX client.
//!
//! Requests go to `{store}/?wc-ajax=<action>` as form posts and announce
//! themselves as XHR so the platform answers with JSON instead of a page.

use async_trait::async_trait;
use reqwest::header::{ACCEPT, COOKIE, ORIGIN, REFERER, SET_COOKIE, USER_AGENT};
use tracing::{debug, warn};

use messages::{Origin, ProductId};

use super::parse::{parse_error_body, parse_permissive, snippet};
use super::types::{CommerceError, UpstreamReply};
use super::{ACTION_ADD_TO_CART, ACTION_GET_CART_TOTALS, ACTION_GET_REFRESHED_FRAGMENTS, CommerceClient};
use crate::config::{ProxyConfig, UpstreamTimeouts};

const AJAX_ACCEPT: &str = "application/json, text/javascript, */*; q=0.01";

pub struct WooClient {
    http: reqwest::Client,
    store: Origin,
    timeouts: UpstreamTimeouts,
}

impl WooClient {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &ProxyConfig) -> Result<Self, CommerceError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeouts.request)
            .connect_timeout(config.timeouts.connect)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| CommerceError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, store: config.store_url.clone(), timeouts: config.timeouts })
    }

    async fn call(&self, action: &str, form: &[(&str, String)], cookies: Option<&str>) -> Result<UpstreamReply, CommerceError> {
        let url = format!("{}/?wc-ajax={action}", self.store);
        let mut request = self
            .http
            .post(&url)
            .header(ACCEPT, AJAX_ACCEPT)
            .header("X-Requested-With", "XMLHttpRequest")
            .header(ORIGIN, self.store.as_str())
            .header(REFERER, format!("{}/", self.store))
            .form(form);
        if let Some(cookies) = cookies.filter(|c| !c.is_empty()) {
            request = request.header(COOKIE, cookies);
        }

        debug!(action, with_cookies = cookies.is_some(), "woo: request");
        let response = request.send().await.map_err(|e| self.map_transport(action, &e))?;

        let status = response.status().as_u16();
        let set_cookies: Vec<String> = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .map(str::to_owned)
            .collect();
        let text = response.text().await.map_err(|e| self.map_transport(action, &e))?;

        if !(200..300).contains(&status) {
            warn!(action, status, body = %snippet(&text), "woo: upstream error status");
            return Err(CommerceError::Status {
                status,
                body: parse_error_body(&text),
                snippet: snippet(&text),
                set_cookies,
            });
        }

        let body = parse_permissive(&text).inspect_err(|_| {
            warn!(action, body = %snippet(&text), "woo: response is not JSON");
        })?;
        if body.get("error").and_then(serde_json::Value::as_bool) == Some(true) {
            debug!(action, "woo: platform rejected the request");
            return Err(CommerceError::Rejected { body, set_cookies });
        }

        debug!(action, status, cookies = set_cookies.len(), "woo: response");
        Ok(UpstreamReply { body, set_cookies })
    }

    fn map_transport(&self, action: &str, e: &reqwest::Error) -> CommerceError {
        if e.is_timeout() {
            warn!(action, timeout_secs = self.timeouts.request.as_secs(), "woo: upstream timed out");
            return CommerceError::Timeout { secs: self.timeouts.request.as_secs() };
        }
        warn!(action, error = %e, "woo: upstream unreachable");
        CommerceError::Unreachable(e.to_string())
    }
}

#[async_trait]
impl CommerceClient for WooClient {
    async fn add_to_cart(
        &self,
        product_id: ProductId,
        quantity: u32,
        cookies: Option<&str>,
    ) -> Result<UpstreamReply, CommerceError> {
        let form = [("product_id", product_id.to_string()), ("quantity", quantity.to_string())];
        self.call(ACTION_ADD_TO_CART, &form, cookies).await
    }

    async fn cart_totals(&self, cookies: Option<&str>) -> Result<UpstreamReply, CommerceError> {
        self.call(ACTION_GET_CART_TOTALS, &[], cookies).await
    }

    async fn refreshed_fragments(&self, cookies: Option<&str>) -> Result<UpstreamReply, CommerceError> {
        self.call(ACTION_GET_REFRESHED_FRAGMENTS, &[], cookies).await
    }
}

#[cfg(test)]
#[path = "woo_test.rs"]
mod tests;
