//! Cookie relay between the browser and the commerce platform.
//!
//! Inbound `Cookie` headers are forwarded verbatim. Outbound `Set-Cookie`
//! values keep their name, value and lifetime; when the proxy and the
//! store are on different sites the attributes are rewritten to
//! `SameSite=None; Secure` without a `Domain`, so the browser keeps the
//! session cookie on the proxy origin. Cookie values are never logged.

use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use tracing::{debug, warn};

use crate::error::ApiError;

/// Join every inbound `Cookie` header into one upstream header value.
///
/// # Errors
///
/// [`ApiError::MalformedCookies`] when a header is not valid visible ASCII.
pub fn inbound_cookie_header(headers: &HeaderMap) -> Result<Option<String>, ApiError> {
    let mut parts = Vec::new();
    for value in headers.get_all(COOKIE) {
        let value = value.to_str().map_err(|_| ApiError::MalformedCookies)?.trim();
        if !value.is_empty() {
            parts.push(value);
        }
    }
    if parts.is_empty() {
        return Ok(None);
    }
    Ok(Some(parts.join("; ")))
}

/// Cookie names present on the request, for logging.
#[must_use]
pub fn cookie_names(headers: &HeaderMap) -> Vec<String> {
    CookieJar::from_headers(headers)
        .iter()
        .map(|cookie| cookie.name().to_owned())
        .collect()
}

/// Rewrite one upstream `Set-Cookie` value for the browser.
///
/// Unparseable values pass through untouched.
#[must_use]
pub fn normalize_set_cookie(raw: &str, cross_site: bool) -> String {
    if !cross_site {
        return raw.to_owned();
    }
    match Cookie::parse(raw) {
        Ok(mut cookie) => {
            cookie.set_same_site(SameSite::None);
            cookie.set_secure(true);
            cookie.unset_domain();
            cookie.to_string()
        }
        Err(e) => {
            warn!(error = %e, "cookies: passing through unparseable Set-Cookie");
            raw.to_owned()
        }
    }
}

/// Append every upstream cookie to the outgoing response headers.
pub fn relay_set_cookies(headers: &mut HeaderMap, set_cookies: &[String], cross_site: bool) {
    for raw in set_cookies {
        let normalized = normalize_set_cookie(raw, cross_site);
        match HeaderValue::from_str(&normalized) {
            Ok(value) => {
                headers.append(SET_COOKIE, value);
            }
            Err(_) => warn!("cookies: dropped Set-Cookie with invalid header bytes"),
        }
    }
    debug!(count = set_cookies.len(), cross_site, "cookies: relayed");
}

#[cfg(test)]
#[path = "cookies_test.rs"]
mod tests;
