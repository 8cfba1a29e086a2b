//! Cart proxy routes.
//!
//! The browser cannot attach the store's session cookies to a cross-site
//! request, so these handlers carry them: inbound `Cookie` goes upstream,
//! upstream `Set-Cookie` comes back on the response. Nothing is cached.

use axum::Form;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Json, Response};
use messages::fragments::{derive_count, derive_total};
use messages::message::DEFAULT_QUANTITY;
use messages::{CartFragments, ErrorCode, ProductId};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use crate::commerce::CommerceError;
use crate::cookies::{cookie_names, inbound_cookie_header, relay_set_cookies};
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct AddToCartForm {
    #[serde(rename = "productId")]
    pub product_id: Option<String>,
    pub quantity: Option<String>,
}

impl AddToCartForm {
    /// Validate before any network call.
    ///
    /// # Errors
    ///
    /// Missing or non-positive `productId`, or a non-positive `quantity`.
    pub fn validate(&self) -> Result<(ProductId, u32), ApiError> {
        let raw_id = self.product_id.as_deref().map(str::trim).unwrap_or_default();
        if raw_id.is_empty() {
            return Err(ApiError::MissingProductId);
        }
        let product_id = raw_id
            .parse::<ProductId>()
            .ok()
            .filter(|id| *id > 0)
            .ok_or_else(|| ApiError::InvalidProductId(raw_id.to_owned()))?;

        let quantity = match self.quantity.as_deref().map(str::trim) {
            None | Some("") => DEFAULT_QUANTITY,
            Some(raw) => raw
                .parse::<u32>()
                .ok()
                .filter(|q| *q > 0)
                .ok_or_else(|| ApiError::InvalidQuantity(raw.to_owned()))?,
        };
        Ok((product_id, quantity))
    }
}

/// `POST /add-to-cart` with form `productId`, `quantity`.
pub async fn add_to_cart(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<AddToCartForm>,
) -> Result<Response, ApiError> {
    let (product_id, quantity) = form.validate()?;
    let cookies = inbound_cookie_header(&headers)?;
    info!(product_id, quantity, cookies = ?cookie_names(&headers), "cart: add");

    let cross_site = state.config.cookie_cross_site;
    let reply = match state.commerce.add_to_cart(product_id, quantity, cookies.as_deref()).await {
        Ok(reply) => reply,
        Err(e) => return Ok(failure(e, cross_site)),
    };

    let mut set_cookies = reply.set_cookies;
    let mut count = derive_count(&reply.body);
    if count.is_none() {
        match state.commerce.refreshed_fragments(cookies.as_deref()).await {
            Ok(refreshed) => {
                count = derive_count(&refreshed.body);
                set_cookies.extend(refreshed.set_cookies);
            }
            Err(e) => warn!(product_id, error = %e, "cart: count refresh failed"),
        }
    }
    info!(product_id, ?count, "cart: added");

    let body = json!({
        "success": true,
        "message": "Product added to cart",
        "productId": product_id,
        "quantity": quantity,
        "cartData": reply.body,
        "count": count,
    });
    let mut response = Json(body).into_response();
    relay_set_cookies(response.headers_mut(), &set_cookies, cross_site);
    Ok(response)
}

/// `GET /cart/get`. Degrades to a zero cart on any upstream failure.
pub async fn get_cart(State(state): State<AppState>, headers: HeaderMap) -> Result<Response, ApiError> {
    let cookies = inbound_cookie_header(&headers)?;
    let empty_total = state.config.empty_cart_total.as_str();

    match state.commerce.cart_totals(cookies.as_deref()).await {
        Ok(reply) => {
            let count = derive_count(&reply.body).unwrap_or(0);
            let total = derive_total(&reply.body).unwrap_or_else(|| empty_total.to_owned());
            let body = json!({ "success": true, "count": count, "total": total, "data": reply.body });
            let mut response = Json(body).into_response();
            relay_set_cookies(response.headers_mut(), &reply.set_cookies, state.config.cookie_cross_site);
            Ok(response)
        }
        Err(e) => {
            warn!(code = e.error_code(), error = %e, "cart: totals failed, serving empty cart");
            let mut response = Json(json!({
                "success": false,
                "count": 0,
                "total": empty_total,
                "data": {},
                "error": e.to_string(),
                "code": e.error_code(),
                "retryable": e.retryable(),
            }))
            .into_response();
            relay_set_cookies(response.headers_mut(), e.set_cookies(), state.config.cookie_cross_site);
            Ok(response)
        }
    }
}

/// `POST /cart/fragments`: refreshed fragments for the storefront bridge.
pub async fn refresh_fragments(State(state): State<AppState>, headers: HeaderMap) -> Result<Response, ApiError> {
    let cookies = inbound_cookie_header(&headers)?;
    let cross_site = state.config.cookie_cross_site;
    let reply = match state.commerce.refreshed_fragments(cookies.as_deref()).await {
        Ok(reply) => reply,
        Err(e) => return Ok(failure(e, cross_site)),
    };

    let fragments = CartFragments::from_platform(&reply.body);
    let body = json!({
        "success": true,
        "count": fragments.cart_count,
        "fragments": fragments,
        "data": reply.body,
    });
    let mut response = Json(body).into_response();
    relay_set_cookies(response.headers_mut(), &reply.set_cookies, cross_site);
    Ok(response)
}

/// Structured error response. Cookies set by a failing platform reply are
/// still relayed so the session survives.
fn failure(e: CommerceError, cross_site: bool) -> Response {
    let set_cookies = e.set_cookies().to_vec();
    let mut response = ApiError::from(e).into_response();
    relay_set_cookies(response.headers_mut(), &set_cookies, cross_site);
    response
}

#[cfg(test)]
#[path = "cart_test.rs"]
mod tests;
