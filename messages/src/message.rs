//! Wire messages exchanged between the embedded client and the storefront.
//!
//! DESIGN
//! ======
//! JSON objects discriminated by a `type` tag from a closed set. Decoding
//! distinguishes "unknown tag" (a newer sender, ignored) from "known tag
//! with a bad shape" (dropped and logged), so the channel stays
//! forward-compatible without swallowing real bugs.
//!
//! Results correlate to requests by an opaque [`RequestId`] minted per
//! request, never by `productId`: two in-flight adds of the same product
//! must resolve independently.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::fragments::CartFragments;

/// Commerce-platform product identifier. The join key for every cart call.
pub type ProductId = u64;

pub const DEFAULT_QUANTITY: u32 = 1;

pub const TAG_ADD_TO_CART: &str = "addToCart";
pub const TAG_ADD_TO_CART_RESPONSE: &str = "addToCartResponse";
pub const TAG_CART_UPDATED: &str = "cartUpdated";
pub const TAG_TOGGLE_CART: &str = "toggleCart";

const KNOWN_TAGS: [&str; 4] = [TAG_ADD_TO_CART, TAG_ADD_TO_CART_RESPONSE, TAG_CART_UPDATED, TAG_TOGGLE_CART];

// =============================================================================
// CORRELATION
// =============================================================================

/// Opaque per-request correlation token carried through the round trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// =============================================================================
// PAYLOADS
// =============================================================================

fn default_quantity() -> u32 {
    DEFAULT_QUANTITY
}

/// Payload of an `addToCart` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCart {
    pub product_id: ProductId,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    /// Absent only when the sender predates correlation tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<RequestId>,
}

/// Payload of an `addToCartResponse`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartOutcome {
    pub product_id: ProductId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<RequestId>,
    /// Cart snapshot after the mutation, when the storefront has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fragments: Option<CartFragments>,
    /// User-facing failure text when `success` is false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A completed add-to-cart attempt as seen by the requester.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartAddResult {
    pub success: bool,
    pub payload: AddToCartOutcome,
}

/// Intent for the slide-out cart panel. `show` defaults to open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TogglePayload {
    #[serde(default = "default_show")]
    pub show: bool,
}

fn default_show() -> bool {
    true
}

impl Default for TogglePayload {
    fn default() -> Self {
        Self { show: true }
    }
}

// =============================================================================
// MESSAGE
// =============================================================================

/// The closed set of cross-origin cart messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Message {
    #[serde(rename = "addToCart")]
    AddToCart { payload: AddToCart },
    #[serde(rename = "addToCartResponse")]
    AddToCartResponse(CartAddResult),
    #[serde(rename = "cartUpdated")]
    CartUpdated { payload: CartFragments },
    #[serde(rename = "toggleCart")]
    ToggleCart {
        #[serde(default)]
        payload: TogglePayload,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("message has no string `type` tag")]
    MissingType,
    #[error("unknown message type `{0}`")]
    UnknownType(String),
    #[error("malformed `{tag}` message: {source}")]
    Malformed {
        tag: String,
        #[source]
        source: serde_json::Error,
    },
}

impl Message {
    #[must_use]
    pub fn add_to_cart(product_id: ProductId, quantity: u32, request_id: RequestId) -> Self {
        Self::AddToCart { payload: AddToCart { product_id, quantity, request_id: Some(request_id) } }
    }

    #[must_use]
    pub fn succeeded(request: &AddToCart, fragments: Option<CartFragments>) -> Self {
        Self::AddToCartResponse(CartAddResult {
            success: true,
            payload: AddToCartOutcome {
                product_id: request.product_id,
                request_id: request.request_id,
                fragments,
                error: None,
            },
        })
    }

    #[must_use]
    pub fn failed(request: &AddToCart, error: impl Into<String>) -> Self {
        Self::AddToCartResponse(CartAddResult {
            success: false,
            payload: AddToCartOutcome {
                product_id: request.product_id,
                request_id: request.request_id,
                fragments: None,
                error: Some(error.into()),
            },
        })
    }

    #[must_use]
    pub fn cart_updated(fragments: CartFragments) -> Self {
        Self::CartUpdated { payload: fragments }
    }

    #[must_use]
    pub fn toggle_cart(show: bool) -> Self {
        Self::ToggleCart { payload: TogglePayload { show } }
    }

    /// The wire `type` tag of this message.
    #[must_use]
    pub fn tag(&self) -> &'static str {
        match self {
            Self::AddToCart { .. } => TAG_ADD_TO_CART,
            Self::AddToCartResponse(_) => TAG_ADD_TO_CART_RESPONSE,
            Self::CartUpdated { .. } => TAG_CART_UPDATED,
            Self::ToggleCart { .. } => TAG_TOGGLE_CART,
        }
    }

    /// Decode an inbound `event.data` value.
    ///
    /// # Errors
    ///
    /// [`DecodeError::UnknownType`] for tags outside the closed set, so
    /// callers can ignore them quietly; [`DecodeError::Malformed`] when a
    /// known tag carries the wrong shape.
    pub fn decode(data: &Value) -> Result<Self, DecodeError> {
        let Some(tag) = data.get("type").and_then(Value::as_str) else {
            return Err(DecodeError::MissingType);
        };
        if !KNOWN_TAGS.contains(&tag) {
            return Err(DecodeError::UnknownType(tag.to_owned()));
        }
        serde_json::from_value(data.clone()).map_err(|source| DecodeError::Malformed { tag: tag.to_owned(), source })
    }
}

#[cfg(test)]
#[path = "message_test.rs"]
mod tests;
