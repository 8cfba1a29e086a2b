//! Commerce platform adapter.
//!
//! DESIGN
//! ======
//! Handlers talk to the platform only through [`CommerceClient`], so route
//! tests run against an in-memory double while production uses
//! [`woo::WooClient`] over reqwest. Every call carries the caller's cookie
//! header through untouched and hands every upstream `Set-Cookie` back; the
//! adapter keeps no cookie state between calls.

pub mod parse;
pub mod types;
pub mod woo;

use async_trait::async_trait;
use messages::ProductId;

pub use types::{CommerceError, UpstreamReply};

pub const ACTION_ADD_TO_CART: &str = "add_to_cart";
pub const ACTION_GET_CART_TOTALS: &str = "get_cart_totals";
pub const ACTION_GET_REFRESHED_FRAGMENTS: &str = "get_refreshed_fragments";

/// The platform's AJAX cart endpoints.
#[async_trait]
pub trait CommerceClient: Send + Sync {
    /// `wc-ajax=add_to_cart`.
    async fn add_to_cart(
        &self,
        product_id: ProductId,
        quantity: u32,
        cookies: Option<&str>,
    ) -> Result<UpstreamReply, CommerceError>;

    /// `wc-ajax=get_cart_totals`.
    async fn cart_totals(&self, cookies: Option<&str>) -> Result<UpstreamReply, CommerceError>;

    /// `wc-ajax=get_refreshed_fragments`.
    async fn refreshed_fragments(&self, cookies: Option<&str>) -> Result<UpstreamReply, CommerceError>;
}
