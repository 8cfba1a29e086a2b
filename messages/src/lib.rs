//! Cross-origin cart protocol shared by the embedded client, the storefront
//! bridge, and the proxy server.
//!
//! ARCHITECTURE
//! ============
//! The embedded recipe app and the storefront page live on different
//! origins. The app asks the storefront to mutate its session-bound cart by
//! posting a [`Message`] to the parent window; the storefront performs the
//! mutation (through the proxy or directly) and posts the outcome back.
//!
//! - [`origin`]: typed origins and the allow-list used on send and receive.
//! - [`message`]: the closed set of wire messages.
//! - [`channel`]: `postMessage` seam. Explicit target origin out, origin
//!   check before decode in.
//! - [`pending`] / [`requester`]: per-request correlation tokens and
//!   bounded waits.
//! - [`events`] / [`reconcile`]: typed publish/subscribe bus and badge /
//!   panel reconciliation.
//! - [`client`] / [`bridge`]: the two ends of the protocol; [`proxy`] is
//!   the bridge's HTTP backend.
//! - [`button`]: per-product control state.
//! - [`fragments`], [`catalog`], [`analysis`]: data shared with the proxy
//!   and the recipe UI.

pub mod analysis;
pub mod bridge;
pub mod button;
pub mod catalog;
pub mod channel;
pub mod client;
pub mod events;
pub mod fragments;
pub mod message;
pub mod origin;
pub mod pending;
pub mod proxy;
pub mod reconcile;
pub mod requester;

#[cfg(test)]
pub(crate) mod testing;

pub use bridge::{BackendError, CartBackend, StorefrontBridge};
pub use channel::{Channel, MessageEvent, Transport, TransportError};
pub use client::EmbeddedClient;
pub use events::{CartEvent, EventBus};
pub use fragments::CartFragments;
pub use message::{AddToCart, AddToCartOutcome, CartAddResult, Message, ProductId, RequestId};
pub use origin::{Origin, OriginError, OriginPolicy};
pub use proxy::ProxyBackend;
pub use reconcile::{CartSurface, Reconciler};
pub use requester::{CartRequester, RequestError};

/// Grepable error code and retryable flag for structured error payloads.
///
/// Every error that crosses a process or window boundary implements this so
/// the receiving side can pick a retry UX without string matching.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn retryable(&self) -> bool {
        false
    }
}
