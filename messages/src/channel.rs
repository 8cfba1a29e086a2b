//! `postMessage` seam between two browsing contexts.
//!
//! DESIGN
//! ======
//! - Outbound: a [`Channel`] always posts to one explicit [`Origin`]; the
//!   type system has no way to express the `*` wildcard.
//! - Inbound: the event origin is checked against the [`OriginPolicy`]
//!   before `data` is touched. Rejected events are logged and dropped,
//!   never surfaced to the user.
//! - Unknown message tags are ignored for forward compatibility.

use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::message::{DecodeError, Message};
use crate::origin::{Origin, OriginPolicy};

/// An inbound `message` event: the sender's origin plus raw `data`.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageEvent {
    pub origin: String,
    pub data: Value,
}

impl MessageEvent {
    #[must_use]
    pub fn new(origin: impl Into<String>, data: Value) -> Self {
        Self { origin: origin.into(), data }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("counterpart window is gone")]
    Closed,
    #[error("message serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl crate::ErrorCode for TransportError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Closed => "E_TRANSPORT_CLOSED",
            Self::Serialize(_) => "E_TRANSPORT_SERIALIZE",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Closed)
    }
}

/// Outbound half of `postMessage` towards one counterpart window.
pub trait Transport: Send + Sync {
    /// Deliver `message` to the counterpart, restricted to `target_origin`.
    ///
    /// # Errors
    ///
    /// Returns an error when the counterpart is gone or the message cannot
    /// be serialized.
    fn post(&self, message: &Message, target_origin: &Origin) -> Result<(), TransportError>;
}

// =============================================================================
// CHANNEL
// =============================================================================

/// Bidirectional messaging with one trusted counterpart.
pub struct Channel<T> {
    transport: T,
    target: Origin,
    policy: OriginPolicy,
}

impl<T: Transport> Channel<T> {
    #[must_use]
    pub fn new(transport: T, target: Origin, policy: OriginPolicy) -> Self {
        Self { transport, target, policy }
    }

    /// Post a message to the configured target origin.
    ///
    /// # Errors
    ///
    /// Propagates the transport failure.
    pub fn send(&self, message: &Message) -> Result<(), TransportError> {
        debug!(tag = message.tag(), target = %self.target, "channel: post");
        self.transport.post(message, &self.target)
    }

    /// Screen an inbound event. Returns `None` for untrusted origins,
    /// unknown tags, and malformed payloads.
    #[must_use]
    pub fn accept(&self, event: &MessageEvent) -> Option<Message> {
        screen(&self.policy, event)
    }

    #[must_use]
    pub fn target(&self) -> &Origin {
        &self.target
    }

    #[must_use]
    pub fn policy(&self) -> &OriginPolicy {
        &self.policy
    }
}

/// Origin check first, then tag discrimination.
pub(crate) fn screen(policy: &OriginPolicy, event: &MessageEvent) -> Option<Message> {
    if !policy.allows(&event.origin) {
        warn!(origin = %event.origin, "channel: dropped message from untrusted origin");
        return None;
    }
    match Message::decode(&event.data) {
        Ok(message) => Some(message),
        Err(DecodeError::UnknownType(tag)) => {
            debug!(origin = %event.origin, %tag, "channel: ignoring unknown message type");
            None
        }
        Err(e) => {
            warn!(origin = %event.origin, error = %e, "channel: dropped malformed message");
            None
        }
    }
}

// =============================================================================
// IN-PROCESS TRANSPORT
// =============================================================================

/// A message as it left a [`MpscTransport`].
#[derive(Debug, Clone, PartialEq)]
pub struct Posted {
    pub target_origin: Origin,
    pub data: Value,
}

/// Transport that serializes messages onto an unbounded channel.
///
/// Stands in for a window handle when both ends run in one process (host
/// shells, tests). Messages are serialized exactly as a browser would
/// structured-clone them.
#[derive(Debug, Clone)]
pub struct MpscTransport {
    tx: mpsc::UnboundedSender<Posted>,
}

impl MpscTransport {
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Posted>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Transport for MpscTransport {
    fn post(&self, message: &Message, target_origin: &Origin) -> Result<(), TransportError> {
        let data = serde_json::to_value(message)?;
        self.tx
            .send(Posted { target_origin: target_origin.clone(), data })
            .map_err(|_| TransportError::Closed)
    }
}

#[cfg(test)]
#[path = "channel_test.rs"]
mod tests;
