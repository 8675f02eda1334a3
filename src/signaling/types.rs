use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use axum::extract::ws::Utf8Bytes;
use thiserror::Error;

/// Signaling server errors
#[derive(Debug, Error)]
pub enum SignalingError {
    #[error("invalid envelope: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("failed to encode envelope: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("hub is no longer running")]
    HubClosed,
}

static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque identity of one connected peer.
///
/// Only used for equality (sender exclusion) and log lines; never sent to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    pub fn generate() -> Self {
        Self(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn_{:08x}", self.0)
    }
}

/// Wrapper for outbound WebSocket text frames using axum's Utf8Bytes.
///
/// Cloning is O(1), so one encoded envelope is shared by every receiver of a broadcast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage(Utf8Bytes);

impl OutboundMessage {
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Get the inner Utf8Bytes for Message::Text
    pub fn into_inner(self) -> Utf8Bytes {
        self.0
    }
}

impl From<String> for OutboundMessage {
    fn from(s: String) -> Self {
        Self(Utf8Bytes::from(s))
    }
}

impl From<&'static str> for OutboundMessage {
    fn from(s: &'static str) -> Self {
        Self(Utf8Bytes::from_static(s))
    }
}
