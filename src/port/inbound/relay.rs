//! Relay sink port.
//!
//! The log relay pushes [`RelayMessage`]s into a [`RelaySink`]; adapters
//! decide how each message is framed (WebSocket text frames, terminal lines).

use async_trait::async_trait;

use crate::domain::ConnectionDetails;
use crate::error::Result;

/// Marker sent after a successful provisioning run.
pub const PROVISIONING_COMPLETE: &str = "PROVISIONING_COMPLETE";

/// Marker sent after a failed provisioning run.
pub const PROVISIONING_FAILED: &str = "PROVISIONING_FAILED";

/// One unit of output delivered to a relay client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayMessage {
    /// Plain progress line.
    Line(String),
    /// Terminal success signal with the store's connection details.
    Complete(ConnectionDetails),
    /// Terminal failure signal.
    Failed,
    /// The requested store does not exist.
    NotFound,
}

/// Destination for relayed messages.
#[async_trait]
pub trait RelaySink: Send {
    /// Deliver one message.
    ///
    /// # Errors
    /// An error means the client is gone; the relay stops forwarding but
    /// provisioning itself carries on.
    async fn send(&mut self, message: RelayMessage) -> Result<()>;
}
