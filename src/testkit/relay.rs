//! Relay sink doubles.

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::port::inbound::relay::{RelayMessage, RelaySink};

/// Records every message; can be told to hang up after `n` messages.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub messages: Vec<RelayMessage>,
    hang_up_after: Option<usize>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept `n` messages, then fail like a disconnected client.
    pub fn hanging_up_after(n: usize) -> Self {
        Self {
            messages: Vec::new(),
            hang_up_after: Some(n),
        }
    }

    /// Text of every `Line` message, in order.
    pub fn lines(&self) -> Vec<String> {
        self.messages
            .iter()
            .filter_map(|m| match m {
                RelayMessage::Line(text) => Some(text.clone()),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl RelaySink for RecordingSink {
    async fn send(&mut self, message: RelayMessage) -> Result<()> {
        if self.hang_up_after == Some(self.messages.len()) {
            return Err(Error::Connection("client disconnected".to_string()));
        }
        self.messages.push(message);
        Ok(())
    }
}
