//! Log relay server settings.

use serde::Deserialize;

/// WebSocket relay server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the relay listens on.
    pub bind: String,
    /// Capacity of each provisioning log channel.
    pub log_channel_capacity: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8000".into(),
            log_channel_capacity: 256,
        }
    }
}
