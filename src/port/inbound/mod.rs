//! Inbound (driving) ports consumed by inbound adapters.
//!
//! - [`relay`]: where a relayed provisioning log ends up (WebSocket, terminal)

pub mod relay;
