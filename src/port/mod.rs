//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! Ports define the extension points of the provisioning core. Adapters
//! implement them to integrate with the outside world: the process table,
//! the database and whatever transport carries logs to a caller.
//!
//! # Architecture
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │      Application        │
//!                    │  (orchestrator, store   │
//!     ┌──────────────┤   service, teardown)    ├──────────────┐
//!     │              └─────────────────────────┘              │
//!     │                         │                             │
//!     ▼                         ▼                             ▼
//! ┌─────────┐            ┌─────────────┐              ┌───────────┐
//! │ Process │            │   Store     │              │   Relay   │
//! │ Adapter │            │   Adapter   │              │   Sink    │
//! └─────────┘            └─────────────┘              └───────────┘
//! ```
//!
//! # Available Ports
//!
//! - [`outbound::process::ProcessLauncher`] - External command execution
//! - [`outbound::store::StoreRepository`] - Durable store records
//! - [`inbound::relay::RelaySink`] - Destination of a relayed log feed

pub mod inbound;
pub mod outbound;
