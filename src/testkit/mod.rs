//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`process`] - Scripted [`ProcessLauncher`](crate::port::outbound::process::ProcessLauncher)
//!   that replays canned output and exit codes instead of running Helm.
//! - [`domain`] - Builders for stores and names.
//! - [`config`] - Canonical test configurations.
//! - [`store`] - Repository doubles that fail on demand.
//! - [`relay`] - Sink that records relayed messages.

pub mod config;
pub mod domain;
pub mod process;
pub mod relay;
pub mod store;
