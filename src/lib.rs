//! Storeforge - isolated WooCommerce stores on Kubernetes, one Helm release each.
//!
//! A store is registered in PROVISIONING, deployed with `helm upgrade
//! --install` while its output is streamed line by line to the caller, and
//! settles in READY (with connection details) or FAILED. Deleting a store
//! uninstalls the release and removes its namespace.
//!
//! # Architecture
//!
//! The crate follows a hexagonal layout:
//!
//! - [`domain`] - Store records, names, lifecycle and log lines
//! - [`port`] - Traits at the edges: persistence, process launching, relay sinks
//! - [`application`] - Provisioning, teardown, relay and store management
//! - [`adapter`] - SQLite, `tokio::process`, WebSocket server and CLI
//! - [`infrastructure`] - Configuration and runtime wiring
//! - [`error`] - Error types for the crate
//!
//! # Example
//!
//! ```no_run
//! use storeforge::domain::{OwnerId, StoreId};
//! use storeforge::infrastructure::bootstrap::App;
//! use storeforge::infrastructure::config::settings::Config;
//!
//! # async fn demo() -> storeforge::error::Result<()> {
//! let config = Config::load_or_default("config.toml")?;
//! let app = App::build(&config)?;
//! let store = app.stores.create("shop", OwnerId::new("alice")).await?;
//! println!("created {}", store.id());
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
