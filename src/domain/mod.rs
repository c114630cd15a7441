//! Core domain types: stores, their identifiers and lifecycle, and the
//! log lines produced while provisioning them.
//!
//! Nothing in here performs I/O.

pub mod error;
pub mod id;
pub mod log;
pub mod store;

pub use error::DomainError;
pub use id::{OwnerId, StoreId};
pub use log::{LogLine, LogSource};
pub use store::{
    AdminPrincipal, ConnectionDetails, Endpoint, Lifecycle, Store, StoreName, StoreStatus,
};
