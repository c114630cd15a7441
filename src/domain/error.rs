//! Domain validation errors for core domain types.
//!
//! This module defines errors that occur when domain invariants are violated.
//! These errors are returned by validating constructors such as
//! [`StoreName::parse`](super::store::StoreName::parse).
//!
//! # Examples
//!
//! ```
//! use storeforge::domain::error::DomainError;
//! use storeforge::domain::store::StoreName;
//!
//! let result = StoreName::parse("Not A Label");
//! assert!(matches!(result, Err(DomainError::InvalidStoreName { .. })));
//! ```

use thiserror::Error;

use super::store::StoreStatus;

/// Errors that occur when domain invariants are violated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Store names must form a valid DNS label once prefixed.
    #[error("invalid store name '{name}': {reason}")]
    InvalidStoreName {
        /// The rejected name.
        name: String,
        /// Which rule was broken.
        reason: &'static str,
    },

    /// Store identifiers are UUIDs.
    #[error("invalid store id '{input}'")]
    InvalidStoreId {
        /// The rejected input.
        input: String,
    },

    /// Names are unique across all stores.
    #[error("a store named '{name}' already exists")]
    DuplicateName {
        /// The conflicting name.
        name: String,
    },

    /// Only failed stores may be sent back to provisioning.
    #[error("cannot move store from {from} to {to}")]
    InvalidTransition {
        /// Current status.
        from: StoreStatus,
        /// Requested status.
        to: StoreStatus,
    },

    /// A persisted record breaks the READY-iff-connection-details rule.
    #[error("inconsistent store record {id}: {reason}")]
    InconsistentRecord {
        /// Store id of the broken record.
        id: String,
        /// What was inconsistent.
        reason: &'static str,
    },
}
