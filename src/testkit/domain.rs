//! Builders for domain primitives.

use crate::domain::{OwnerId, Store, StoreName};

/// Parse a store name, panicking on invalid input.
pub fn name(name: &str) -> StoreName {
    StoreName::parse(name).expect("valid store name")
}

/// A fresh PROVISIONING store owned by `user-1`.
pub fn store(store_name: &str) -> Store {
    Store::new(name(store_name), OwnerId::new("user-1"))
}
