//! Persistence port for store records.

use async_trait::async_trait;

use crate::domain::{OwnerId, Store, StoreId, StoreName};
use crate::error::Result;

/// Storage operations for stores.
///
/// Every write replaces the whole record in a single statement, so readers
/// observe either the previous or the new lifecycle state, never a mix.
#[async_trait]
pub trait StoreRepository: Send + Sync {
    /// Save a store, replacing it if it exists.
    ///
    /// # Errors
    /// A name already used by another store is `DomainError::DuplicateName`.
    async fn save(&self, store: &Store) -> Result<()>;

    /// Overwrite an existing store. Never inserts.
    ///
    /// Returns `false` when no record with the store's id exists, e.g.
    /// because it was deleted while the caller held an older copy.
    async fn update(&self, store: &Store) -> Result<bool>;

    /// Get a store by ID.
    async fn get(&self, id: &StoreId) -> Result<Option<Store>>;

    /// Look a store up by its unique name.
    async fn find_by_name(&self, name: &StoreName) -> Result<Option<Store>>;

    /// List stores, newest first, optionally restricted to one owner.
    async fn list(&self, owner: Option<&OwnerId>) -> Result<Vec<Store>>;

    /// Delete a store by ID. Returns whether a record was removed.
    async fn delete(&self, id: &StoreId) -> Result<bool>;
}
