//! In-memory store repository for tests and throwaway runs.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::domain::{DomainError, OwnerId, Store, StoreId, StoreName};
use crate::error::Result;
use crate::port::outbound::store::StoreRepository;

/// In-memory store repository.
#[derive(Debug, Default)]
pub struct MemoryStoreRepository {
    stores: RwLock<HashMap<StoreId, Store>>,
}

impl MemoryStoreRepository {
    /// Create a new empty repository.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StoreRepository for MemoryStoreRepository {
    async fn save(&self, store: &Store) -> Result<()> {
        let mut stores = self.stores.write();
        let taken = stores
            .values()
            .any(|s| s.name() == store.name() && s.id() != store.id());
        if taken {
            return Err(DomainError::DuplicateName {
                name: store.name().to_string(),
            }
            .into());
        }
        stores.insert(store.id().clone(), store.clone());
        Ok(())
    }

    async fn update(&self, store: &Store) -> Result<bool> {
        let mut stores = self.stores.write();
        match stores.get_mut(store.id()) {
            Some(existing) => {
                *existing = store.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn get(&self, id: &StoreId) -> Result<Option<Store>> {
        Ok(self.stores.read().get(id).cloned())
    }

    async fn find_by_name(&self, name: &StoreName) -> Result<Option<Store>> {
        Ok(self
            .stores
            .read()
            .values()
            .find(|s| s.name() == name)
            .cloned())
    }

    async fn list(&self, owner: Option<&OwnerId>) -> Result<Vec<Store>> {
        let mut stores: Vec<Store> = self
            .stores
            .read()
            .values()
            .filter(|s| owner.map_or(true, |o| s.owner() == o))
            .cloned()
            .collect();
        stores.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        Ok(stores)
    }

    async fn delete(&self, id: &StoreId) -> Result<bool> {
        Ok(self.stores.write().remove(id).is_some())
    }
}
