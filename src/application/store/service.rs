//! Store management service.
//!
//! Thin glue between callers and the repository. Provisioning itself is
//! driven by the relay; this service only creates records, resets failed
//! ones for another attempt and tears stores down.
//!
//! Deletion takes the store's provisioning lock, so a store cannot be
//! removed while an attempt is still deploying it.

use std::sync::Arc;

use tracing::{info, warn};

use crate::application::provision::{Deprovisioner, LockRegistry};
use crate::domain::{DomainError, OwnerId, Store, StoreId, StoreName};
use crate::error::{Error, ProvisionError, Result};
use crate::port::outbound::store::StoreRepository;

/// Application service for store records.
pub struct StoreService {
    repository: Arc<dyn StoreRepository>,
    deprovisioner: Arc<Deprovisioner>,
    locks: Arc<LockRegistry>,
}

impl StoreService {
    pub fn new(
        repository: Arc<dyn StoreRepository>,
        deprovisioner: Arc<Deprovisioner>,
        locks: Arc<LockRegistry>,
    ) -> Self {
        Self {
            repository,
            deprovisioner,
            locks,
        }
    }

    /// Register a new store in PROVISIONING.
    ///
    /// # Errors
    /// Fails when the name is not a valid DNS label or already taken.
    pub async fn create(&self, name: &str, owner: OwnerId) -> Result<Store> {
        let name = StoreName::parse(name)?;
        if self.repository.find_by_name(&name).await?.is_some() {
            return Err(DomainError::DuplicateName {
                name: name.to_string(),
            }
            .into());
        }

        let store = Store::new(name, owner);
        self.repository.save(&store).await?;
        info!(store_id = %store.id(), store = %store.name(), owner = %store.owner(), "store created");
        Ok(store)
    }

    /// Fetch a store.
    ///
    /// # Errors
    /// Returns [`Error::NotFound`] for unknown ids.
    pub async fn get(&self, id: &StoreId) -> Result<Store> {
        self.repository
            .get(id)
            .await?
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }

    /// All stores, optionally restricted to one owner, newest first.
    pub async fn list(&self, owner: Option<&OwnerId>) -> Result<Vec<Store>> {
        self.repository.list(owner).await
    }

    /// Move a FAILED store back to PROVISIONING.
    ///
    /// # Errors
    /// Rejects stores that are not FAILED with `InvalidTransition`.
    pub async fn retry(&self, id: &StoreId) -> Result<Store> {
        let mut store = self.get(id).await?;
        store.reset_for_retry()?;
        if !self.repository.update(&store).await? {
            return Err(Error::NotFound(id.to_string()));
        }
        info!(store_id = %store.id(), "store queued for another provisioning attempt");
        Ok(store)
    }

    /// Tear down external resources and remove the record.
    ///
    /// Teardown failures are logged and do not keep the record alive.
    ///
    /// # Errors
    /// Returns [`ProvisionError::ConcurrentAttempt`] while the store is
    /// being provisioned.
    pub async fn delete(&self, id: &StoreId) -> Result<Store> {
        let _guard = self
            .locks
            .try_acquire(id)
            .ok_or_else(|| ProvisionError::ConcurrentAttempt {
                store_id: id.to_string(),
            })?;
        let store = self.get(id).await?;

        if !self.deprovisioner.teardown(&store).await {
            warn!(store_id = %store.id(), store = %store.name(), "teardown incomplete, removing record anyway");
        }

        self.repository.delete(store.id()).await?;
        info!(store_id = %store.id(), "store deleted");
        Ok(store)
    }
}
