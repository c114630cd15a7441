//! Repository doubles.
//!
//! Re-exports [`MemoryStoreRepository`] so layers that may not reach into
//! adapters can still build one in tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;

pub use crate::adapter::outbound::memory::MemoryStoreRepository;
use crate::domain::{OwnerId, Store, StoreId, StoreName};
use crate::error::{Error, Result};
use crate::port::outbound::store::StoreRepository;

/// In-memory repository whose writes can be switched to fail.
#[derive(Debug, Default)]
pub struct FlakyRepository {
    inner: MemoryStoreRepository,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

impl FlakyRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `save` and `update` fail.
    pub fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::SeqCst);
    }

    /// Number of `save` and `update` calls, failed ones included.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn write(&self) -> Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Error::Database("disk I/O error".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl StoreRepository for FlakyRepository {
    async fn save(&self, store: &Store) -> Result<()> {
        self.write()?;
        self.inner.save(store).await
    }

    async fn update(&self, store: &Store) -> Result<bool> {
        self.write()?;
        self.inner.update(store).await
    }

    async fn get(&self, id: &StoreId) -> Result<Option<Store>> {
        self.inner.get(id).await
    }

    async fn find_by_name(&self, name: &StoreName) -> Result<Option<Store>> {
        self.inner.find_by_name(name).await
    }

    async fn list(&self, owner: Option<&OwnerId>) -> Result<Vec<Store>> {
        self.inner.list(owner).await
    }

    async fn delete(&self, id: &StoreId) -> Result<bool> {
        self.inner.delete(id).await
    }
}
