//! Per-store provisioning lock registry.
//!
//! Acquisition never waits: a second attempt for a store that is already
//! being provisioned is told so immediately instead of queueing behind the
//! first one.
//!
//! Each acquisition gets a unique ticket. Releasing removes the entry only
//! if it still carries the releasing guard's ticket, so a late release can
//! never free a lock that a newer attempt holds.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::trace;

use crate::domain::StoreId;

/// Registry of in-flight provisioning attempts, keyed by store.
#[derive(Debug, Default)]
pub struct LockRegistry {
    held: DashMap<StoreId, u64>,
    next_ticket: AtomicU64,
}

impl LockRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Try to take the lock for `id` without blocking.
    ///
    /// Returns `None` when another attempt already holds it.
    pub fn try_acquire(self: &Arc<Self>, id: &StoreId) -> Option<LockGuard> {
        match self.held.entry(id.clone()) {
            Entry::Occupied(_) => None,
            Entry::Vacant(slot) => {
                let ticket = self.next_ticket.fetch_add(1, Ordering::Relaxed);
                slot.insert(ticket);
                trace!(store_id = %id, ticket, "provisioning lock acquired");
                Some(LockGuard {
                    registry: Arc::clone(self),
                    id: id.clone(),
                    ticket,
                })
            }
        }
    }

    /// Whether an attempt for `id` is in flight.
    #[must_use]
    pub fn is_held(&self, id: &StoreId) -> bool {
        self.held.contains_key(id)
    }

    /// Number of in-flight attempts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.held.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.held.is_empty()
    }

    fn release(&self, id: &StoreId, ticket: u64) {
        let removed = self.held.remove_if(id, |_, held| *held == ticket);
        trace!(store_id = %id, ticket, released = removed.is_some(), "provisioning lock released");
    }
}

/// Exclusive provisioning rights for one store. Released on drop.
#[derive(Debug)]
pub struct LockGuard {
    registry: Arc<LockRegistry>,
    id: StoreId,
    ticket: u64,
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        self.registry.release(&self.id, self.ticket);
    }
}
