//! Log relay.
//!
//! Connects a client session to a provisioning attempt: checks that the
//! store is waiting to be provisioned, starts the attempt, forwards every
//! log line and finishes with a terminal signal.
//!
//! ```text
//! unknown store         --> NotFound
//! not PROVISIONING      --> "Store is already <STATUS>"
//! PROVISIONING          --> "Starting provisioning for <name>..."
//!                           <feed lines>
//!                           Complete(details) | Failed
//! ```
//!
//! A client that goes away only stops forwarding. The attempt keeps running
//! on its own task and still records its outcome.

use std::sync::Arc;

use tracing::{debug, info};

use crate::application::provision::Provisioner;
use crate::domain::{StoreId, StoreStatus};
use crate::error::Result;
use crate::port::inbound::relay::{RelayMessage, RelaySink};
use crate::port::outbound::store::StoreRepository;

/// Streams a provisioning attempt to a client.
pub struct LogRelay {
    provisioner: Arc<Provisioner>,
    repository: Arc<dyn StoreRepository>,
}

impl LogRelay {
    pub fn new(provisioner: Arc<Provisioner>, repository: Arc<dyn StoreRepository>) -> Self {
        Self {
            provisioner,
            repository,
        }
    }

    /// Run one relay session for `store_id`.
    ///
    /// # Errors
    /// Only repository failures are returned. A failing sink ends the
    /// session quietly.
    pub async fn relay(&self, store_id: &StoreId, sink: &mut dyn RelaySink) -> Result<()> {
        let Some(store) = self.repository.get(store_id).await? else {
            info!(store_id = %store_id, "relay requested for unknown store");
            let _ = sink.send(RelayMessage::NotFound).await;
            return Ok(());
        };

        if store.status() != StoreStatus::Provisioning {
            let line = format!("Store is already {}", store.status());
            let _ = sink.send(RelayMessage::Line(line)).await;
            return Ok(());
        }

        let intro = format!("Starting provisioning for {}...", store.name());
        if sink.send(RelayMessage::Line(intro)).await.is_err() {
            debug!(store_id = %store_id, "client left before provisioning started");
            return Ok(());
        }

        let mut feed = self.provisioner.provision(store);
        while let Some(line) = feed.recv().await {
            if sink.send(RelayMessage::Line(line)).await.is_err() {
                debug!(store_id = %store_id, "client disconnected, provisioning continues");
                return Ok(());
            }
        }

        let terminal = match self.repository.get(store_id).await? {
            Some(store) => store
                .connection_details()
                .map_or(RelayMessage::Failed, RelayMessage::Complete),
            None => RelayMessage::Failed,
        };
        let _ = sink.send(terminal).await;
        Ok(())
    }
}
