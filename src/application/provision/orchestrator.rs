//! Provisioning orchestrator.
//!
//! # Flow
//!
//! ```text
//! provision(store)
//!     |
//!     +-- lock busy? --> feed: "Provisioning already in progress" (state untouched)
//!     |
//!     +-- spawn attempt task ------------------------------------------+
//!            re-read the record                                        |
//!              gone             --> "Store not found"                  |
//!              not PROVISIONING --> "Store is already <STATUS>"        |
//!            launch deployment command                                 |
//!            multiplex stdout/stderr --> feed (line by line)           |
//!            wait for exit                                             |
//!              0      --> READY + endpoint, persist, success line      |
//!              other  --> FAILED, persist, exit code line              |
//!            any error/panic --> FAILED, persist best-effort,          |
//!                                "Error: ..." line                     |
//!            release lock, then close feed  <--------------------------+
//! ```
//!
//! The attempt runs on its own task. Dropping the [`LogFeed`] stops delivery
//! but never cancels the external process or the final state update.
//!
//! The final state is written with an update, never an insert: a record
//! deleted while the deployment ran stays deleted.

use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_util::{stream, FutureExt, Stream, StreamExt};
use tokio::sync::mpsc;
use tracing::{error, info, info_span, warn, Instrument};

use super::command::{CredentialSource, DeploymentPlan};
use super::lock::LockRegistry;
use super::multiplex::multiplex;
use crate::domain::{Store, StoreStatus};
use crate::error::{Error, ProvisionError};
use crate::infrastructure::config::deploy::DeployConfig;
use crate::port::outbound::process::ProcessLauncher;
use crate::port::outbound::store::StoreRepository;

/// Sole line of the feed when another attempt holds the store's lock.
pub const ALREADY_IN_PROGRESS: &str = "Provisioning already in progress";

/// Final line of a successful attempt.
pub const PROVISIONED: &str = "Store provisioned successfully!";

const STORE_NOT_FOUND: &str = "Store not found";

const STORE_REMOVED: &str = "Store was deleted while provisioning";

/// Lazy, finite, non-restartable sequence of provisioning log lines.
///
/// Ends when the attempt has finished and its final state is persisted.
#[derive(Debug)]
pub struct LogFeed {
    rx: mpsc::Receiver<String>,
}

impl LogFeed {
    /// Receive the next line, or `None` once the attempt is over.
    pub async fn recv(&mut self) -> Option<String> {
        self.rx.recv().await
    }

    /// Drain the whole feed.
    pub async fn collect_lines(self) -> Vec<String> {
        self.collect().await
    }
}

impl Stream for LogFeed {
    type Item = String;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

/// Drives provisioning attempts.
pub struct Provisioner {
    locks: Arc<LockRegistry>,
    launcher: Arc<dyn ProcessLauncher>,
    repository: Arc<dyn StoreRepository>,
    deploy: DeployConfig,
    credentials: CredentialSource,
    capacity: usize,
}

impl Provisioner {
    /// Create a provisioner.
    ///
    /// `capacity` bounds both the feed and the internal stdout/stderr merge.
    pub fn new(
        locks: Arc<LockRegistry>,
        launcher: Arc<dyn ProcessLauncher>,
        repository: Arc<dyn StoreRepository>,
        deploy: DeployConfig,
        credentials: CredentialSource,
        capacity: usize,
    ) -> Self {
        Self {
            locks,
            launcher,
            repository,
            deploy,
            credentials,
            capacity: capacity.max(1),
        }
    }

    #[must_use]
    pub fn locks(&self) -> &Arc<LockRegistry> {
        &self.locks
    }

    /// Start provisioning `store` and return its log feed.
    ///
    /// `store` only identifies the record: once the lock is held the
    /// stored copy is read again and only a PROVISIONING store is deployed.
    /// Must be called from within a Tokio runtime.
    pub fn provision(&self, store: Store) -> LogFeed {
        let (tx, rx) = mpsc::channel(self.capacity);

        let Some(guard) = self.locks.try_acquire(store.id()) else {
            let busy = ProvisionError::ConcurrentAttempt {
                store_id: store.id().to_string(),
            };
            info!(reason = %busy, "skipping provisioning request");
            let _ = tx.try_send(ALREADY_IN_PROGRESS.to_string());
            return LogFeed { rx };
        };

        let attempt = Attempt {
            launcher: Arc::clone(&self.launcher),
            repository: Arc::clone(&self.repository),
            plan: DeploymentPlan::new(store.name(), &self.deploy),
            credentials: self.credentials.clone(),
            capacity: self.capacity,
        };
        let span = info_span!("provision", store_id = %store.id(), store = %store.name());

        tokio::spawn(
            async move {
                attempt.run(store, &tx).await;
                // Release before closing the feed so a caller that reacts to
                // the end of the feed can immediately start a new attempt.
                drop(guard);
                drop(tx);
            }
            .instrument(span),
        );

        LogFeed { rx }
    }
}

struct Attempt {
    launcher: Arc<dyn ProcessLauncher>,
    repository: Arc<dyn StoreRepository>,
    plan: DeploymentPlan,
    credentials: CredentialSource,
    capacity: usize,
}

impl Attempt {
    async fn run(&self, snapshot: Store, tx: &mpsc::Sender<String>) {
        let mut store = match self.current(&snapshot, tx).await {
            Ok(Some(store)) => store,
            Ok(None) => return,
            Err(err) => {
                error!(error = %err, "failed to load store before provisioning");
                emit(tx, format!("Error: {err}")).await;
                return;
            }
        };

        let outcome = AssertUnwindSafe(self.drive(&mut store, tx))
            .catch_unwind()
            .await;

        let message = match outcome {
            Ok(Ok(())) => return,
            Ok(Err(err)) => {
                error!(error = %err, "provisioning failed");
                err.to_string()
            }
            Err(_) => {
                error!("provisioning task panicked");
                "internal error while provisioning".to_string()
            }
        };

        store.mark_failed();
        match self.repository.update(&store).await {
            Ok(true) => {}
            Ok(false) => warn!("store record removed, FAILED state not written"),
            Err(err) => error!(error = %err, "failed to persist FAILED state"),
        }
        emit(tx, format!("Error: {message}")).await;
    }

    /// The stored record if it is still waiting to be provisioned. Otherwise
    /// the reason goes to the feed and nothing is returned.
    async fn current(
        &self,
        snapshot: &Store,
        tx: &mpsc::Sender<String>,
    ) -> Result<Option<Store>, Error> {
        match self.repository.get(snapshot.id()).await? {
            None => {
                info!("store record is gone, nothing to provision");
                emit(tx, STORE_NOT_FOUND.to_string()).await;
                Ok(None)
            }
            Some(store) if store.status() != StoreStatus::Provisioning => {
                info!(status = %store.status(), "store already settled, not launching");
                emit(tx, format!("Store is already {}", store.status())).await;
                Ok(None)
            }
            Some(store) => Ok(Some(store)),
        }
    }

    async fn drive(&self, store: &mut Store, tx: &mpsc::Sender<String>) -> Result<(), ProvisionError> {
        let credentials = self.credentials.next();
        let command = self.plan.install_command(&credentials);

        info!(
            release = %self.plan.release,
            namespace = %self.plan.namespace,
            program = %command.program,
            "launching deployment"
        );
        let mut handle = self.launcher.launch(&command)?;

        let stdout = handle.take_stdout().unwrap_or_else(|| stream::empty().boxed());
        let stderr = handle.take_stderr().unwrap_or_else(|| stream::empty().boxed());
        let mut lines = multiplex(stdout, stderr, self.capacity);
        while let Some(line) = lines.recv().await {
            emit(tx, line.into_text()).await;
        }

        let code = handle.wait().await.map_err(ProvisionError::Supervision)?;

        let line = if code == 0 {
            store.mark_ready(self.plan.endpoint(&credentials));
            PROVISIONED.to_string()
        } else {
            store.mark_failed();
            format!("Deployment failed with exit code {code}")
        };

        if !self.persist(store).await? {
            warn!(exit_code = code, "store record removed during deployment, outcome dropped");
            emit(tx, STORE_REMOVED.to_string()).await;
            return Ok(());
        }

        if code == 0 {
            info!(endpoint = %self.plan.endpoint_url(), "store ready");
        } else {
            let failure = ProvisionError::ProcessFailure { code };
            warn!(exit_code = code, error = %failure, "deployment exited unsuccessfully");
        }
        emit(tx, line).await;
        Ok(())
    }

    /// Write the outcome. `false` means the record no longer exists.
    async fn persist(&self, store: &Store) -> Result<bool, ProvisionError> {
        self.repository
            .update(store)
            .await
            .map_err(|e| ProvisionError::Persistence(e.to_string()))
    }
}

/// Forward a line to the feed. A closed feed is not an error: the attempt
/// carries on without a listener.
async fn emit(tx: &mpsc::Sender<String>, line: String) {
    let _ = tx.send(line).await;
}
