//! Store provisioning.
//!
//! - [`lock`] - Per-store mutual exclusion for provisioning attempts.
//! - [`command`] - Deployment plan and command construction.
//! - [`multiplex`] - Merges stdout/stderr into one line feed.
//! - [`orchestrator`] - Runs an attempt and records its outcome.
//! - [`teardown`] - Removes a store's external resources.

pub mod command;
pub mod lock;
pub mod multiplex;
pub mod orchestrator;
pub mod teardown;

pub use command::{AttemptCredentials, CredentialSource, DeploymentPlan};
pub use lock::{LockGuard, LockRegistry};
pub use multiplex::multiplex;
pub use orchestrator::{LogFeed, Provisioner, ALREADY_IN_PROGRESS, PROVISIONED};
pub use teardown::Deprovisioner;
