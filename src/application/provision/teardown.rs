//! Deprovisioning.
//!
//! Uninstalls the store's release and then deletes its namespace. The
//! namespace is removed even when the uninstall fails so no orphaned
//! resources are left behind.

use std::sync::Arc;

use futures_util::{future, StreamExt};
use tracing::{debug, info, warn};

use super::command::DeploymentPlan;
use crate::domain::Store;
use crate::error::ProvisionError;
use crate::infrastructure::config::deploy::DeployConfig;
use crate::port::outbound::process::{CommandSpec, LineStream, ProcessLauncher};

/// Exit code recorded for a step whose executable could not be started.
const LAUNCH_FAILED: i32 = -1;

/// Removes a store's external resources.
pub struct Deprovisioner {
    launcher: Arc<dyn ProcessLauncher>,
    deploy: DeployConfig,
}

impl Deprovisioner {
    pub fn new(launcher: Arc<dyn ProcessLauncher>, deploy: DeployConfig) -> Self {
        Self { launcher, deploy }
    }

    /// Tear down `store`. Returns `true` only if the uninstall succeeded.
    ///
    /// Failures are logged, never raised.
    pub async fn teardown(&self, store: &Store) -> bool {
        let plan = DeploymentPlan::new(store.name(), &self.deploy);
        info!(store_id = %store.id(), release = %plan.release, namespace = %plan.namespace, "tearing down store");

        let uninstalled = self.step("uninstall", &plan.uninstall_command()).await;
        let namespace_deleted = self
            .step("delete-namespace", &plan.delete_namespace_command())
            .await;

        if uninstalled && namespace_deleted {
            info!(store_id = %store.id(), "teardown complete");
        }
        uninstalled
    }

    async fn step(&self, step: &'static str, command: &CommandSpec) -> bool {
        let code = match self.run(command).await {
            Ok(code) => code,
            Err(err) => {
                warn!(step, error = %err, "teardown step could not run");
                LAUNCH_FAILED
            }
        };

        if code != 0 {
            let err = ProvisionError::TeardownPartialFailure { step, code };
            warn!(error = %err, "teardown incomplete");
        }
        code == 0
    }

    async fn run(&self, command: &CommandSpec) -> Result<i32, ProvisionError> {
        debug!(command = %command, "running teardown command");
        let mut handle = self.launcher.launch(command)?;

        let stdout = handle.take_stdout();
        let stderr = handle.take_stderr();
        future::join(drain("stdout", stdout), drain("stderr", stderr)).await;

        handle.wait().await.map_err(ProvisionError::Supervision)
    }
}

async fn drain(stream: &'static str, lines: Option<LineStream>) {
    let Some(mut lines) = lines else { return };
    while let Some(line) = lines.next().await {
        debug!(stream, "{line}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::process::{ProcessScript, ScriptedLauncher};
    use crate::testkit::{config, domain};

    fn deprovisioner(scripts: Vec<ProcessScript>) -> (Deprovisioner, Arc<ScriptedLauncher>) {
        let launcher = Arc::new(ScriptedLauncher::with_scripts(scripts));
        (Deprovisioner::new(launcher.clone(), config::deploy()), launcher)
    }

    #[tokio::test]
    async fn successful_teardown_runs_both_steps() {
        let (deprovisioner, launcher) = deprovisioner(vec![
            ProcessScript::exit(0).with_stdout(&["release \"shop\" uninstalled"]),
            ProcessScript::exit(0),
        ]);

        assert!(deprovisioner.teardown(&domain::store("shop")).await);

        let commands: Vec<String> = launcher.launched().iter().map(ToString::to_string).collect();
        assert_eq!(
            commands,
            vec![
                "helm uninstall shop --namespace store-shop",
                "kubectl delete namespace store-shop",
            ]
        );
    }

    #[tokio::test]
    async fn failed_uninstall_still_deletes_namespace() {
        let (deprovisioner, launcher) = deprovisioner(vec![
            ProcessScript::exit(1).with_stderr(&["Error: release: not found"]),
            ProcessScript::exit(0),
        ]);

        assert!(!deprovisioner.teardown(&domain::store("shop")).await);
        assert_eq!(launcher.launch_count(), 2);
    }

    #[tokio::test]
    async fn unlaunchable_uninstall_counts_as_failure() {
        let (deprovisioner, launcher) =
            deprovisioner(vec![ProcessScript::launch_failure(), ProcessScript::exit(0)]);

        assert!(!deprovisioner.teardown(&domain::store("shop")).await);
        assert_eq!(launcher.launch_count(), 2);
    }

    #[tokio::test]
    async fn namespace_failure_does_not_change_result() {
        let (deprovisioner, _) =
            deprovisioner(vec![ProcessScript::exit(0), ProcessScript::exit(1)]);

        assert!(deprovisioner.teardown(&domain::store("shop")).await);
    }
}
