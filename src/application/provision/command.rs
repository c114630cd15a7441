//! Deployment command construction.
//!
//! Everything the external tools receive is derived here from the store
//! name and the `[deploy]` / `[credentials]` configuration:
//!
//! | value     | derivation                         |
//! |-----------|------------------------------------|
//! | release   | `name`                             |
//! | namespace | `namespace_prefix + name`          |
//! | hostname  | `name + "." + host_suffix`         |
//! | endpoint  | `url_scheme + "://" + hostname`    |

use rand::distributions::Alphanumeric;
use rand::Rng;

use crate::domain::{AdminPrincipal, Endpoint, StoreName};
use crate::infrastructure::config::deploy::{CredentialsConfig, DeployConfig};
use crate::port::outbound::process::CommandSpec;

const GENERATED_PASSWORD_LEN: usize = 24;

/// Credentials used for a single provisioning attempt.
#[derive(Debug, Clone)]
pub struct AttemptCredentials {
    pub admin: AdminPrincipal,
    pub db_password: String,
}

/// Produces credentials for each attempt.
#[derive(Debug, Clone)]
pub struct CredentialSource {
    base: CredentialsConfig,
    generate: bool,
}

impl CredentialSource {
    #[must_use]
    pub fn new(base: CredentialsConfig, generate: bool) -> Self {
        Self { base, generate }
    }

    /// Fixed credentials from configuration, or fresh random passwords when
    /// generation is enabled. The admin username is always the configured one.
    #[must_use]
    pub fn next(&self) -> AttemptCredentials {
        if self.generate {
            AttemptCredentials {
                admin: AdminPrincipal::new(&self.base.admin_user, random_password()),
                db_password: random_password(),
            }
        } else {
            AttemptCredentials {
                admin: AdminPrincipal::new(&self.base.admin_user, &self.base.admin_password),
                db_password: self.base.db_password.clone(),
            }
        }
    }
}

fn random_password() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(GENERATED_PASSWORD_LEN)
        .map(char::from)
        .collect()
}

/// Names and commands for one store's release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentPlan {
    pub release: String,
    pub namespace: String,
    pub hostname: String,
    endpoint_url: String,
    helm_bin: String,
    kubectl_bin: String,
    chart: String,
    wait_timeout: String,
}

impl DeploymentPlan {
    #[must_use]
    pub fn new(name: &StoreName, deploy: &DeployConfig) -> Self {
        let hostname = format!("{name}.{}", deploy.host_suffix);
        Self {
            release: name.to_string(),
            namespace: format!("{}{name}", deploy.namespace_prefix),
            endpoint_url: format!("{}://{hostname}", deploy.url_scheme),
            hostname,
            helm_bin: deploy.helm_bin.clone(),
            kubectl_bin: deploy.kubectl_bin.clone(),
            chart: deploy.chart.clone(),
            wait_timeout: deploy.wait_timeout.clone(),
        }
    }

    /// Idempotent install-or-upgrade that waits for the release to be ready.
    #[must_use]
    pub fn install_command(&self, credentials: &AttemptCredentials) -> CommandSpec {
        CommandSpec::new(&self.helm_bin)
            .args(["upgrade", "--install", self.release.as_str(), self.chart.as_str()])
            .args(["--namespace", self.namespace.as_str(), "--create-namespace"])
            .args(["--set".to_string(), format!("ingress.host={}", self.hostname)])
            .args([
                "--set".to_string(),
                format!("wordpressPassword={}", credentials.admin.password),
            ])
            .args([
                "--set".to_string(),
                format!("mariadb.auth.password={}", credentials.db_password),
            ])
            .arg("--wait")
            .args(["--timeout", self.wait_timeout.as_str()])
    }

    #[must_use]
    pub fn uninstall_command(&self) -> CommandSpec {
        CommandSpec::new(&self.helm_bin).args([
            "uninstall",
            self.release.as_str(),
            "--namespace",
            self.namespace.as_str(),
        ])
    }

    #[must_use]
    pub fn delete_namespace_command(&self) -> CommandSpec {
        CommandSpec::new(&self.kubectl_bin).args(["delete", "namespace", self.namespace.as_str()])
    }

    /// Connection details reported once the release is ready.
    #[must_use]
    pub fn endpoint(&self, credentials: &AttemptCredentials) -> Endpoint {
        Endpoint {
            url: self.endpoint_url.clone(),
            admin: credentials.admin.clone(),
        }
    }

    #[must_use]
    pub fn endpoint_url(&self) -> &str {
        &self.endpoint_url
    }
}
