//! Deployment tool settings.
//!
//! Controls which binaries are invoked, which chart is installed and how
//! store names map onto namespaces, hostnames and URLs.

use serde::Deserialize;

/// Deployment command configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DeployConfig {
    /// Package deployment binary (install, upgrade, uninstall).
    pub helm_bin: String,
    /// Cluster CLI used for namespace cleanup.
    pub kubectl_bin: String,
    /// Chart reference passed to `upgrade --install`.
    pub chart: String,
    /// Prefix prepended to the store name to form its namespace.
    pub namespace_prefix: String,
    /// Suffix appended to the store name to form its hostname.
    pub host_suffix: String,
    /// Scheme of the endpoint URL reported for READY stores.
    pub url_scheme: String,
    /// Wait-for-ready timeout, in the deployment tool's duration syntax.
    pub wait_timeout: String,
    /// Generate random passwords per attempt instead of the fixed ones.
    pub generate_credentials: bool,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            helm_bin: "helm".into(),
            kubectl_bin: "kubectl".into(),
            chart: "charts/woocommerce".into(),
            namespace_prefix: "store-".into(),
            host_suffix: "localhost".into(),
            url_scheme: "http".into(),
            wait_timeout: "10m".into(),
            generate_credentials: false,
        }
    }
}

/// Credentials handed to the chart.
///
/// The defaults are placeholders for local clusters only.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct CredentialsConfig {
    pub admin_user: String,
    pub admin_password: String,
    pub db_password: String,
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            admin_user: "user".into(),
            admin_password: "password".into(),
            db_password: "db-password".into(),
        }
    }
}

impl std::fmt::Debug for CredentialsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialsConfig")
            .field("admin_user", &self.admin_user)
            .field("admin_password", &"<redacted>")
            .field("db_password", &"<redacted>")
            .finish()
    }
}

/// Check a duration such as `10m`, `90s` or `1h30m`.
#[must_use]
pub fn is_valid_timeout(value: &str) -> bool {
    let mut rest = value;
    if rest.is_empty() {
        return false;
    }

    while !rest.is_empty() {
        let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
        if digits == 0 {
            return false;
        }
        rest = &rest[digits..];

        let unit = ["ms", "h", "m", "s"]
            .into_iter()
            .find(|unit| rest.starts_with(unit));
        match unit {
            Some(unit) => rest = &rest[unit.len()..],
            None => return false,
        }
    }

    true
}
