//! Canonical test configurations.
//!
//! Single source of truth for config structs used across tests.

use crate::infrastructure::config::deploy::{CredentialsConfig, DeployConfig};
use crate::infrastructure::config::settings::Config;

/// Deployment settings with the stock binaries and chart.
pub fn deploy() -> DeployConfig {
    DeployConfig::default()
}

/// The placeholder credentials.
pub fn credentials() -> CredentialsConfig {
    CredentialsConfig::default()
}

/// Full configuration backed by an in-memory database.
pub fn app_config() -> Config {
    Config {
        database: ":memory:".to_string(),
        ..Config::default()
    }
}
