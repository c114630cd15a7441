//! Application configuration loading and validation.
//!
//! Provides the main [`Config`] struct that aggregates all application settings.
//! Configuration is loaded from a TOML file with environment variable overrides
//! for sensitive values like `STOREFORGE_ADMIN_PASSWORD`.
//!
//! # Example
//!
//! ```no_run
//! use storeforge::infrastructure::config::settings::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("config.toml")?;
//!     config.init_logging();
//!     Ok(())
//! }
//! ```

use serde::Deserialize;
use std::path::Path;

use super::deploy::{is_valid_timeout, CredentialsConfig, DeployConfig};
use super::logging::LoggingConfig;
use super::server::ServerConfig;
use crate::error::{ConfigError, Result};

/// Overrides the admin password handed to the chart.
pub const ENV_ADMIN_PASSWORD: &str = "STOREFORGE_ADMIN_PASSWORD";
/// Overrides the database password handed to the chart.
pub const ENV_DB_PASSWORD: &str = "STOREFORGE_DB_PASSWORD";
/// Overrides the SQLite database path.
pub const ENV_DATABASE: &str = "STOREFORGE_DATABASE";

/// Main application configuration.
///
/// Every section is optional; an empty file yields a configuration that
/// drives `helm` and `kubectl` from `PATH` against the local chart.
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Logging and tracing configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Deployment tool settings.
    #[serde(default)]
    pub deploy: DeployConfig,

    /// Credentials passed to the chart and reported for READY stores.
    #[serde(default)]
    pub credentials: CredentialsConfig,

    /// Relay server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Path to SQLite database file.
    ///
    /// Defaults to "storeforge.db" in the current directory.
    #[serde(default = "default_database_path")]
    pub database: String,
}

fn default_database_path() -> String {
    "storeforge.db".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            logging: LoggingConfig::default(),
            deploy: DeployConfig::default(),
            credentials: CredentialsConfig::default(),
            server: ServerConfig::default(),
            database: default_database_path(),
        }
    }
}

impl Config {
    /// Parse configuration from TOML content.
    ///
    /// Secrets are read from the process environment afterwards, so they
    /// never need to live in the config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML content is malformed or validation fails.
    pub fn parse_toml(content: &str) -> Result<Self> {
        Self::parse_toml_with_env(content, |key| std::env::var(key).ok())
    }

    /// Parse configuration using `lookup` in place of the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML content is malformed or validation fails.
    pub fn parse_toml_with_env<F>(content: &str, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.apply_env_overrides(lookup);
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read
    /// - The TOML content is malformed
    /// - Validation fails
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Load `path` if it exists, otherwise start from defaults.
    ///
    /// Environment overrides apply either way.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing file is unreadable or invalid.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Self::parse_toml("")
        }
    }

    fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(password) = lookup(ENV_ADMIN_PASSWORD) {
            self.credentials.admin_password = password;
        }
        if let Some(password) = lookup(ENV_DB_PASSWORD) {
            self.credentials.db_password = password;
        }
        if let Some(database) = lookup(ENV_DATABASE) {
            self.database = database;
        }
    }

    /// Validate configuration values.
    fn validate(&self) -> Result<()> {
        if self.deploy.helm_bin.trim().is_empty() {
            return Err(ConfigError::MissingField { field: "helm_bin" }.into());
        }
        if self.deploy.kubectl_bin.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "kubectl_bin",
            }
            .into());
        }
        if self.deploy.chart.trim().is_empty() {
            return Err(ConfigError::MissingField { field: "chart" }.into());
        }
        if !is_valid_timeout(&self.deploy.wait_timeout) {
            return Err(ConfigError::InvalidValue {
                field: "wait_timeout",
                reason: format!(
                    "'{}' is not a duration like 10m or 1h30m",
                    self.deploy.wait_timeout
                ),
            }
            .into());
        }
        if self.credentials.admin_user.is_empty() {
            return Err(ConfigError::MissingField {
                field: "admin_user",
            }
            .into());
        }
        if self.server.log_channel_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                field: "log_channel_capacity",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if !self.logging.has_known_format() {
            return Err(ConfigError::InvalidValue {
                field: "format",
                reason: "must be 'pretty' or 'json'".to_string(),
            }
            .into());
        }
        if self.database.is_empty() {
            return Err(ConfigError::MissingField { field: "database" }.into());
        }
        Ok(())
    }

    /// Initialize logging based on configuration.
    pub fn init_logging(&self) {
        self.logging.init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn empty_file_uses_defaults() {
        let config = Config::parse_toml_with_env("", no_env).unwrap();

        assert_eq!(config.deploy.helm_bin, "helm");
        assert_eq!(config.deploy.namespace_prefix, "store-");
        assert_eq!(config.deploy.host_suffix, "localhost");
        assert_eq!(config.deploy.wait_timeout, "10m");
        assert_eq!(config.credentials.admin_user, "user");
        assert_eq!(config.server.bind, "127.0.0.1:8000");
        assert_eq!(config.database, "storeforge.db");
    }

    #[test]
    fn sections_override_defaults() {
        let toml = r#"
            database = "/var/lib/storeforge.db"

            [deploy]
            chart = "oci://registry.example/woocommerce"
            wait_timeout = "15m"

            [logging]
            level = "debug"
            format = "json"
        "#;
        let config = Config::parse_toml_with_env(toml, no_env).unwrap();

        assert_eq!(config.deploy.chart, "oci://registry.example/woocommerce");
        assert_eq!(config.deploy.wait_timeout, "15m");
        assert_eq!(config.deploy.helm_bin, "helm");
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.database, "/var/lib/storeforge.db");
    }

    #[test]
    fn environment_overrides_secrets_and_database() {
        let lookup = |key: &str| match key {
            ENV_ADMIN_PASSWORD => Some("s3cret".to_string()),
            ENV_DB_PASSWORD => Some("db-s3cret".to_string()),
            ENV_DATABASE => Some(":memory:".to_string()),
            _ => None,
        };
        let config = Config::parse_toml_with_env("", lookup).unwrap();

        assert_eq!(config.credentials.admin_password, "s3cret");
        assert_eq!(config.credentials.db_password, "db-s3cret");
        assert_eq!(config.database, ":memory:");
    }

    #[test]
    fn malformed_timeout_is_rejected() {
        let err = Config::parse_toml_with_env("[deploy]\nwait_timeout = \"soon\"", no_env)
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::InvalidValue {
                field: "wait_timeout",
                ..
            })
        ));
    }

    #[test]
    fn empty_binary_is_rejected() {
        let err =
            Config::parse_toml_with_env("[deploy]\nhelm_bin = \"\"", no_env).unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::MissingField { field: "helm_bin" })
        ));
    }

    #[test]
    fn zero_channel_capacity_is_rejected() {
        let err = Config::parse_toml_with_env("[server]\nlog_channel_capacity = 0", no_env)
            .unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn unknown_log_format_is_rejected() {
        let err =
            Config::parse_toml_with_env("[logging]\nformat = \"xml\"", no_env).unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::InvalidValue { field: "format", .. })
        ));
    }

    #[test]
    fn invalid_toml_is_a_parse_error() {
        let err = Config::parse_toml_with_env("[deploy", no_env).unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::Parse(_))));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = Config::load("/nonexistent/storeforge/config.toml").unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::ReadFile(_))));
    }

    #[test]
    fn load_or_default_reads_existing_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, b"[deploy]\nhost_suffix = \"shops.test\"\n").unwrap();

        let config = Config::load_or_default(file.path()).unwrap();
        assert_eq!(config.deploy.host_suffix, "shops.test");
    }

    #[test]
    fn load_or_default_falls_back_to_defaults() {
        let config = Config::load_or_default("/nonexistent/storeforge/config.toml").unwrap();
        assert_eq!(config.deploy.chart, "charts/woocommerce");
    }
}
