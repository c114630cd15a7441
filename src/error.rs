use thiserror::Error;

use crate::domain::error::DomainError;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

/// Provisioning and teardown failures.
///
/// `ConcurrentAttempt` is informational: it is reported to the caller as a
/// single log line and never changes the store's state.
#[derive(Error, Debug)]
pub enum ProvisionError {
    #[error("failed to launch {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("deployment failed with exit code {code}")]
    ProcessFailure { code: i32 },

    #[error("provisioning already in progress for store {store_id}")]
    ConcurrentAttempt { store_id: String },

    #[error("failed to persist store state: {0}")]
    Persistence(String),

    #[error("teardown step '{step}' exited with code {code}")]
    TeardownPartialFailure { step: &'static str, code: i32 },

    #[error("failed to supervise process: {0}")]
    Supervision(#[source] std::io::Error),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Provision(#[from] ProvisionError),

    #[error("store not found: {0}")]
    NotFound(String),

    #[error("WebSocket error: {0}")]
    WebSocket(Box<tokio_tungstenite::tungstenite::Error>),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("parse error: {0}")]
    Parse(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<tokio_tungstenite::tungstenite::Error> for Error {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        Error::WebSocket(Box::new(err))
    }
}
