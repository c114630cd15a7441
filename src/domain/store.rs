//! Store aggregate and its lifecycle.
//!
//! A store moves from [`StoreStatus::Provisioning`] to exactly one terminal
//! status. Connection details live inside the READY variant of
//! [`Lifecycle`], so a store can never expose an endpoint while it is still
//! provisioning or after it failed.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::id::{OwnerId, StoreId};

/// Longest name whose `store-` namespace still fits a 63 byte DNS label.
pub const MAX_NAME_LEN: usize = 57;

/// Validated store name.
///
/// Names are lowercase DNS labels because they are embedded in the
/// cluster namespace and the ingress hostname.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StoreName(String);

impl StoreName {
    /// Validate and wrap a store name.
    pub fn parse(name: &str) -> Result<Self, DomainError> {
        let reject = |reason| DomainError::InvalidStoreName {
            name: name.to_string(),
            reason,
        };

        if name.is_empty() {
            return Err(reject("name cannot be empty"));
        }
        if name.len() > MAX_NAME_LEN {
            return Err(reject("name is longer than 57 characters"));
        }
        if !name
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
        {
            return Err(reject(
                "only lowercase letters, digits and '-' are allowed",
            ));
        }
        if name.starts_with('-') || name.ends_with('-') {
            return Err(reject("name must start and end with a letter or digit"));
        }

        Ok(Self(name.to_string()))
    }

    /// Get the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StoreName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for StoreName {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<StoreName> for String {
    fn from(name: StoreName) -> Self {
        name.0
    }
}

/// Externally visible lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StoreStatus {
    Provisioning,
    Ready,
    Failed,
}

impl StoreStatus {
    /// Stable string form used in storage and on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Provisioning => "PROVISIONING",
            Self::Ready => "READY",
            Self::Failed => "FAILED",
        }
    }
}

impl fmt::Display for StoreStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StoreStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PROVISIONING" => Ok(Self::Provisioning),
            "READY" => Ok(Self::Ready),
            "FAILED" => Ok(Self::Failed),
            other => Err(format!("unknown store status '{other}'")),
        }
    }
}

/// Administrator credentials for a provisioned store.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminPrincipal {
    pub username: String,
    pub password: String,
}

impl AdminPrincipal {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for AdminPrincipal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminPrincipal")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Connection details of a READY store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub url: String,
    pub admin: AdminPrincipal,
}

/// Lifecycle state, carrying connection details only when READY.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lifecycle {
    Provisioning,
    Ready(Endpoint),
    Failed,
}

impl Lifecycle {
    #[must_use]
    pub fn status(&self) -> StoreStatus {
        match self {
            Self::Provisioning => StoreStatus::Provisioning,
            Self::Ready(_) => StoreStatus::Ready,
            Self::Failed => StoreStatus::Failed,
        }
    }
}

/// Wire form of a READY store's connection details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionDetails {
    pub url: String,
    pub admin_user: String,
    pub admin_password: String,
}

/// An independently provisioned application instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Store {
    id: StoreId,
    name: StoreName,
    lifecycle: Lifecycle,
    owner: OwnerId,
    created_at: DateTime<Utc>,
}

impl Store {
    /// Create a new store record in PROVISIONING.
    #[must_use]
    pub fn new(name: StoreName, owner: OwnerId) -> Self {
        Self {
            id: StoreId::new(),
            name,
            lifecycle: Lifecycle::Provisioning,
            owner,
            created_at: Utc::now(),
        }
    }

    /// Rebuild a store from persisted parts.
    #[must_use]
    pub fn restore(
        id: StoreId,
        name: StoreName,
        lifecycle: Lifecycle,
        owner: OwnerId,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            lifecycle,
            owner,
            created_at,
        }
    }

    #[must_use]
    pub fn id(&self) -> &StoreId {
        &self.id
    }

    #[must_use]
    pub fn name(&self) -> &StoreName {
        &self.name
    }

    #[must_use]
    pub fn owner(&self) -> &OwnerId {
        &self.owner
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    #[must_use]
    pub fn status(&self) -> StoreStatus {
        self.lifecycle.status()
    }

    /// Endpoint URL, present only when READY.
    #[must_use]
    pub fn endpoint_url(&self) -> Option<&str> {
        match &self.lifecycle {
            Lifecycle::Ready(endpoint) => Some(&endpoint.url),
            _ => None,
        }
    }

    /// Admin credentials, present only when READY.
    #[must_use]
    pub fn admin_principal(&self) -> Option<&AdminPrincipal> {
        match &self.lifecycle {
            Lifecycle::Ready(endpoint) => Some(&endpoint.admin),
            _ => None,
        }
    }

    /// Connection details in wire form, present only when READY.
    #[must_use]
    pub fn connection_details(&self) -> Option<ConnectionDetails> {
        match &self.lifecycle {
            Lifecycle::Ready(endpoint) => Some(ConnectionDetails {
                url: endpoint.url.clone(),
                admin_user: endpoint.admin.username.clone(),
                admin_password: endpoint.admin.password.clone(),
            }),
            _ => None,
        }
    }

    pub fn mark_ready(&mut self, endpoint: Endpoint) {
        self.lifecycle = Lifecycle::Ready(endpoint);
    }

    pub fn mark_failed(&mut self) {
        self.lifecycle = Lifecycle::Failed;
    }

    /// Send a FAILED store back to PROVISIONING for an explicit retry.
    pub fn reset_for_retry(&mut self) -> Result<(), DomainError> {
        match self.lifecycle {
            Lifecycle::Failed => {
                self.lifecycle = Lifecycle::Provisioning;
                Ok(())
            }
            _ => Err(DomainError::InvalidTransition {
                from: self.status(),
                to: StoreStatus::Provisioning,
            }),
        }
    }
}
