//! Identity provider boundary: users, roles, and the bootstrap routine.
//!
//! The engine never authenticates anyone. It consumes resolved identities
//! (id, contact info, role) from an [`IdentityProvider`], which in production
//! fronts whatever account system the deployment uses. The in-memory
//! implementation here backs the test suites and small deployments.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::error::{BookingError, Result};

/// Account role. Exactly three roles exist; authorization decisions match
/// exhaustively on this enum rather than comparing strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Employee,
    Client,
}

impl Role {
    /// All roles, in the order the bootstrap seeds them.
    pub const ALL: [Role; 3] = [Role::Admin, Role::Employee, Role::Client];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Employee => "employee",
            Self::Client => "client",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "employee" => Ok(Self::Employee),
            "client" => Ok(Self::Client),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// A resolved account identity.
///
/// Places and clients embed this value; there is no subtype relationship
/// between them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Stable user id.
    pub user_id: String,
    /// Login name, unique across the provider.
    pub username: String,
    /// Contact email, unique across the provider.
    pub email: String,
    /// Contact phone, unique across the provider.
    pub phone: String,
    /// Account role.
    pub role: Role,
    /// Provisioning key assigned at account creation.
    pub key: String,
}

impl Identity {
    /// Create an identity with a generated id and key.
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
        role: Role,
    ) -> Self {
        Self {
            user_id: uuid::Uuid::new_v4().to_string(),
            username: username.into(),
            email: email.into(),
            phone: phone.into(),
            role,
            key: uuid::Uuid::new_v4().to_string(),
        }
    }
}

/// Read-only identity lookup used by the booking coordinator.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Resolve an identity by username.
    async fn find_by_username(&self, username: &str) -> Result<Option<Identity>>;

    /// Resolve an identity by user id.
    async fn find_by_id(&self, user_id: &str) -> Result<Option<Identity>>;
}

/// Default admin account seeded by [`MemoryIdentityProvider::bootstrap`].
const DEFAULT_ADMIN_USERNAME: &str = "admin";

/// In-memory identity provider.
#[derive(Debug, Default)]
pub struct MemoryIdentityProvider {
    users: RwLock<HashMap<String, Identity>>,
}

impl MemoryIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the default admin account. Safe to run any number of times;
    /// an existing admin is left untouched.
    pub async fn bootstrap(&self) -> Result<Identity> {
        let mut users = self.users.write().await;
        if let Some(existing) = users
            .values()
            .find(|u| u.username == DEFAULT_ADMIN_USERNAME)
        {
            debug!("Bootstrap: default admin already present");
            return Ok(existing.clone());
        }
        let admin = Identity::new(
            DEFAULT_ADMIN_USERNAME,
            "admin@localhost",
            "+00000000000",
            Role::Admin,
        );
        users.insert(admin.user_id.clone(), admin.clone());
        info!("Bootstrap: seeded default admin account");
        Ok(admin)
    }

    /// Register a new identity.
    ///
    /// Duplicates are rejected by email, phone and username independently,
    /// each with its own conflict message.
    pub async fn register(&self, identity: Identity) -> Result<Identity> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == identity.email) {
            return Err(
                BookingError::Conflict("user with this email already exists".to_string()).into(),
            );
        }
        if users.values().any(|u| u.phone == identity.phone) {
            return Err(
                BookingError::Conflict("user with this phone already exists".to_string()).into(),
            );
        }
        if users.values().any(|u| u.username == identity.username) {
            return Err(BookingError::Conflict(
                "user with this username already exists".to_string(),
            )
            .into());
        }
        debug!("Registered identity: {} ({})", identity.username, identity.user_id);
        users.insert(identity.user_id.clone(), identity.clone());
        Ok(identity)
    }

    /// Number of registered identities.
    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    /// True when no identities are registered.
    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

#[async_trait]
impl IdentityProvider for MemoryIdentityProvider {
    async fn find_by_username(&self, username: &str) -> Result<Option<Identity>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.username == username).cloned())
    }

    async fn find_by_id(&self, user_id: &str) -> Result<Option<Identity>> {
        let users = self.users.read().await;
        Ok(users.get(user_id).cloned())
    }
}
