use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use async_trait::async_trait;
use rusqlite::Connection;

use crate::db::queries;
use crate::models::{Role, User};

/// A phone number or email a user signs in with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    Phone(String),
    Email(String),
}

impl Identity {
    /// Accepts a 10-digit mobile number (optionally prefixed with +91 and
    /// spaced out) or an email address.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.contains('@') {
            let email = raw.to_lowercase();
            let (local, domain) = email.split_once('@')?;
            if local.is_empty() || domain.is_empty() {
                return None;
            }
            return Some(Identity::Email(email));
        }

        let digits: String = raw.chars().filter(|c| !c.is_whitespace() && *c != '-').collect();
        let digits = digits.strip_prefix("+91").unwrap_or(&digits);
        if digits.len() == 10 && digits.chars().all(|c| c.is_ascii_digit()) {
            Some(Identity::Phone(digits.to_string()))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Identity::Phone(p) => p,
            Identity::Email(e) => e,
        }
    }
}

/// Resolves a verified identity to the user record that decides its role.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn resolve(&self, identity: &Identity) -> anyhow::Result<User>;
}

/// Looks users up in the local user table; unknown identities are registered
/// as new customers.
pub struct DirectoryIdentityProvider {
    db: Arc<Mutex<Connection>>,
}

impl DirectoryIdentityProvider {
    pub fn new(db: Arc<Mutex<Connection>>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl IdentityProvider for DirectoryIdentityProvider {
    async fn resolve(&self, identity: &Identity) -> anyhow::Result<User> {
        let db = self.db.lock().map_err(|_| anyhow!("database lock poisoned"))?;

        if let Some(user) = queries::find_user_by_identity(&db, identity)? {
            return Ok(user);
        }

        let user = queries::create_user(&db, identity, Role::Customer)?;
        tracing::info!(user_id = %user.id, "registered new customer");
        Ok(user)
    }
}
