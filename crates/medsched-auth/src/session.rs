//! Token-based identity provider.
//!
//! Login verifies credentials against the directory and issues an opaque
//! bearer token backed by a concurrent session map. Tokens are plain UUIDs;
//! nothing is encoded in them.

use dashmap::DashMap;
use medsched_core::{CoreError, Person, Result};
use medsched_directory::SharedDirectory;
use std::sync::Arc;
use uuid::Uuid;

use crate::credentials::verify_password;

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub person: Person,
}

/// Authenticates logins and resolves bearer tokens back to identities.
pub struct IdentityProvider {
    directory: SharedDirectory,
    sessions: DashMap<Uuid, Uuid>,
}

impl IdentityProvider {
    pub fn new(directory: SharedDirectory) -> Self {
        Self {
            directory,
            sessions: DashMap::new(),
        }
    }

    pub fn new_shared(directory: SharedDirectory) -> Arc<Self> {
        Arc::new(Self::new(directory))
    }

    /// Verify credentials and open a session.
    ///
    /// A single `Authorization` error covers unknown email and wrong password;
    /// callers cannot probe which one failed.
    pub fn login(&self, email: &str, password: &str) -> Result<Session> {
        let person = self
            .directory
            .find_by_email(email)
            .filter(|p| verify_password(password, &p.password_hash))
            .ok_or_else(|| CoreError::authorization("invalid credentials"))?;

        let token = medsched_core::generate_id();
        self.sessions.insert(token, person.id);
        tracing::debug!(person_id = %person.id, role = %person.role, "session opened");
        Ok(Session {
            token: token.to_string(),
            person,
        })
    }

    /// Resolve a bearer token to the identity behind it.
    pub fn identity(&self, token: &str) -> Result<Person> {
        let token = Uuid::parse_str(token)
            .map_err(|_| CoreError::authorization("invalid token"))?;
        let person_id = self
            .sessions
            .get(&token)
            .map(|entry| *entry)
            .ok_or_else(|| CoreError::authorization("invalid token"))?;
        // A person removed from the directory invalidates the session too.
        self.directory
            .get(person_id)
            .map_err(|_| CoreError::authorization("invalid token"))
    }

    /// Drop a session; idempotent.
    pub fn logout(&self, token: &str) {
        if let Ok(token) = Uuid::parse_str(token) {
            self.sessions.remove(&token);
        }
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}
