use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::storage::LocalStore;

const STORE_KEY: &str = "session";

/// Identity of the signed-in user. Authentication itself happens in the
/// session authority, this core only checks for presence.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Principal(pub String);

impl std::fmt::Display for Principal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Session gate over the durable store
pub struct Session {
    store: Arc<dyn LocalStore>,
}

impl Session {
    pub fn new(store: Arc<dyn LocalStore>) -> Self {
        Self { store }
    }

    pub fn current_principal(&self) -> Result<Option<Principal>> {
        let Some(data) = self.store.get(STORE_KEY)? else {
            return Ok(None);
        };

        let mut deserializer = serde_json::Deserializer::from_slice(&data);
        let stored: StoredSession =
            serde_path_to_error::deserialize(&mut deserializer).context("failed to parse session")?;
        Ok(Some(stored.principal))
    }

    pub fn require_principal(&self) -> Result<Principal> {
        self.current_principal()?.ok_or_else(|| SessionError::NoSession.into())
    }

    pub fn login(&self, principal: Principal) -> Result<()> {
        let data = serde_json::to_vec_pretty(&StoredSession { principal })
            .context("failed to serialize session")?;
        self.store.set(STORE_KEY, &data)
    }

    /// Clears the session key only. The stored master secret survives a
    /// logout, erasing it is a separate explicit operation.
    pub fn logout(&self) -> Result<()> {
        self.store.remove(STORE_KEY)
    }
}

#[derive(Serialize, Deserialize)]
struct StoredSession {
    principal: Principal,
}

#[derive(thiserror::Error, Debug)]
pub enum SessionError {
    #[error("no active session")]
    NoSession,
}
