//! Session store: the single credential slot
//!
//! The stored credential record is both the only "user account" and the
//! session marker. Presence means logged in.

use tracing::{debug, warn};

use crate::error::Result;
use crate::models::Credential;
use crate::storage::SharedStorage;

/// Storage key holding the serialized credential record
pub const DEFAULT_SESSION_KEY: &str = "user";

/// Typed access to the credential slot of a storage backend
#[derive(Clone)]
pub struct SessionStore {
    storage: SharedStorage,
    key: String,
}

impl SessionStore {
    pub fn new(storage: SharedStorage) -> Self {
        Self::with_key(storage, DEFAULT_SESSION_KEY)
    }

    pub fn with_key(storage: SharedStorage, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    /// Name of the underlying backend
    pub fn backend_name(&self) -> &str {
        self.storage.name()
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Serialize and write the record, replacing whatever was there
    pub fn save(&self, credential: &Credential) -> Result<()> {
        let value = serde_json::to_string(credential)?;
        self.storage.set(&self.key, &value)?;
        debug!(key = %self.key, email = %credential.email, "Saved credential record");
        Ok(())
    }

    /// Read the record
    ///
    /// Absent, unparseable and incomplete records all load as `None`.
    pub fn load(&self) -> Result<Option<Credential>> {
        let Some(raw) = self.storage.get(&self.key)? else {
            return Ok(None);
        };

        match serde_json::from_str::<Credential>(&raw) {
            Ok(credential) if credential.is_well_formed() => Ok(Some(credential)),
            Ok(_) => {
                warn!(key = %self.key, "Stored credential record is incomplete, treating as absent");
                Ok(None)
            }
            Err(e) => {
                warn!(key = %self.key, error = %e, "Stored credential record is malformed, treating as absent");
                Ok(None)
            }
        }
    }

    /// Remove the record
    pub fn clear(&self) -> Result<()> {
        self.storage.remove(&self.key)?;
        debug!(key = %self.key, "Cleared credential record");
        Ok(())
    }

    /// Whether a usable record is present
    pub fn is_active(&self) -> Result<bool> {
        Ok(self.load()?.is_some())
    }
}
