//! Versioned, optionally encrypted persistence of the session record.
//!
//! SYSTEM CONTEXT
//! ==============
//! `SessionState` restores its initial record through [`PersistedCredentialStore::load`]
//! and writes every replacement back through [`PersistedCredentialStore::save`].
//!
//! DESIGN
//! ======
//! Every blob is wrapped in an envelope:
//!
//! ```text
//! {"version":1,"encrypted":true,"payload":"<base64 nonce||ciphertext>"}
//! {"version":1,"encrypted":false,"payload":"{\"token\":\"...\"}"}
//! ```
//!
//! Whether payloads are encrypted is fixed when the store is built. An
//! envelope whose `encrypted` flag disagrees with the store is unreadable by
//! definition and treated like corruption.
//!
//! ERROR HANDLING
//! ==============
//! `load` never fails: missing or unreadable data yields the caller's default,
//! which is the logged-out record. Unreadable blobs are removed so the next
//! start does not trip over them again. `save` logs and swallows failures so a
//! broken backend never blocks the in-memory mutation that triggered it.

#[cfg(test)]
#[path = "credentials_test.rs"]
mod credentials_test;

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::cipher::{BlobCipher, CipherError};
use super::{KeyValueStore, StorageError};

pub const ENVELOPE_VERSION: u32 = 1;

#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("stored blob is corrupt: {0}")]
    Corrupt(String),
    #[error("unsupported envelope version {0}")]
    UnsupportedVersion(u32),
    #[error("envelope encrypted={stored} but store expects encrypted={expected}")]
    EncryptionMismatch { stored: bool, expected: bool },
    #[error(transparent)]
    Cipher(#[from] CipherError),
    #[error("failed to encode record: {0}")]
    Encode(#[source] serde_json::Error),
}

#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    version: u32,
    encrypted: bool,
    payload: String,
}

#[derive(Clone)]
pub struct PersistedCredentialStore {
    storage: Arc<dyn KeyValueStore>,
    cipher: Option<Arc<dyn BlobCipher>>,
}

impl PersistedCredentialStore {
    /// Store writing plain JSON payloads.
    pub fn plain(storage: Arc<dyn KeyValueStore>) -> Self {
        Self { storage, cipher: None }
    }

    /// Store sealing every payload with `cipher`.
    pub fn encrypted(storage: Arc<dyn KeyValueStore>, cipher: Arc<dyn BlobCipher>) -> Self {
        Self { storage, cipher: Some(cipher) }
    }

    #[must_use]
    pub fn is_encrypted(&self) -> bool {
        self.cipher.is_some()
    }

    /// Read the record under `key`, falling back to `default` on any failure.
    ///
    /// A blob that was read but cannot be decoded is removed from the slot.
    pub fn load<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        match self.try_load(key) {
            Ok(Some(record)) => record,
            Ok(None) => default,
            Err(PersistError::Storage(e)) => {
                tracing::warn!(key, error = %e, "session storage unavailable; starting logged out");
                default
            }
            Err(e) => {
                tracing::warn!(key, error = %e, "persisted session unreadable; discarding it and starting logged out");
                self.clear(key);
                default
            }
        }
    }

    /// Best-effort write of `record` under `key`.
    pub fn save<T: Serialize>(&self, key: &str, record: &T) {
        if let Err(e) = self.try_save(key, record) {
            tracing::warn!(key, error = %e, "failed to persist session; in-memory state stays authoritative");
        }
    }

    /// Remove the slot entirely. Best-effort, like `save`.
    pub fn clear(&self, key: &str) {
        if let Err(e) = self.storage.remove(key) {
            tracing::warn!(key, error = %e, "failed to clear persisted session");
        }
    }

    pub fn try_load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, PersistError> {
        let Some(raw) = self.storage.get(key)? else {
            return Ok(None);
        };
        let envelope: Envelope = serde_json::from_str(&raw).map_err(|e| PersistError::Corrupt(e.to_string()))?;
        if envelope.version != ENVELOPE_VERSION {
            return Err(PersistError::UnsupportedVersion(envelope.version));
        }
        if envelope.encrypted != self.is_encrypted() {
            return Err(PersistError::EncryptionMismatch {
                stored: envelope.encrypted,
                expected: self.is_encrypted(),
            });
        }

        let json = match &self.cipher {
            Some(cipher) => {
                let bytes = cipher.open(&envelope.payload)?;
                String::from_utf8(bytes).map_err(|e| PersistError::Corrupt(e.to_string()))?
            }
            None => envelope.payload,
        };
        serde_json::from_str(&json)
            .map(Some)
            .map_err(|e| PersistError::Corrupt(e.to_string()))
    }

    pub fn try_save<T: Serialize>(&self, key: &str, record: &T) -> Result<(), PersistError> {
        let json = serde_json::to_string(record).map_err(PersistError::Encode)?;
        let payload = match &self.cipher {
            Some(cipher) => cipher.seal(json.as_bytes())?,
            None => json,
        };
        let envelope = Envelope { version: ENVELOPE_VERSION, encrypted: self.is_encrypted(), payload };
        let raw = serde_json::to_string(&envelope).map_err(PersistError::Encode)?;
        self.storage.set(key, &raw)?;
        Ok(())
    }
}
