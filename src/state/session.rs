//! Canonical in-memory session for the current browser user.
//!
//! SYSTEM CONTEXT
//! ==============
//! Exactly one `SessionState` exists per application. Route guards and the
//! HTTP layer reach it through `SessionBridge`; components reach it through
//! `use_session`. Both paths end in [`SessionState::replace`].
//!
//! DESIGN
//! ======
//! `replace` is the only mutation and always swaps the whole record. The
//! order of effects is fixed: in-memory swap, then persistence, then
//! subscriber notification. Readers that run inside a notification therefore
//! see the new record, and the backend has already been handed it.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::store::{Store, SubscriptionId};
use crate::storage::credentials::PersistedCredentialStore;

/// Serialized identity of the signed-in user.
///
/// An empty `token` means "no session". Any other identity fields ride along
/// in `profile` and are always replaced together with the token.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    #[serde(default)]
    pub token: String,
    #[serde(flatten)]
    pub profile: Map<String, Value>,
}

impl SessionRecord {
    #[must_use]
    pub fn with_token(token: impl Into<String>) -> Self {
        Self { token: token.into(), profile: Map::new() }
    }

    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.profile.insert(key.into(), value);
        self
    }

    #[must_use]
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.profile.get(key)
    }

    #[must_use]
    pub fn is_login(&self) -> bool {
        !self.token.is_empty()
    }
}

#[derive(Clone)]
pub struct SessionState {
    store: Store<SessionRecord>,
    persistence: PersistedCredentialStore,
    key: Arc<str>,
}

impl SessionState {
    /// Build the state from whatever is persisted under `key`.
    ///
    /// Anything unreadable yields the logged-out default record.
    pub fn restore(persistence: PersistedCredentialStore, key: impl Into<Arc<str>>) -> Self {
        let key = key.into();
        let record = persistence.load(&key, SessionRecord::default());
        tracing::debug!(key = %key, is_login = record.is_login(), "session restored");
        Self { store: Store::new(record), persistence, key }
    }

    /// Latest record.
    #[must_use]
    pub fn current(&self) -> SessionRecord {
        self.store.get()
    }

    #[must_use]
    pub fn is_login(&self) -> bool {
        self.store.with(SessionRecord::is_login)
    }

    /// Swap in `record`, persist it, then notify subscribers.
    pub fn replace(&self, record: SessionRecord) {
        let was_login = self.is_login();
        let persistence = &self.persistence;
        let key = &self.key;
        self.store.replace_then(record, |next| {
            if was_login != next.is_login() {
                tracing::info!(is_login = next.is_login(), "session changed");
            }
            persistence.save(key, next);
        });
    }

    pub fn subscribe(&self, f: impl Fn(&SessionRecord) + Send + Sync + 'static) -> SubscriptionId {
        self.store.subscribe(f)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.store.unsubscribe(id)
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.store.subscriber_count()
    }

    #[must_use]
    pub fn storage_key(&self) -> &str {
        &self.key
    }
}
