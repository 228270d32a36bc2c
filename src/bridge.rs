//! Non-reactive access to the session for code outside the render tree.
//!
//! SYSTEM CONTEXT
//! ==============
//! Route guards run before any component mounts, request interceptors run in
//! network callbacks, and startup code runs before the Leptos owner exists.
//! None of them can use `use_session`, so they hold a `SessionBridge`.
//!
//! DESIGN
//! ======
//! The bridge owns no data. Every call forwards to the one `SessionState`,
//! and `login`/`logout` go through the same `replace` the reactive hook uses.

#[cfg(test)]
#[path = "bridge_test.rs"]
mod bridge_test;

use crate::state::session::{SessionRecord, SessionState};
use crate::state::store::SubscriptionId;

/// Point-in-time view of the session, taken from a single read.
#[derive(Clone, Debug, PartialEq)]
pub struct AuthSnapshot {
    pub user_info: SessionRecord,
    pub is_login: bool,
}

#[derive(Clone)]
pub struct SessionBridge {
    state: SessionState,
}

impl SessionBridge {
    #[must_use]
    pub fn new(state: SessionState) -> Self {
        Self { state }
    }

    #[must_use]
    pub fn get_auth_state(&self) -> AuthSnapshot {
        let user_info = self.state.current();
        let is_login = user_info.is_login();
        AuthSnapshot { user_info, is_login }
    }

    #[must_use]
    pub fn current(&self) -> SessionRecord {
        self.state.current()
    }

    #[must_use]
    pub fn is_login(&self) -> bool {
        self.state.is_login()
    }

    /// Bearer token for outbound requests, if signed in.
    #[must_use]
    pub fn token(&self) -> Option<String> {
        let record = self.state.current();
        record.is_login().then_some(record.token)
    }

    /// Replace the session with `user_info`.
    pub fn login(&self, user_info: SessionRecord) {
        self.state.replace(user_info);
    }

    /// Reset the session (and its persisted copy) to the logged-out default.
    pub fn logout(&self) {
        self.state.replace(SessionRecord::default());
    }

    pub fn subscribe(&self, f: impl Fn(&SessionRecord) + Send + Sync + 'static) -> SubscriptionId {
        self.state.subscribe(f)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.state.unsubscribe(id)
    }

    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }
}
