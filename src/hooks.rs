//! Reactive adapters exposing shared state to Leptos components.
//!
//! SYSTEM CONTEXT
//! ==============
//! Components call [`use_session`] / [`use_loading`]; the bridge and loading
//! state are provided as context by `app::provide_session_context`.
//!
//! DESIGN
//! ======
//! Hooks keep no copy of the record. A subscription on the shared state pokes
//! an `ArcTrigger`, and every accessor tracks that trigger and then reads
//! the live state, so a render can never see a value that drifted from what
//! the bridge returns. The subscription is dropped with the owning scope.

#[cfg(test)]
#[path = "hooks_test.rs"]
mod hooks_test;

use leptos::prelude::*;

use crate::bridge::SessionBridge;
use crate::state::loading::LoadingState;
use crate::state::session::SessionRecord;

#[derive(Clone)]
pub struct SessionHook {
    bridge: SessionBridge,
    trigger: ArcTrigger,
}

impl SessionHook {
    /// Current record; re-runs the calling effect/view on change.
    pub fn user_info(&self) -> SessionRecord {
        self.trigger.track();
        self.bridge.current()
    }

    pub fn is_login(&self) -> bool {
        self.trigger.track();
        self.bridge.is_login()
    }

    pub fn login(&self, user_info: SessionRecord) {
        self.bridge.login(user_info);
    }

    pub fn logout(&self) {
        self.bridge.logout();
    }

    /// `is_login` as a derived signal for `<Show when=...>` and friends.
    pub fn is_login_signal(&self) -> Signal<bool> {
        let hook = self.clone();
        Signal::derive(move || hook.is_login())
    }
}

/// Session hook backed by the bridge found in context.
///
/// # Panics
///
/// Panics if `provide_session_context` was not called by an ancestor.
pub fn use_session() -> SessionHook {
    use_session_with(&expect_context::<SessionBridge>())
}

/// Session hook backed by an explicit bridge.
pub fn use_session_with(bridge: &SessionBridge) -> SessionHook {
    let trigger = ArcTrigger::new();
    let notifier = trigger.clone();
    let id = bridge.subscribe(move |_| notifier.notify());

    let owner_bridge = bridge.clone();
    on_cleanup(move || {
        owner_bridge.unsubscribe(id);
    });

    SessionHook { bridge: bridge.clone(), trigger }
}

#[derive(Clone)]
pub struct LoadingHook {
    loading: LoadingState,
    trigger: ArcTrigger,
}

impl LoadingHook {
    pub fn is_loading(&self) -> bool {
        self.trigger.track();
        self.loading.is_loading()
    }
}

/// Loading hook backed by the loading state found in context.
///
/// # Panics
///
/// Panics if `provide_session_context` was not called by an ancestor.
pub fn use_loading() -> LoadingHook {
    use_loading_with(&expect_context::<LoadingState>())
}

pub fn use_loading_with(loading: &LoadingState) -> LoadingHook {
    let trigger = ArcTrigger::new();
    let notifier = trigger.clone();
    let id = loading.subscribe(move |_| notifier.notify());

    let owner_loading = loading.clone();
    on_cleanup(move || {
        owner_loading.unsubscribe(id);
    });

    LoadingHook { loading: loading.clone(), trigger }
}
