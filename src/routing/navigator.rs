//! Imperative navigation capability bound by the router at startup.
//!
//! DESIGN
//! ======
//! Code outside components (the request layer reacting to a 401, startup
//! code) needs to navigate without a router handle. The router binds a
//! callback into a shared [`Navigator`] once it is mounted; until then, and
//! after teardown, `navigate` logs a warning and does nothing. Calls made
//! while unbound are dropped, never queued.

#[cfg(test)]
#[path = "navigator_test.rs"]
mod navigator_test;

use std::sync::Arc;

use super::guard::Redirect;
use crate::util::late_bound::LateBound;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NavigateMode {
    /// Add a history entry.
    #[default]
    Push,
    /// Replace the current history entry.
    Replace,
}

type NavigateFn = Arc<dyn Fn(&str, NavigateMode) + Send + Sync>;

#[derive(Clone, Default)]
pub struct Navigator {
    target: LateBound<NavigateFn>,
}

impl Navigator {
    /// Navigator in the unbound state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind the router's navigate function.
    pub fn bind(&self, navigate: impl Fn(&str, NavigateMode) + Send + Sync + 'static) {
        if self.target.bind(Arc::new(navigate)).is_some() {
            tracing::debug!("navigator rebound");
        }
    }

    /// Return to the unbound state (router teardown).
    pub fn unbind(&self) {
        self.target.unbind();
    }

    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.target.is_bound()
    }

    /// Navigate to `to`. Returns `false` (and logs) when no router is bound.
    pub fn navigate(&self, to: &str, mode: NavigateMode) -> bool {
        let Some(navigate) = self.target.get() else {
            tracing::warn!(to, "navigate called before the router bound its navigator; ignoring");
            return false;
        };
        navigate(to, mode);
        true
    }

    /// Apply a guard redirect, replacing the aborted entry in history.
    pub fn follow(&self, redirect: &Redirect) -> bool {
        self.navigate(&redirect.location, NavigateMode::Replace)
    }

    /// Bind to full-page navigation through `window.location`.
    #[cfg(feature = "hydrate")]
    pub fn bind_window_location(&self) {
        self.bind(|to, mode| {
            let Some(window) = web_sys::window() else {
                return;
            };
            let location = window.location();
            let result = match mode {
                NavigateMode::Push => location.assign(to),
                NavigateMode::Replace => location.replace(to),
            };
            if result.is_err() {
                tracing::warn!(to, "window.location navigation failed");
            }
        });
    }
}
