//! Shared auth UI helpers.
//!
//! SYSTEM CONTEXT
//! ==============
//! Protected route components install the guard once; it re-evaluates when
//! the location or the session changes, so a logout while on a protected page
//! redirects exactly like a fresh navigation would.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use leptos::prelude::*;
use leptos_router::NavigateOptions;
use leptos_router::hooks::use_location;

use crate::hooks::SessionHook;
use crate::routing::guard::{NavigationArgs, RouteGuard, RoutePolicy};

/// Redirect to the login route whenever `policy` rejects the current location.
pub fn install_route_guard<F>(guard: RouteGuard, policy: RoutePolicy, session: SessionHook, navigate: F)
where
    F: Fn(&str, NavigateOptions) + Clone + 'static,
{
    let location = use_location();
    Effect::new(move || {
        // Tracked only so the effect re-runs on login/logout.
        let _ = session.is_login();
        let pathname = location.pathname.get();
        let search = location.search.get();
        if let Some(target) = redirect_target(&guard, &policy, &pathname, &search) {
            navigate(&target, redirect_options());
        }
    });
}

/// Login location for an unauthenticated visit to `pathname?search`, if any.
pub fn redirect_target(guard: &RouteGuard, policy: &RoutePolicy, pathname: &str, search: &str) -> Option<String> {
    guard
        .check(policy, &NavigationArgs::new(pathname, search))
        .err()
        .map(|redirect| redirect.location)
}

/// Guard redirects replace the aborted entry instead of stacking on it.
#[must_use]
pub fn redirect_options() -> NavigateOptions {
    NavigateOptions { replace: true, ..NavigateOptions::default() }
}
