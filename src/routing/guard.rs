//! Route guard consulted by the router before committing a navigation.
//!
//! SYSTEM CONTEXT
//! ==============
//! Runs before any component of the target route mounts, so it reads the
//! session through `SessionBridge` and never through a hook.
//!
//! DESIGN
//! ======
//! One evaluation is `Evaluating -> Allowed | Redirected`. `check` returns
//! `Ok(())` for Allowed and `Err(Redirect)` for Redirected; the router must
//! abort the protected navigation and go to `Redirect::location` instead.
//! Evaluation is synchronous and never mutates the session.
//!
//! ERROR HANDLING
//! ==============
//! A guard evaluated before the bridge is bound (startup race) treats the
//! user as logged out and redirects.

#[cfg(test)]
#[path = "guard_test.rs"]
mod guard_test;

use serde_json::{Map, Value};

use super::redirect::login_redirect;
use crate::bridge::SessionBridge;
use crate::config::DEFAULT_LOGIN_PATH;
use crate::util::late_bound::LateBound;

/// Per-route access policy, built alongside the route table.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RoutePolicy {
    /// Route requires an authenticated session.
    pub auth: bool,
    /// Opaque route metadata (title, layout hints, ...). Not read by the guard.
    pub meta: Map<String, Value>,
}

impl RoutePolicy {
    #[must_use]
    pub fn public() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn protected() -> Self {
        Self { auth: true, meta: Map::new() }
    }

    #[must_use]
    pub fn with_meta(mut self, key: impl Into<String>, value: Value) -> Self {
        self.meta.insert(key.into(), value);
        self
    }
}

/// Target of the navigation being evaluated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NavigationArgs {
    pub pathname: String,
    /// Query string without the leading `?`.
    pub search: String,
}

impl NavigationArgs {
    pub fn new(pathname: impl Into<String>, search: impl Into<String>) -> Self {
        let search: String = search.into();
        let search = search.strip_prefix('?').unwrap_or(&search).to_owned();
        Self { pathname: pathname.into(), search }
    }

    /// Split `"/path?query"` into its parts.
    #[must_use]
    pub fn parse(location: &str) -> Self {
        match location.split_once('?') {
            Some((pathname, search)) => Self::new(pathname, search),
            None => Self::new(location, ""),
        }
    }

    /// Original path plus query, as carried in the redirect parameter.
    #[must_use]
    pub fn location(&self) -> String {
        if self.search.is_empty() {
            self.pathname.clone()
        } else {
            format!("{}?{}", self.pathname, self.search)
        }
    }
}

/// Abort-and-redirect signal for an unauthenticated navigation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("authentication required; redirecting to {location}")]
pub struct Redirect {
    pub location: String,
}

#[derive(Clone)]
pub struct RouteGuard {
    session: LateBound<SessionBridge>,
    login_path: String,
}

impl RouteGuard {
    /// Guard reading the session through `session`, which may still be unbound.
    pub fn new(session: LateBound<SessionBridge>, login_path: impl Into<String>) -> Self {
        Self { session, login_path: login_path.into() }
    }

    /// Guard over an already-available bridge using the default login route.
    #[must_use]
    pub fn for_bridge(bridge: SessionBridge) -> Self {
        Self::new(LateBound::bound(bridge), DEFAULT_LOGIN_PATH)
    }

    #[must_use]
    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    /// Decide whether the navigation described by `nav` may proceed.
    pub fn check(&self, policy: &RoutePolicy, nav: &NavigationArgs) -> Result<(), Redirect> {
        if !policy.auth {
            return Ok(());
        }

        let is_login = self.session.with(SessionBridge::is_login).unwrap_or_else(|| {
            tracing::warn!(path = %nav.pathname, "route guard ran before the session bridge was bound; treating as logged out");
            false
        });
        if is_login {
            return Ok(());
        }

        let location = login_redirect(&self.login_path, &nav.location());
        tracing::debug!(path = %nav.pathname, %location, "unauthenticated navigation redirected");
        Err(Redirect { location })
    }
}
