//! Navigation-side session enforcement.
//!
//! ARCHITECTURE
//! ============
//! `guard` decides allow/redirect for one navigation from the route policy and
//! the session bridge. `navigator` is the injected capability that performs
//! imperative navigation once the router is up. `redirect` builds and parses
//! the `?redirect=` round trip through the login page.

pub mod guard;
pub mod navigator;
pub mod redirect;
