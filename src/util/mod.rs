//! Small shared helpers.
//!
//! SYSTEM CONTEXT
//! ==============
//! `late_bound` models capabilities that exist only after application start
//! (router navigation, the session bridge seen by early consumers). `auth`
//! holds the Leptos glue that applies route guard redirects inside the
//! component tree.

pub mod auth;
pub mod late_bound;
