//! # sessionkit
//!
//! Session and auth state orchestration for Leptos + WASM clients.
//!
//! One canonical [`state::session::SessionState`] is shared by reactive
//! rendering code ([`hooks`]) and by non-reactive consumers that run outside
//! the render tree: route guards ([`routing::guard`]), the HTTP layer
//! ([`net`]) and startup code ([`bridge`]). The record is persisted through
//! an injected key-value backend ([`storage`]), optionally encrypted at rest.
//!
//! [`app::SessionRuntime`] wires everything together once at startup.

pub mod app;
pub mod bridge;
pub mod config;
pub mod hooks;
pub mod net;
pub mod routing;
pub mod state;
pub mod storage;
pub mod util;
