//! Shared client-side state modules.
//!
//! DESIGN
//! ======
//! `store` is the framework-independent primitive (one value, whole-value
//! replace, subscriber list). `session` and `loading` build the two pieces of
//! shared state on top of it, so reactive hooks and non-reactive consumers
//! read the same object.

pub mod loading;
pub mod session;
pub mod store;
