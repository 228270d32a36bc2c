//! Explicit bound/unbound slot for capabilities wired at application start.
//!
//! DESIGN
//! ======
//! Replaces module-level mutable globals. A `LateBound<T>` is constructed
//! empty, bound once during startup and optionally unbound at teardown.
//! Every reader must handle the unbound case, so use-before-bind is a value
//! the caller sees instead of undefined behavior.

#[cfg(test)]
#[path = "late_bound_test.rs"]
mod late_bound_test;

use std::sync::{Arc, PoisonError, RwLock};

/// Shared slot that is either unbound or holds one `T`.
///
/// Clones share the same slot, so a consumer can be handed the slot before
/// the value exists and observe the binding later.
pub struct LateBound<T> {
    slot: Arc<RwLock<Option<T>>>,
}

impl<T> Clone for LateBound<T> {
    fn clone(&self) -> Self {
        Self { slot: Arc::clone(&self.slot) }
    }
}

impl<T> Default for LateBound<T> {
    fn default() -> Self {
        Self::unbound()
    }
}

impl<T> LateBound<T> {
    /// Create an empty slot.
    #[must_use]
    pub fn unbound() -> Self {
        Self { slot: Arc::new(RwLock::new(None)) }
    }

    /// Create a slot that is already bound.
    #[must_use]
    pub fn bound(value: T) -> Self {
        Self { slot: Arc::new(RwLock::new(Some(value))) }
    }

    /// Bind `value`, returning the previous binding if there was one.
    pub fn bind(&self, value: T) -> Option<T> {
        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        slot.replace(value)
    }

    /// Clear the binding (application teardown).
    pub fn unbind(&self) -> Option<T> {
        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        slot.take()
    }

    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Run `f` against the bound value, or return `None` when unbound.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        let slot = self.slot.read().unwrap_or_else(PoisonError::into_inner);
        slot.as_ref().map(f)
    }
}

impl<T: Clone> LateBound<T> {
    /// Clone the bound value out of the slot.
    #[must_use]
    pub fn get(&self) -> Option<T> {
        self.with(T::clone)
    }
}
