//! Ref-counted loading indicator shared by all outbound requests.
//!
//! Each request dispatched with `show_loading` holds one count until it
//! settles. The published flag only flips on the 0 -> 1 and 1 -> 0 edges, so
//! overlapping requests keep the indicator on until the last one finishes.
//!
//! Count changes and their publication run under one gate, so subscribers on
//! any thread observe strictly alternating `true`/`false`. Subscribers may
//! read the state but must not increment or decrement from inside a callback.

#[cfg(test)]
#[path = "loading_test.rs"]
mod loading_test;

use std::sync::{Arc, Mutex, PoisonError};

use super::store::{Store, SubscriptionId};

#[derive(Clone)]
pub struct LoadingState {
    /// Serializes a count change with the publication of its edge.
    gate: Arc<Mutex<()>>,
    count: Arc<Mutex<usize>>,
    flag: Store<bool>,
}

impl Default for LoadingState {
    fn default() -> Self {
        Self::new()
    }
}

impl LoadingState {
    #[must_use]
    pub fn new() -> Self {
        Self {
            gate: Arc::new(Mutex::new(())),
            count: Arc::new(Mutex::new(0)),
            flag: Store::new(false),
        }
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.flag.get()
    }

    /// Number of requests currently holding the indicator.
    #[must_use]
    pub fn active(&self) -> usize {
        *self.count.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn increment(&self) {
        self.transition(|count| *count += 1);
    }

    /// Release one count. Extra releases saturate at zero.
    pub fn decrement(&self) {
        self.transition(|count| *count = count.saturating_sub(1));
    }

    fn transition(&self, apply: impl FnOnce(&mut usize)) {
        let _gate = self.gate.lock().unwrap_or_else(PoisonError::into_inner);
        let edge = {
            let mut count = self.count.lock().unwrap_or_else(PoisonError::into_inner);
            let was_active = *count > 0;
            apply(&mut count);
            let is_active = *count > 0;
            (was_active != is_active).then_some(is_active)
        };
        if let Some(active) = edge {
            self.flag.replace(active);
        }
    }

    pub fn subscribe(&self, f: impl Fn(&bool) + Send + Sync + 'static) -> SubscriptionId {
        self.flag.subscribe(f)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.flag.unsubscribe(id)
    }
}
