//! Observable value with a single whole-value mutation entry point.
//!
//! SYSTEM CONTEXT
//! ==============
//! Backs both the session record and the loading flag. Reactive hooks
//! register a subscriber that pokes a Leptos trigger; everything else just
//! calls [`Store::get`].
//!
//! DESIGN
//! ======
//! The value is swapped under the lock, then the lock is released before any
//! callback runs. Subscribers may therefore call back into the store (read the
//! new value, unsubscribe themselves) without deadlocking.

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

use std::sync::{Arc, Mutex, PoisonError};

/// Handle returned by [`Store::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber<T> = Arc<dyn Fn(&T) + Send + Sync>;

pub struct Store<T> {
    inner: Arc<Mutex<StoreInner<T>>>,
}

struct StoreInner<T> {
    value: T,
    subscribers: Vec<(SubscriptionId, Subscriber<T>)>,
    next_id: u64,
}

impl<T> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<T: Clone> Store<T> {
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(Mutex::new(StoreInner { value, subscribers: Vec::new(), next_id: 0 })),
        }
    }

    /// Latest value.
    #[must_use]
    pub fn get(&self) -> T {
        self.lock().value.clone()
    }

    /// Read the latest value without cloning it.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.lock().value)
    }

    /// Replace the whole value and notify subscribers.
    pub fn replace(&self, value: T) {
        self.replace_then(value, |_| {});
    }

    /// Replace the whole value, run `after_swap`, then notify subscribers.
    ///
    /// `after_swap` sees the new value and runs after every reader can
    /// already observe it, but before any subscriber is told about it.
    pub fn replace_then(&self, value: T, after_swap: impl FnOnce(&T)) {
        let (value, subscribers) = {
            let mut inner = self.lock();
            inner.value = value;
            let subscribers: Vec<Subscriber<T>> = inner
                .subscribers
                .iter()
                .map(|(_, s)| Arc::clone(s))
                .collect();
            (inner.value.clone(), subscribers)
        };
        after_swap(&value);
        for subscriber in subscribers {
            subscriber(&value);
        }
    }

    pub fn subscribe(&self, f: impl Fn(&T) + Send + Sync + 'static) -> SubscriptionId {
        let mut inner = self.lock();
        let id = SubscriptionId(inner.next_id);
        inner.next_id += 1;
        inner.subscribers.push((id, Arc::new(f)));
        id
    }

    /// Remove a subscriber. Returns `false` if it was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut inner = self.lock();
        let before = inner.subscribers.len();
        inner.subscribers.retain(|(sid, _)| *sid != id);
        inner.subscribers.len() != before
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.lock().subscribers.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, StoreInner<T>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
