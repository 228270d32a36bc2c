//! Dedup/cancellation and loading publication around outbound calls.
//!
//! DESIGN
//! ======
//! Every dispatch registers a pending entry keyed by its [`Fingerprint`] and
//! holding the call's `AbortHandle`. With `cancel_last_request`, registering
//! over an existing entry aborts it first; otherwise the fingerprint carries
//! the call's sequence number and never collides.
//!
//! The entry and the loading count are owned by a guard that lives for the
//! duration of the call. Whatever ends the call (response, error, abort, or
//! the caller dropping the future) drops the guard, which removes the entry
//! (only if it is still ours) and releases the loading count.
//!
//! TRADE-OFFS
//! ==========
//! Cancellation is cooperative: the aborted transport future is never polled
//! again and is dropped, which is what stops the underlying request. A
//! response that raced the abort is discarded rather than delivered.

#[cfg(test)]
#[path = "gateway_test.rs"]
mod gateway_test;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use futures::future::{AbortHandle, Abortable};
use serde_json::Value;

use super::RequestError;
use super::fingerprint::Fingerprint;
use super::transport::{ApiRequest, Transport};
use crate::state::loading::LoadingState;

/// Per-call dispatch options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestOptions {
    /// Abort an in-flight call with the same fingerprint before starting.
    /// Default `false`: identical calls run side by side.
    pub cancel_last_request: bool,
    /// Hold the shared loading indicator until this call settles.
    /// Default `false`.
    pub show_loading: bool,
}

impl RequestOptions {
    /// Only the latest of several identical calls survives.
    #[must_use]
    pub fn latest() -> Self {
        Self { cancel_last_request: true, show_loading: false }
    }

    #[must_use]
    pub fn with_loading(mut self) -> Self {
        self.show_loading = true;
        self
    }
}

struct PendingEntry {
    seq: u64,
    abort: AbortHandle,
}

#[derive(Default)]
struct GatewayInner {
    pending: HashMap<Fingerprint, PendingEntry>,
    next_seq: u64,
}

type UnauthorizedHook = Arc<dyn Fn()>;

#[derive(Clone)]
pub struct RequestGateway {
    transport: Arc<dyn Transport>,
    inner: Arc<Mutex<GatewayInner>>,
    loading: LoadingState,
    on_unauthorized: Option<UnauthorizedHook>,
}

impl RequestGateway {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self::with_loading(transport, LoadingState::new())
    }

    /// Gateway publishing into an existing loading state.
    pub fn with_loading(transport: Arc<dyn Transport>, loading: LoadingState) -> Self {
        Self {
            transport,
            inner: Arc::new(Mutex::new(GatewayInner::default())),
            loading,
            on_unauthorized: None,
        }
    }

    /// Run `hook` whenever a call settles with HTTP 401.
    #[must_use]
    pub fn on_unauthorized(mut self, hook: impl Fn() + 'static) -> Self {
        self.on_unauthorized = Some(Arc::new(hook));
        self
    }

    #[must_use]
    pub fn loading(&self) -> &LoadingState {
        &self.loading
    }

    /// Number of calls currently registered.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.lock().pending.len()
    }

    /// Send `request` through the transport under `options`.
    pub async fn dispatch(&self, request: ApiRequest, options: RequestOptions) -> Result<Value, RequestError> {
        let (abort, registration) = AbortHandle::new_pair();
        let ticket = self.register(&request, options, abort);
        tracing::debug!(endpoint = ticket.fingerprint.endpoint(), seq = ticket.seq, "request dispatched");

        let outcome = Abortable::new(self.transport.send(&request), registration).await;
        let result = outcome.unwrap_or(Err(RequestError::Cancelled));
        tracing::debug!(
            endpoint = ticket.fingerprint.endpoint(),
            seq = ticket.seq,
            ok = result.is_ok(),
            cancelled = result.as_ref().is_err_and(RequestError::is_cancelled),
            "request settled"
        );
        drop(ticket);

        if result.as_ref().is_err_and(RequestError::is_unauthorized) {
            tracing::warn!(path = %request.path, "request rejected as unauthorized");
            if let Some(hook) = &self.on_unauthorized {
                hook();
            }
        }
        result
    }

    /// Abort every in-flight call (e.g. when the page changes).
    ///
    /// Returns how many calls were cancelled.
    pub fn cancel_all(&self) -> usize {
        let drained: Vec<PendingEntry> = self.lock().pending.drain().map(|(_, e)| e).collect();
        for entry in &drained {
            entry.abort.abort();
        }
        if !drained.is_empty() {
            tracing::debug!(count = drained.len(), "cancelled all pending requests");
        }
        drained.len()
    }

    fn register(&self, request: &ApiRequest, options: RequestOptions, abort: AbortHandle) -> PendingTicket {
        let (fingerprint, seq) = {
            let mut inner = self.lock();
            let seq = inner.next_seq;
            inner.next_seq += 1;
            let fingerprint = if options.cancel_last_request {
                Fingerprint::of(request)
            } else {
                Fingerprint::unique(request, seq)
            };
            if let Some(previous) = inner
                .pending
                .insert(fingerprint.clone(), PendingEntry { seq, abort })
            {
                previous.abort.abort();
                tracing::debug!(endpoint = fingerprint.endpoint(), superseded = previous.seq, "cancelled previous request");
            }
            (fingerprint, seq)
        };

        if options.show_loading {
            self.loading.increment();
        }
        PendingTicket {
            inner: Arc::clone(&self.inner),
            loading: options.show_loading.then(|| self.loading.clone()),
            fingerprint,
            seq,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, GatewayInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Releases a call's pending entry and loading count when dropped.
struct PendingTicket {
    inner: Arc<Mutex<GatewayInner>>,
    loading: Option<LoadingState>,
    fingerprint: Fingerprint,
    seq: u64,
}

impl Drop for PendingTicket {
    fn drop(&mut self) {
        {
            let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
            if inner
                .pending
                .get(&self.fingerprint)
                .is_some_and(|entry| entry.seq == self.seq)
            {
                inner.pending.remove(&self.fingerprint);
            }
        }
        if let Some(loading) = &self.loading {
            loading.decrement();
        }
    }
}
