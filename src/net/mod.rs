//! Outbound request plumbing.
//!
//! SYSTEM CONTEXT
//! ==============
//! `gateway` wraps every call with dedup/cancellation and loading publication,
//! `transport` performs the actual HTTP exchange, and `fingerprint` decides
//! which in-flight calls count as "the same request".
//!
//! ERROR HANDLING
//! ==============
//! Every call resolves to a payload or a [`RequestError`]. Cancellation is its
//! own variant so UI error handlers can ignore it instead of showing a
//! network failure.

pub mod fingerprint;
pub mod gateway;
pub mod transport;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    /// Superseded by a newer identical request or cancelled on navigation.
    #[error("request cancelled")]
    Cancelled,
    /// The request never produced an HTTP response.
    #[error("network error: {0}")]
    Network(String),
    /// The server answered with a non-success status.
    #[error("server error {status}: {message}")]
    Server { status: u16, message: String },
}

impl RequestError {
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Server { status: 401, .. })
    }
}
