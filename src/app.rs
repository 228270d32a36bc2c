//! Startup wiring.
//!
//! SYSTEM CONTEXT
//! ==============
//! The host calls [`SessionRuntime::init`] exactly once before mounting the
//! router. Everything after that (guards, hooks, the request layer) shares
//! the one `SessionState` created here.
//!
//! ARCHITECTURE
//! ============
//! ```text
//! SessionConfig ─► PersistedCredentialStore ─► SessionState ─► SessionBridge
//!                                                                 │
//!             RouteGuard ◄── LateBound<SessionBridge> ──► HttpTransport
//!                                                                 │
//!                         Navigator ◄── on 401 ── RequestGateway ◄┘
//! ```

#[cfg(test)]
#[path = "app_test.rs"]
mod app_test;

use std::sync::Arc;

use leptos::prelude::provide_context;

use crate::bridge::SessionBridge;
use crate::config::{ConfigError, SessionConfig};
use crate::net::gateway::RequestGateway;
use crate::net::transport::{HttpTransport, Transport};
use crate::routing::guard::{NavigationArgs, Redirect, RouteGuard, RoutePolicy};
use crate::routing::navigator::{NavigateMode, Navigator};
use crate::routing::redirect::login_redirect;
use crate::state::loading::LoadingState;
use crate::state::session::SessionState;
use crate::state::store::Store;
use crate::storage::KeyValueStore;
use crate::storage::cipher::AesGcmCipher;
use crate::storage::credentials::PersistedCredentialStore;
use crate::util::late_bound::LateBound;

#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("session cipher: {0}")]
    Cipher(#[from] crate::storage::cipher::CipherError),
}

/// Every shared piece of session orchestration, created once.
#[derive(Clone)]
pub struct SessionRuntime {
    config: SessionConfig,
    bridge: SessionBridge,
    guard: RouteGuard,
    navigator: Navigator,
    gateway: RequestGateway,
    location: Store<String>,
}

impl SessionRuntime {
    /// Restore the session from `storage` and wire the HTTP gateway.
    pub fn init(config: SessionConfig, storage: Arc<dyn KeyValueStore>) -> Result<Self, RuntimeError> {
        let slot = LateBound::unbound();
        let transport = Arc::new(HttpTransport::new(config.api_base_url.clone(), slot.clone()));
        Self::assemble(config, storage, transport, slot)
    }

    /// Same as [`SessionRuntime::init`] over a caller-supplied transport.
    pub fn with_transport(
        config: SessionConfig,
        storage: Arc<dyn KeyValueStore>,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, RuntimeError> {
        Self::assemble(config, storage, transport, LateBound::unbound())
    }

    fn assemble(
        config: SessionConfig,
        storage: Arc<dyn KeyValueStore>,
        transport: Arc<dyn Transport>,
        slot: LateBound<SessionBridge>,
    ) -> Result<Self, RuntimeError> {
        config.validate()?;
        tracing::info!(
            mode = ?config.build_mode,
            encryption = config.encryption.is_enabled(),
            key = %config.storage_key,
            "session encryption policy resolved"
        );

        let persistence = match config.secret.as_deref() {
            Some(secret) if config.encryption.is_enabled() => {
                PersistedCredentialStore::encrypted(storage, Arc::new(AesGcmCipher::from_secret(secret)?))
            }
            _ => PersistedCredentialStore::plain(storage),
        };
        let state = SessionState::restore(persistence, config.storage_key.as_str());
        let bridge = SessionBridge::new(state);
        slot.bind(bridge.clone());

        let guard = RouteGuard::new(slot, config.login_path.clone());
        let navigator = Navigator::new();
        let location = Store::new("/".to_owned());

        let gateway = RequestGateway::new(transport).on_unauthorized({
            let bridge = bridge.clone();
            let navigator = navigator.clone();
            let location = location.clone();
            let login_path = config.login_path.clone();
            move || {
                if !bridge.is_login() {
                    return;
                }
                bridge.logout();
                let current = location.get();
                // Already on the login route: keep its redirect-back target as is.
                if NavigationArgs::parse(&current).pathname == login_path {
                    return;
                }
                navigator.navigate(&login_redirect(&login_path, &current), NavigateMode::Replace);
            }
        });

        Ok(Self { config, bridge, guard, navigator, gateway, location })
    }

    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    #[must_use]
    pub fn bridge(&self) -> &SessionBridge {
        &self.bridge
    }

    #[must_use]
    pub fn guard(&self) -> &RouteGuard {
        &self.guard
    }

    #[must_use]
    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    #[must_use]
    pub fn gateway(&self) -> &RequestGateway {
        &self.gateway
    }

    #[must_use]
    pub fn loading(&self) -> &LoadingState {
        self.gateway.loading()
    }

    /// Last location committed through [`SessionRuntime::on_navigation`].
    #[must_use]
    pub fn current_location(&self) -> String {
        self.location.get()
    }

    /// Router hook run before committing a navigation to `nav`.
    ///
    /// Requests issued by the page being left are cancelled. An allowed
    /// navigation becomes the current location; a redirected one is handed
    /// to the navigator and returned so the router can abort.
    pub fn on_navigation(&self, policy: &RoutePolicy, nav: &NavigationArgs) -> Result<(), Redirect> {
        self.gateway.cancel_all();
        match self.guard.check(policy, nav) {
            Ok(()) => {
                self.location.replace(nav.location());
                Ok(())
            }
            Err(redirect) => {
                self.navigator.follow(&redirect);
                Err(redirect)
            }
        }
    }
}

/// Provide the bridge and loading state to the component tree.
pub fn provide_session_context(runtime: &SessionRuntime) {
    provide_context(runtime.bridge.clone());
    provide_context(runtime.loading().clone());
}

/// Install a fmt subscriber for native hosts. Safe to call more than once.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().try_init();
}
