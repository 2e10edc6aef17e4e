use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::api::Backend;
use crate::auth::storage::SessionStore;
use crate::mount::Mount;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Loading,
    Checking,
    Authenticated,
    Unauthenticated,
}

impl GateState {
    pub fn is_settled(self) -> bool {
        matches!(self, GateState::Authenticated | GateState::Unauthenticated)
    }
}

impl std::fmt::Display for GateState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GateState::Loading => write!(f, "loading"),
            GateState::Checking => write!(f, "checking"),
            GateState::Authenticated => write!(f, "authenticated"),
            GateState::Unauthenticated => write!(f, "unauthenticated"),
        }
    }
}

/// What the gate lets through for the current state
#[derive(Debug, PartialEq)]
pub enum Rendering<T> {
    Placeholder,
    Content(T),
    RedirectToLogin,
}

/// Decides whether protected content may be produced.
///
/// `Loading -> Unauthenticated` when no token is stored (no request is made),
/// `Loading -> Checking -> Authenticated | Unauthenticated` otherwise. Any
/// failure of the auth check counts as a rejection. The check runs at most
/// once per gate instance.
pub struct SessionGate {
    store: Arc<dyn SessionStore>,
    backend: Arc<dyn Backend>,
    state: Mutex<GateState>,
    started: AtomicBool,
    mount: Mount,
}

impl SessionGate {
    pub fn mount(store: Arc<dyn SessionStore>, backend: Arc<dyn Backend>) -> Self {
        Self {
            store,
            backend,
            state: Mutex::new(GateState::Loading),
            started: AtomicBool::new(false),
            mount: Mount::new(),
        }
    }

    pub fn state(&self) -> GateState {
        *self.state.lock()
    }

    /// Shared liveness handle, for tearing the gate down from elsewhere
    pub fn mount_handle(&self) -> Mount {
        self.mount.clone()
    }

    pub fn unmount(&self) {
        self.mount.teardown();
    }

    fn transition(&self, next: GateState) {
        let mut state = self.state.lock();
        log::debug!("Session gate: {} -> {}", *state, next);
        *state = next;
    }

    /// Run the one-shot check. Later calls return the current state without
    /// touching the backend. Dropping the future mid-check puts the gate back
    /// to `Loading` so the next call checks again.
    pub async fn resolve(&self) -> GateState {
        if self.started.swap(true, Ordering::SeqCst) {
            return self.state();
        }

        let token = match self.store.get() {
            Some(token) => token,
            None => {
                log::info!("No session token, redirecting to login");
                self.transition(GateState::Unauthenticated);
                return GateState::Unauthenticated;
            }
        };

        self.transition(GateState::Checking);
        let check = CheckGuard { gate: self };
        let outcome = self.backend.auth_check(&token).await;
        std::mem::forget(check);

        if !self.mount.is_alive() {
            log::debug!("Session gate torn down, discarding auth-check result");
            return self.state();
        }

        let next = match outcome {
            Ok(()) => GateState::Authenticated,
            Err(e) => {
                log::warn!("Auth check failed, treating session as invalid: {}", e);
                GateState::Unauthenticated
            }
        };

        self.transition(next);
        next
    }

    /// `content` is only called once the backend has accepted the token
    pub fn render<T>(&self, content: impl FnOnce() -> T) -> Rendering<T> {
        match self.state() {
            GateState::Loading | GateState::Checking => Rendering::Placeholder,
            GateState::Authenticated => Rendering::Content(content()),
            GateState::Unauthenticated => Rendering::RedirectToLogin,
        }
    }
}

// Rewinds an abandoned check
struct CheckGuard<'a> {
    gate: &'a SessionGate,
}

impl Drop for CheckGuard<'_> {
    fn drop(&mut self) {
        {
            let mut state = self.gate.state.lock();
            if *state == GateState::Checking {
                *state = GateState::Loading;
            }
        }
        self.gate.started.store(false, Ordering::SeqCst);
    }
}
