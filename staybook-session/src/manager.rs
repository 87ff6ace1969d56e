//! Session Manager - the authenticated identity and its lifecycle
//!
//! State changes are published on a `watch` channel so callers can observe
//! the transient `Resolving` state as well as the settled ones.

use staybook_api::AuthApi;
use staybook_core::{ApiResult, Credentials, Registration, Role, User, UserPatch};
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::roles::RoleSet;
use crate::state::SessionState;

/// Owns the current user for the lifetime of a running client
pub struct SessionManager {
    api: Arc<dyn AuthApi>,
    state: watch::Sender<SessionState>,
    last_error: RwLock<Option<String>>,
}

impl SessionManager {
    /// Create a manager in the `Unresolved` state
    pub fn new(api: Arc<dyn AuthApi>) -> Self {
        let (state, _) = watch::channel(SessionState::Unresolved);
        Self {
            api,
            state,
            last_error: RwLock::new(None),
        }
    }

    /// Resolve the persisted token into a session
    ///
    /// Runs once: from `Unresolved`, a stored token moves the session to
    /// `Resolving` and is checked against `GET /auth/me`. A rejected or
    /// unverifiable token is discarded and the session becomes `Anonymous`;
    /// that failure is never returned. Later calls only report the state.
    pub async fn start(&self) -> SessionState {
        let has_token = self.api.has_token();
        let mut resolving = false;

        self.state.send_if_modified(|state| {
            if *state != SessionState::Unresolved {
                return false;
            }
            if has_token {
                *state = SessionState::Resolving;
                resolving = true;
            } else {
                *state = SessionState::Anonymous;
            }
            true
        });

        if !resolving {
            debug!(state = %self.state(), "Session start requires no resolution");
            return self.state();
        }

        debug!("Resolving persisted session token");
        let outcome = self.api.current_user().await;

        // A login that finished while the token was being checked wins.
        self.state.send_if_modified(|state| {
            if *state != SessionState::Resolving {
                return false;
            }
            *state = match outcome {
                Ok(user) => {
                    info!(user_id = user.id, role = %user.role, "Session restored");
                    SessionState::Authenticated(user)
                }
                Err(e) => {
                    warn!(status = e.status(), error = %e, "Discarding persisted token");
                    self.api.logout();
                    SessionState::Anonymous
                }
            };
            true
        });

        self.state()
    }

    /// Log in with `credentials`
    ///
    /// On failure the backend's error is returned unchanged, remembered as
    /// [`last_error`](Self::last_error), and the state is left as it was.
    pub async fn login(&self, credentials: &Credentials) -> ApiResult<User> {
        self.clear_error();
        let result = self.api.login(credentials).await;
        self.settle_auth(result.map(|response| response.user), "login")
    }

    /// Create an account and sign in with it
    pub async fn register(&self, registration: &Registration) -> ApiResult<User> {
        self.clear_error();
        let result = self.api.register(registration).await;
        self.settle_auth(result.map(|response| response.user), "register")
    }

    fn settle_auth(&self, result: ApiResult<User>, action: &str) -> ApiResult<User> {
        match result {
            Ok(user) => {
                info!(user_id = user.id, role = %user.role, "Session started by {}", action);
                self.state
                    .send_replace(SessionState::Authenticated(user.clone()));
                Ok(user)
            }
            Err(e) => {
                warn!(status = e.status(), error = %e, "{} failed", action);
                self.set_last_error(Some(e.message().to_string()));
                Err(e)
            }
        }
    }

    /// End the session. Always leaves the session `Anonymous` with no token.
    pub fn logout(&self) {
        self.api.logout();
        self.clear_error();
        self.state.send_replace(SessionState::Anonymous);
        info!("Session ended");
    }

    /// Merge already-saved fields into the held user
    ///
    /// Returns `false` without touching anything unless authenticated.
    pub fn update_user(&self, patch: UserPatch) -> bool {
        self.state.send_if_modified(|state| match state {
            SessionState::Authenticated(user) => {
                user.apply(patch);
                debug!(user_id = user.id, "Current user updated");
                true
            }
            _ => false,
        })
    }

    /// Re-fetch the current user from the backend
    ///
    /// Only meaningful while authenticated. A 401/403 ends the session; any
    /// other failure is returned and the held user is kept.
    pub async fn refresh(&self) -> ApiResult<Option<User>> {
        if !self.is_authenticated() {
            return Ok(None);
        }

        match self.api.current_user().await {
            Ok(user) => {
                self.state.send_if_modified(|state| match state {
                    SessionState::Authenticated(held) => {
                        *held = user.clone();
                        true
                    }
                    _ => false,
                });
                Ok(Some(user))
            }
            Err(e) if e.is_unauthorized() => {
                warn!(status = e.status(), "Session rejected by backend");
                self.logout();
                Err(e)
            }
            Err(e) => Err(e),
        }
    }

    /// Snapshot of the current state
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn current_user(&self) -> Option<User> {
        self.state.borrow().user().cloned()
    }

    /// Receiver notified on every state change
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Wait until the session is `Authenticated` or `Anonymous`
    ///
    /// Never returns if [`start`](Self::start) is never called.
    pub async fn wait_until_resolved(&self) -> SessionState {
        let mut receiver = self.state.subscribe();
        let resolved = match receiver.wait_for(SessionState::is_resolved).await {
            Ok(state) => state.clone(),
            Err(_) => self.state(),
        };
        resolved
    }

    /// Message of the last failed login or registration
    pub fn last_error(&self) -> Option<String> {
        self.last_error
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn clear_error(&self) {
        self.set_last_error(None);
    }

    fn set_last_error(&self, message: Option<String>) {
        *self
            .last_error
            .write()
            .unwrap_or_else(PoisonError::into_inner) = message;
    }

    /// Whether the current user holds one of `roles` (one role or several)
    pub fn has_role<R: Into<RoleSet>>(&self, roles: R) -> bool {
        self.state.borrow().has_role(&roles.into())
    }

    pub fn can_access_admin(&self) -> bool {
        self.state.borrow().can_access_admin()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(Role::Admin)
    }

    pub fn is_hotel_owner(&self) -> bool {
        self.has_role(Role::HotelOwner)
    }

    pub fn is_manager(&self) -> bool {
        self.has_role(Role::Manager)
    }

    pub fn is_client(&self) -> bool {
        self.has_role(Role::Client)
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("state", &*self.state.borrow())
            .field("last_error", &self.last_error())
            .finish()
    }
}
