//! Route Guard - gate protected screens on the session state

use crate::manager::SessionManager;
use crate::roles::RoleSet;
use crate::state::SessionState;
use staybook_core::Role;

/// Where anonymous visitors are sent
pub const PUBLIC_ENTRY_POINT: &str = "/";

/// What the host should render for a protected route
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Identity not settled yet; show a loading indicator
    Loading,
    /// Nobody is signed in; navigate to `to` and present the login flow
    /// when `open_login` is set
    Redirect { to: &'static str, open_login: bool },
    /// Signed in without any of the `required` roles
    AccessDenied { required: RoleSet },
    /// Render the protected content unchanged
    Allow,
}

impl GuardDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, GuardDecision::Allow)
    }

    /// Text for the access-denied view
    pub fn message(&self) -> Option<String> {
        match self {
            GuardDecision::AccessDenied { required } => Some(format!(
                "You don't have permission to access this page. Required roles: {}",
                required
            )),
            GuardDecision::Redirect { .. } => Some("Please log in to continue.".to_string()),
            _ => None,
        }
    }
}

/// Role requirement for one protected route
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteGuard {
    required: RoleSet,
}

impl RouteGuard {
    /// Guard requiring one of `roles`; an empty set only requires a session
    pub fn new<R: Into<RoleSet>>(roles: R) -> Self {
        Self {
            required: roles.into(),
        }
    }

    /// Any signed-in user
    pub fn authenticated() -> Self {
        Self::default()
    }

    /// `/my-hotels`
    pub fn my_hotels() -> Self {
        Self::new(RoleSet::back_office())
    }

    /// `/manage-hotel/{id}`
    pub fn manage_hotel() -> Self {
        Self::new(RoleSet::back_office())
    }

    /// `/admin`
    pub fn admin_panel() -> Self {
        Self::new(Role::Admin)
    }

    pub fn required(&self) -> &RoleSet {
        &self.required
    }

    pub fn evaluate(&self, state: &SessionState) -> GuardDecision {
        match state {
            SessionState::Unresolved | SessionState::Resolving => GuardDecision::Loading,
            SessionState::Anonymous => GuardDecision::Redirect {
                to: PUBLIC_ENTRY_POINT,
                open_login: true,
            },
            SessionState::Authenticated(_)
                if !self.required.is_empty() && !state.has_role(&self.required) =>
            {
                GuardDecision::AccessDenied {
                    required: self.required.clone(),
                }
            }
            SessionState::Authenticated(_) => GuardDecision::Allow,
        }
    }

    /// Evaluate against the manager's current state
    pub fn check(&self, session: &SessionManager) -> GuardDecision {
        self.evaluate(&session.state())
    }
}
