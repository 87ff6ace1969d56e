//! Session lifecycle states

use staybook_core::{Role, User};

use crate::roles::RoleSet;

/// Where the session stands
///
/// `Unresolved` and `Resolving` are transient: no decision about the
/// identity has been made yet. `Authenticated` and `Anonymous` are settled.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum SessionState {
    /// Initial state, before start-up resolution ran
    #[default]
    Unresolved,
    /// A persisted token is being validated against the backend
    Resolving,
    Authenticated(User),
    Anonymous,
}

impl SessionState {
    /// Whether a decision about the identity has been made
    pub fn is_resolved(&self) -> bool {
        matches!(self, SessionState::Authenticated(_) | SessionState::Anonymous)
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated(_))
    }

    pub fn user(&self) -> Option<&User> {
        match self {
            SessionState::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    pub fn role(&self) -> Option<Role> {
        self.user().map(|user| user.role)
    }

    /// Whether the held user's role is one of `roles`
    ///
    /// False for every input unless authenticated.
    pub fn has_role(&self, roles: &RoleSet) -> bool {
        self.role().is_some_and(|role| roles.contains(role))
    }

    /// Admin, hotel owners and managers may open the back office
    pub fn can_access_admin(&self) -> bool {
        self.has_role(&RoleSet::back_office())
    }

    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Unresolved => "unresolved",
            SessionState::Resolving => "resolving",
            SessionState::Authenticated(_) => "authenticated",
            SessionState::Anonymous => "anonymous",
        }
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionState::Authenticated(user) => {
                write!(f, "authenticated as {} ({})", user.login, user.role)
            }
            other => f.write_str(other.name()),
        }
    }
}
