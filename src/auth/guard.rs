//! Route guards deciding whether a view may be entered.

use tracing::debug;

use crate::auth::claims::{AuthSession, Role, unix_now};

/// Outcome of a guard check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    Allowed,
    /// No usable session; send the user to the identity provider.
    RedirectToLogin,
    /// Signed in but missing the role the view requires.
    Forbidden { role: Role },
}

impl AccessDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }
}

/// Guard for one view, optionally requiring a realm role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RouteGuard {
    required_role: Option<Role>,
}

impl RouteGuard {
    /// Guard that only requires a signed-in user.
    pub fn authenticated() -> Self {
        Self { required_role: None }
    }

    /// Guard that requires `role` on top of a signed-in user.
    pub fn requiring(role: Role) -> Self {
        Self {
            required_role: Some(role),
        }
    }

    pub fn check(&self, session: Option<&AuthSession>) -> AccessDecision {
        self.check_at(session, unix_now())
    }

    /// Checks `session` against this guard at `now` (seconds since the epoch).
    pub fn check_at(&self, session: Option<&AuthSession>, now: u64) -> AccessDecision {
        let Some(session) = session.filter(|session| !session.is_expired_at(now)) else {
            debug!("No valid session, redirecting to login");
            return AccessDecision::RedirectToLogin;
        };

        match self.required_role {
            Some(role) if !session.has_role(role) => {
                debug!(role = %role, user = session.username().unwrap_or("unknown"), "Role missing");
                AccessDecision::Forbidden { role }
            }
            _ => AccessDecision::Allowed,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::auth::{
        claims::{
            AuthSession,
            Role::{CreateAuthor, ViewBooks},
            token_with,
        },
        guard::{AccessDecision, RouteGuard},
    };

    fn session(roles: &[&str], exp: u64) -> AuthSession {
        AuthSession::from_token(token_with(&json!({
            "exp": exp,
            "realm_access": {"roles": roles}
        })))
        .unwrap()
    }

    #[test]
    fn test_unauthenticated_redirects() {
        assert_eq!(
            RouteGuard::authenticated().check_at(None, 0),
            AccessDecision::RedirectToLogin
        );
    }

    #[test]
    fn test_expired_session_redirects() {
        let expired = session(&["view-books"], 50);
        assert_eq!(
            RouteGuard::requiring(ViewBooks).check_at(Some(&expired), 60),
            AccessDecision::RedirectToLogin
        );
    }

    #[test]
    fn test_authenticated_without_role_requirement() {
        let plain = session(&[], 100);
        assert!(RouteGuard::authenticated().check_at(Some(&plain), 10).is_allowed());
    }

    #[test]
    fn test_role_requirement() {
        let reader = session(&["view-books"], 100);
        assert!(RouteGuard::requiring(ViewBooks).check_at(Some(&reader), 10).is_allowed());
        assert_eq!(
            RouteGuard::requiring(CreateAuthor).check_at(Some(&reader), 10),
            AccessDecision::Forbidden { role: CreateAuthor }
        );
    }
}
