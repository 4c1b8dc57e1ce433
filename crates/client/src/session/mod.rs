//! Process-wide session state and the flow that establishes it.
//!
//! A [`SessionContext`] holds the current [`Session`] and tells subscribers
//! when it changes. Only the [`SessionResolver`] writes to it: on first use it
//! recovers the session from the durable token store or the identity
//! provider, and afterwards it handles login, logout and invalidation.

mod context;
mod resolver;

pub use context::SessionContext;
pub use resolver::SessionResolver;

use secrecy::SecretString;

use crate::models::User;

/// Snapshot of the authentication state.
///
/// `user` and `token` are either both present or both absent; the only ways
/// to build a session with a user are [`Session::authenticated`] and the
/// resolver itself.
#[derive(Debug, Clone)]
pub struct Session {
    user: Option<User>,
    token: Option<SecretString>,
    is_ready: bool,
    is_fetching: bool,
}

impl Session {
    /// A resolved session for `user`, authenticated by `token`.
    #[must_use]
    pub const fn authenticated(user: User, token: SecretString) -> Self {
        Self {
            user: Some(user),
            token: Some(token),
            is_ready: true,
            is_fetching: false,
        }
    }

    /// A resolved session with nobody signed in.
    #[must_use]
    pub const fn cleared() -> Self {
        Self {
            user: None,
            token: None,
            is_ready: true,
            is_fetching: false,
        }
    }

    /// State before the first resolution.
    pub(crate) const fn pending() -> Self {
        Self {
            user: None,
            token: None,
            is_ready: false,
            is_fetching: false,
        }
    }

    #[must_use]
    pub const fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    #[must_use]
    pub const fn token(&self) -> Option<&SecretString> {
        self.token.as_ref()
    }

    /// True once a resolution has completed, whatever its outcome.
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        self.is_ready
    }

    /// True while a resolution is in flight.
    #[must_use]
    pub const fn is_fetching(&self) -> bool {
        self.is_fetching
    }

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn user_with_role(role: ajaxtreon_core::Role) -> User {
        serde_json::from_value(serde_json::json!({
            "id": "u-1",
            "email": "rina@ajaxtreon.test",
            "name": "Rina",
            "role": role.as_str(),
        }))
        .unwrap()
    }

    #[test]
    fn test_constructors_keep_user_and_token_together() {
        let authed = Session::authenticated(
            user_with_role(ajaxtreon_core::Role::Admin),
            SecretString::from("tok"),
        );
        assert!(authed.is_authenticated());
        assert!(authed.token().is_some());
        assert!(authed.is_ready());

        let cleared = Session::cleared();
        assert!(cleared.user().is_none());
        assert!(cleared.token().is_none());
        assert!(cleared.is_ready());

        let pending = Session::pending();
        assert!(!pending.is_ready());
        assert!(!pending.is_fetching());
    }
}
