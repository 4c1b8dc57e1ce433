//! Role-based route guard.
//!
//! Decides, for a navigation target, whether to let it through or where to
//! send the user instead. Public paths never touch the session; everything
//! else needs a signed-in user, and paths reserved for another role's area
//! bounce to the user's own landing page.

use async_trait::async_trait;
use thiserror::Error;

use ajaxtreon_core::Area;

use crate::models::User;
use crate::session::{Session, SessionResolver};

/// Where unauthenticated users are sent.
pub const LOGIN_PATH: &str = "/auth/login";

const AUTH_SECTION: &str = "/auth";

/// Outcome of a route check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Allow,
    Redirect(String),
}

impl Navigation {
    fn to_login() -> Self {
        Self::Redirect(LOGIN_PATH.to_string())
    }
}

/// A session source failed to produce a session.
#[derive(Debug, Error)]
#[error("Session unavailable: {0}")]
pub struct SessionSourceError(pub String);

/// Anything that can produce the current session for a route check.
#[async_trait]
pub trait SessionSource: Send + Sync {
    async fn current_session(&self) -> Result<Session, SessionSourceError>;
}

#[async_trait]
impl SessionSource for SessionResolver {
    async fn current_session(&self) -> Result<Session, SessionSourceError> {
        Ok(self.resolve().await)
    }
}

/// Guard evaluated before every navigation.
#[derive(Debug, Clone)]
pub struct RouteGuard<S> {
    source: S,
}

impl<S: SessionSource> RouteGuard<S> {
    pub const fn new(source: S) -> Self {
        Self { source }
    }

    /// Check a navigation target, resolving the session if needed.
    pub async fn check(&self, path: &str) -> Navigation {
        if is_public(path) {
            return Navigation::Allow;
        }

        match self.source.current_session().await {
            Ok(session) => decide(path, &session),
            Err(e) => {
                tracing::warn!(error = %e, path, "Session unavailable for route check");
                Navigation::to_login()
            }
        }
    }
}

/// Root page and the authentication section.
#[must_use]
pub fn is_public(path: &str) -> bool {
    path == "/"
        || path
            .strip_prefix(AUTH_SECTION)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

/// Route decision for a session already in hand.
#[must_use]
pub fn decide(path: &str, session: &Session) -> Navigation {
    if is_public(path) {
        return Navigation::Allow;
    }

    let Some(user) = session.user() else {
        return Navigation::to_login();
    };

    let own = user.role.area();
    let in_other_area = Area::ALL
        .into_iter()
        .any(|area| area != own && area.contains(path));

    if in_other_area && !own.contains(path) {
        tracing::debug!(path, role = %user.role, "Redirecting out of restricted area");
        return Navigation::Redirect(user.role.landing_path().to_string());
    }

    Navigation::Allow
}

/// Where a freshly signed-in user should land.
#[must_use]
pub const fn landing_after_login(user: &User) -> &'static str {
    user.role.landing_path()
}
