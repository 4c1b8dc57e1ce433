//! Shared, observable session state.

use std::sync::Arc;

use secrecy::SecretString;
use tokio::sync::watch;

use super::Session;
use crate::models::User;

/// Handle to the process-wide session.
///
/// Cloning is cheap; every clone observes the same state. Readers get
/// snapshots or subscribe to changes. Writes are restricted to this crate.
#[derive(Clone)]
pub struct SessionContext {
    inner: Arc<watch::Sender<Session>>,
}

impl SessionContext {
    /// Create a context in the pending (not yet resolved) state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(watch::Sender::new(Session::pending())),
        }
    }

    /// Copy of the current session.
    #[must_use]
    pub fn snapshot(&self) -> Session {
        self.inner.borrow().clone()
    }

    #[must_use]
    pub fn token(&self) -> Option<SecretString> {
        self.inner.borrow().token().cloned()
    }

    #[must_use]
    pub fn user(&self) -> Option<User> {
        self.inner.borrow().user().cloned()
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.inner.borrow().is_ready()
    }

    /// Receiver notified on every session change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.inner.subscribe()
    }

    /// Mark a resolution as in flight.
    pub(crate) fn begin_fetch(&self) {
        self.inner.send_modify(|session| session.is_fetching = true);
    }

    /// Replace the session with a resolved one.
    pub(crate) fn publish(&self, mut session: Session) {
        session.is_ready = true;
        session.is_fetching = false;
        self.inner.send_replace(session);
    }

    /// Back to the pending state; the next resolve starts over.
    pub(crate) fn reset(&self) {
        self.inner.send_replace(Session::pending());
    }
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let session = self.inner.borrow();
        f.debug_struct("SessionContext")
            .field("is_ready", &session.is_ready())
            .field("is_fetching", &session.is_fetching())
            .field("user", &session.user().map(|u| u.id.as_str()))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use ajaxtreon_core::Role;

    use super::*;
    use crate::session::tests::user_with_role;

    #[test]
    fn test_new_context_is_pending() {
        let ctx = SessionContext::new();
        assert!(!ctx.is_ready());
        assert!(ctx.token().is_none());
        assert!(ctx.user().is_none());
    }

    #[test]
    fn test_clones_share_state() {
        let ctx = SessionContext::new();
        let reader = ctx.clone();
        ctx.publish(Session::authenticated(
            user_with_role(Role::Seller),
            SecretString::from("tok"),
        ));
        assert!(reader.is_ready());
        assert_eq!(reader.user().unwrap().role, Role::Seller);
    }

    #[tokio::test]
    async fn test_subscribers_see_publish_and_reset() {
        let ctx = SessionContext::new();
        let mut rx = ctx.subscribe();

        ctx.begin_fetch();
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().is_fetching());

        ctx.publish(Session::cleared());
        rx.changed().await.unwrap();
        {
            let seen = rx.borrow_and_update();
            assert!(seen.is_ready());
            assert!(!seen.is_fetching());
        }

        ctx.reset();
        rx.changed().await.unwrap();
        assert!(!rx.borrow_and_update().is_ready());
    }
}
