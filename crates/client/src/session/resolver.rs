//! Session resolution, login and logout.
//!
//! # Resolution
//!
//! 1. Cached token: load it from the durable store and ask the backend who it
//!    belongs to (`GET /auth/me`). Tokens that are JWTs with a past `exp` are
//!    not sent.
//! 2. Identity provider: if the provider still has a session, exchange it for
//!    a fresh token and look up the user record.
//!
//! Any failure falls through to the next stage, and a failure of the last
//! stage degrades to a cleared session. `resolve` never errors: the worst
//! outcome is "nobody is signed in".

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Utc;
use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::Mutex;
use tracing::instrument;

use super::{Session, SessionContext};
use crate::error::ApiError;
use crate::http::{ApiClient, Auth};
use crate::identity::{IdentityError, IdentityProvider};
use crate::models::{LoginRequest, LoginResponse, MeResponse, User};
use crate::store::{StoreError, TokenStore};

/// Why a resolution stage produced no session.
#[derive(Debug)]
enum Degrade {
    NoCachedToken,
    CachedTokenExpired,
    Store(StoreError),
    Backend(ApiError),
    NoUserForToken,
    NoIdentitySession,
    Identity(IdentityError),
    NoUserRecord,
}

impl Degrade {
    /// Absent state is expected; everything else is worth a warning.
    const fn is_failure(&self) -> bool {
        matches!(
            self,
            Self::Store(_) | Self::Backend(_) | Self::Identity(_) | Self::NoUserForToken
        )
    }
}

impl std::fmt::Display for Degrade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoCachedToken => write!(f, "no cached token"),
            Self::CachedTokenExpired => write!(f, "cached token expired"),
            Self::Store(e) => write!(f, "token store: {e}"),
            Self::Backend(e) => write!(f, "backend: {e}"),
            Self::NoUserForToken => write!(f, "backend returned no user for token"),
            Self::NoIdentitySession => write!(f, "no identity provider session"),
            Self::Identity(e) => write!(f, "identity provider: {e}"),
            Self::NoUserRecord => write!(f, "no user record for identity session"),
        }
    }
}

/// A user and the token that authenticates them.
struct Resolved {
    user: User,
    token: SecretString,
}

/// Establishes and maintains the process-wide session.
///
/// Cloning is cheap; clones share state and the resolution lock.
#[derive(Clone)]
pub struct SessionResolver {
    inner: Arc<ResolverInner>,
}

struct ResolverInner {
    api: ApiClient,
    store: Arc<dyn TokenStore>,
    identity: Arc<dyn IdentityProvider>,
    /// Serializes resolution, login, logout and invalidation.
    gate: Mutex<()>,
}

impl SessionResolver {
    /// Create a resolver writing to the session `api` authenticates with.
    #[must_use]
    pub fn new(
        api: ApiClient,
        store: Arc<dyn TokenStore>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self {
            inner: Arc::new(ResolverInner {
                api,
                store,
                identity,
                gate: Mutex::new(()),
            }),
        }
    }

    /// Read-only handle to the session.
    #[must_use]
    pub fn reader(&self) -> SessionContext {
        self.context().clone()
    }

    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    fn context(&self) -> &SessionContext {
        self.inner.api.session()
    }

    /// Resolve the session once per process.
    ///
    /// Returns immediately once a resolution has completed. Concurrent callers
    /// wait for the in-flight resolution and share its result.
    #[instrument(skip(self))]
    pub async fn resolve(&self) -> Session {
        let context = self.context();
        if context.is_ready() {
            return context.snapshot();
        }

        let _gate = self.inner.gate.lock().await;
        if context.is_ready() {
            tracing::debug!("Session resolved while waiting");
            return context.snapshot();
        }

        context.begin_fetch();
        tracing::debug!("Resolving session");

        let outcome = match self.from_cached_token().await {
            Ok(resolved) => Ok(resolved),
            Err(reason) => {
                if reason.is_failure() {
                    tracing::warn!(reason = %reason, "Cached token unusable, trying identity provider");
                } else {
                    tracing::debug!(reason = %reason, "Trying identity provider");
                }
                self.from_identity_provider().await
            }
        };

        match outcome {
            Ok(resolved) => self.commit(resolved).await,
            Err(reason) => self.degrade_to_unauthenticated(&reason).await,
        }
    }

    /// Stage 1: the token left behind by a previous run.
    async fn from_cached_token(&self) -> Result<Resolved, Degrade> {
        let token = self
            .inner
            .store
            .load()
            .await
            .map_err(Degrade::Store)?
            .ok_or(Degrade::NoCachedToken)?;

        if jwt_expired(token.expose_secret(), Utc::now().timestamp()) {
            return Err(Degrade::CachedTokenExpired);
        }

        let me: MeResponse = self
            .inner
            .api
            .send_as::<(), _>(Method::GET, "/auth/me", Auth::Token(&token), None)
            .await
            .map_err(Degrade::Backend)?
            .ok_or(Degrade::NoUserForToken)?;
        let user = me.into_user().ok_or(Degrade::NoUserForToken)?;

        tracing::debug!(user_id = %user.id, "Session restored from cached token");
        Ok(Resolved { user, token })
    }

    /// Stage 2: a live identity-provider session.
    async fn from_identity_provider(&self) -> Result<Resolved, Degrade> {
        let identity = &self.inner.identity;
        let session = identity
            .current_session()
            .await
            .map_err(Degrade::Identity)?
            .ok_or(Degrade::NoIdentitySession)?;

        let token = identity
            .exchange_token(&session)
            .await
            .map_err(Degrade::Identity)?;
        let user = identity
            .lookup_user(&session, &token)
            .await
            .map_err(Degrade::Identity)?
            .ok_or(Degrade::NoUserRecord)?;

        tracing::debug!(user_id = %user.id, "Session restored from identity provider");
        Ok(Resolved { user, token })
    }

    async fn commit(&self, resolved: Resolved) -> Session {
        if let Err(e) = self.inner.store.save(&resolved.token).await {
            tracing::warn!(error = %e, "Failed to persist session token");
        }
        tracing::info!(user_id = %resolved.user.id, role = %resolved.user.role, "Session resolved");

        let session = Session::authenticated(resolved.user, resolved.token);
        self.context().publish(session.clone());
        session
    }

    /// Swallow whatever went wrong and settle on a cleared, ready session.
    async fn degrade_to_unauthenticated(&self, reason: &Degrade) -> Session {
        if reason.is_failure() {
            tracing::warn!(reason = %reason, "Session resolution failed, continuing unauthenticated");
        } else {
            tracing::info!(reason = %reason, "No session to resolve");
        }

        if let Err(e) = self.inner.store.clear().await {
            tracing::warn!(error = %e, "Failed to clear session token");
        }

        let session = Session::cleared();
        self.context().publish(session.clone());
        session
    }

    /// Sign in with credentials.
    ///
    /// Stores the returned token durably and publishes the session, then
    /// signs in to the identity provider as well; a provider failure is only
    /// logged.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the backend rejects the credentials or answers
    /// without a token.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &SecretString) -> Result<User, ApiError> {
        let request = LoginRequest {
            email,
            password: password.expose_secret(),
        };
        let response: LoginResponse = self
            .inner
            .api
            .send_as(Method::POST, "/auth/login", Auth::Anonymous, Some(&request))
            .await?
            .ok_or_else(|| ApiError::InvalidResponse("empty login response".to_string()))?;

        if response.token.is_empty() {
            return Err(ApiError::InvalidResponse(
                "login response carried no token".to_string(),
            ));
        }
        let token = SecretString::from(response.token);
        let user = response.user;

        {
            let _gate = self.inner.gate.lock().await;
            if let Err(e) = self.inner.store.save(&token).await {
                tracing::warn!(error = %e, "Failed to persist session token");
            }
            self.context()
                .publish(Session::authenticated(user.clone(), token));
        }
        tracing::info!(user_id = %user.id, role = %user.role, "Logged in");

        if let Err(e) = self.inner.identity.sign_in(email, password).await {
            tracing::warn!(error = %e, "Identity provider sign-in failed");
        }

        Ok(user)
    }

    /// Sign out everywhere and return to the pending state.
    ///
    /// Backend and identity-provider sign-out are best effort; the local
    /// token and session are always cleared.
    #[instrument(skip(self))]
    pub async fn logout(&self) {
        let _gate = self.inner.gate.lock().await;

        if let Some(token) = self.context().token() {
            let result = self
                .inner
                .api
                .send_as::<(), serde::de::IgnoredAny>(
                    Method::POST,
                    "/auth/logout",
                    Auth::Token(&token),
                    None,
                )
                .await;
            if let Err(e) = result {
                tracing::warn!(error = %e, "Backend logout failed");
            }
        }

        if let Err(e) = self.inner.identity.sign_out().await {
            tracing::warn!(error = %e, "Identity provider sign-out failed");
        }
        if let Err(e) = self.inner.store.clear().await {
            tracing::warn!(error = %e, "Failed to clear session token");
        }

        self.context().reset();
        tracing::info!("Logged out");
    }

    /// Drop a session the backend no longer accepts.
    ///
    /// The session stays ready, so route checks redirect to login instead of
    /// resolving again.
    pub async fn invalidate(&self) {
        let _gate = self.inner.gate.lock().await;
        if let Err(e) = self.inner.store.clear().await {
            tracing::warn!(error = %e, "Failed to clear session token");
        }
        self.context().publish(Session::cleared());
        tracing::info!("Session invalidated");
    }
}

impl std::fmt::Debug for SessionResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionResolver")
            .field("api", &self.inner.api)
            .field("store", &self.inner.store)
            .field("identity", &self.inner.identity)
            .finish_non_exhaustive()
    }
}

/// True if `token` is a JWT whose `exp` claim is at or before `now`.
///
/// Opaque tokens, and JWTs without a readable `exp`, are left for the backend
/// to judge.
#[allow(clippy::cast_precision_loss)]
fn jwt_expired(token: &str, now: i64) -> bool {
    let mut parts = token.split('.');
    let (Some(_header), Some(payload), Some(_signature), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return false;
    };

    let Ok(bytes) = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')) else {
        return false;
    };
    let Ok(claims) = serde_json::from_slice::<serde_json::Value>(&bytes) else {
        return false;
    };

    claims
        .get("exp")
        .and_then(serde_json::Value::as_f64)
        .is_some_and(|exp| exp <= now as f64)
}
