//! External identity provider.
//!
//! When the backend rejects (or never had) a cached token, the resolver asks
//! the identity provider whether the user still has a live session there and,
//! if so, exchanges it for a fresh bearer token.

mod firebase;

pub use firebase::{FirebaseIdentity, SESSION_KEY};

use async_trait::async_trait;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::User;
use crate::store::StoreError;

/// Errors that can occur when talking to the identity provider.
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Identity provider error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse identity provider response: {0}")]
    Parse(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("No identity provider is configured")]
    Unavailable,
}

/// A live session with the identity provider.
///
/// Implements `Debug` manually to redact the refresh token.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentitySession {
    /// Provider-side user ID; also the key of the user's record.
    pub uid: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(with = "secret_string")]
    pub refresh_token: SecretString,
}

impl std::fmt::Debug for IdentitySession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentitySession")
            .field("uid", &self.uid)
            .field("email", &self.email)
            .field("refresh_token", &"[REDACTED]")
            .finish()
    }
}

mod secret_string {
    use secrecy::{ExposeSecret, SecretString};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(secret: &SecretString, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(secret.expose_secret())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<SecretString, D::Error> {
        String::deserialize(d).map(SecretString::from)
    }
}

/// Identity provider consulted when the cached backend token is unusable.
#[async_trait]
pub trait IdentityProvider: Send + Sync + std::fmt::Debug {
    /// The provider's current session, if the user is still signed in.
    async fn current_session(&self) -> Result<Option<IdentitySession>, IdentityError>;

    /// Exchange a session for a fresh bearer token, forcing a refresh.
    async fn exchange_token(&self, session: &IdentitySession)
    -> Result<SecretString, IdentityError>;

    /// Application-level user record for the session, if one exists.
    async fn lookup_user(
        &self,
        session: &IdentitySession,
        token: &SecretString,
    ) -> Result<Option<User>, IdentityError>;

    /// Establish a provider session from credentials.
    async fn sign_in(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<IdentitySession, IdentityError>;

    /// End the provider session.
    async fn sign_out(&self) -> Result<(), IdentityError>;
}

/// Provider for deployments that authenticate against the backend only.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoIdentityProvider;

#[async_trait]
impl IdentityProvider for NoIdentityProvider {
    async fn current_session(&self) -> Result<Option<IdentitySession>, IdentityError> {
        Ok(None)
    }

    async fn exchange_token(
        &self,
        _session: &IdentitySession,
    ) -> Result<SecretString, IdentityError> {
        Err(IdentityError::Unavailable)
    }

    async fn lookup_user(
        &self,
        _session: &IdentitySession,
        _token: &SecretString,
    ) -> Result<Option<User>, IdentityError> {
        Ok(None)
    }

    async fn sign_in(
        &self,
        _email: &str,
        _password: &SecretString,
    ) -> Result<IdentitySession, IdentityError> {
        Err(IdentityError::Unavailable)
    }

    async fn sign_out(&self) -> Result<(), IdentityError> {
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    #[test]
    fn test_identity_session_debug_redacts_refresh_token() {
        let session = IdentitySession {
            uid: "uid-1".to_string(),
            email: None,
            refresh_token: SecretString::from("refresh-secret"),
        };
        let debug = format!("{session:?}");
        assert!(debug.contains("uid-1"));
        assert!(!debug.contains("refresh-secret"));
    }

    #[test]
    fn test_identity_session_persisted_shape() {
        let session: IdentitySession =
            serde_json::from_str(r#"{"uid":"uid-1","refreshToken":"r1"}"#).unwrap();
        assert_eq!(session.refresh_token.expose_secret(), "r1");
        let back = serde_json::to_value(&session).unwrap();
        assert_eq!(back["refreshToken"], "r1");
    }

    #[tokio::test]
    async fn test_no_identity_provider_has_no_session() {
        let provider = NoIdentityProvider;
        assert!(provider.current_session().await.unwrap().is_none());
        assert!(provider.sign_out().await.is_ok());
        assert!(matches!(
            provider
                .sign_in("a@b.co", &SecretString::from("pw"))
                .await,
            Err(IdentityError::Unavailable)
        ));
    }
}
