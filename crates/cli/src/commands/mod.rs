//! Command implementations and the shared wiring they run on.

pub mod auth;
pub mod resources;
pub mod route;

use std::sync::Arc;

use ajaxtreon_client::identity::{
    FirebaseIdentity, IdentityError, IdentityProvider, NoIdentityProvider,
};
use ajaxtreon_client::store::{FileTokenStore, TokenStore};
use ajaxtreon_client::{
    ApiClient, ApiError, ClientConfig, ConfigError, HttpError, SessionContext, SessionResolver,
};
use ajaxtreon_core::EmailError;
use serde::Serialize;
use thiserror::Error;

/// Errors that end a command.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Http(#[from] HttpError),

    #[error("Identity provider error: {0}")]
    Identity(#[from] IdentityError),

    #[error("{}", .0.message())]
    Api(#[from] ApiError),

    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    #[error("Not signed in. Run `ajx login` first.")]
    NotSignedIn,

    #[error("No password given. Set AJAXTREON_PASSWORD or type it when prompted.")]
    MissingPassword,

    #[error("Invalid stock quantity {0}: must be non-zero and at most {max}", max = u32::MAX)]
    InvalidQuantity(i64),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to render output: {0}")]
    Output(#[from] serde_json::Error),
}

/// Everything a command needs: the resolver and the client it writes through.
pub struct Context {
    pub resolver: SessionResolver,
}

impl Context {
    /// Build the client stack from environment configuration.
    ///
    /// The Firebase fallback is wired in only when its variables are set.
    pub fn from_env() -> Result<Self, CliError> {
        let config = ClientConfig::from_env()?;
        let api = ApiClient::new(&config, SessionContext::new())?;
        let store: Arc<dyn TokenStore> = Arc::new(FileTokenStore::new(&config.token_store_path));

        let identity: Arc<dyn IdentityProvider> = match config.firebase() {
            Some(firebase) => Arc::new(FirebaseIdentity::new(
                firebase,
                Arc::clone(&store),
                config.http_timeout,
            )?),
            None => Arc::new(NoIdentityProvider),
        };

        tracing::debug!(
            base_url = %config.api_base_url,
            token_store = %config.token_store_path.display(),
            "Client configured"
        );

        Ok(Self {
            resolver: SessionResolver::new(api, store, identity),
        })
    }

    pub fn api(&self) -> &ApiClient {
        self.resolver.api()
    }

    /// Resolve the session and fail unless someone is signed in.
    pub async fn require_session(&self) -> Result<(), CliError> {
        if self.resolver.resolve().await.is_authenticated() {
            Ok(())
        } else {
            Err(CliError::NotSignedIn)
        }
    }

    /// Run a resource call, dropping the session if the backend rejects it.
    pub async fn call<T>(
        &self,
        result: impl Future<Output = Result<T, ApiError>>,
    ) -> Result<T, CliError> {
        match result.await {
            Err(e) if e.is_unauthorized() => {
                self.resolver.invalidate().await;
                Err(CliError::NotSignedIn)
            }
            other => Ok(other?),
        }
    }
}

/// Print a value as pretty JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
