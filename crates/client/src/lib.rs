//! Ajaxtreon ERP client.
//!
//! An async SDK for the Ajaxtreon ERP REST backend (inventory, CRM, orders,
//! purchases, reporting).
//!
//! # Architecture
//!
//! - [`session::SessionContext`] holds the one process-wide session. It is
//!   written only by [`session::SessionResolver`]; everything else reads it.
//! - The resolver establishes the session once: first from the durable token
//!   in a [`store::TokenStore`], then through an
//!   [`identity::IdentityProvider`] (Firebase), and otherwise settles on
//!   "signed out".
//! - [`guard::RouteGuard`] decides, per navigation target, whether to allow it
//!   or where to redirect, based on the user's role.
//! - [`http::ApiClient`] carries the session's bearer token on every call and
//!   exposes typed [`resources`] wrappers.
//!
//! # Example
//!
//! ```rust,ignore
//! let config = ClientConfig::from_env()?;
//! let api = ApiClient::new(&config, SessionContext::new())?;
//! let store = Arc::new(FileTokenStore::new(&config.token_store_path));
//! let resolver = SessionResolver::new(api.clone(), store, Arc::new(NoIdentityProvider));
//!
//! resolver.resolve().await;
//! let leads = api.leads().list().await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod format;
pub mod guard;
pub mod http;
pub mod identity;
pub mod models;
pub mod resources;
pub mod session;
pub mod store;
pub mod validation;

pub use config::{ClientConfig, ConfigError, FirebaseConfig};
pub use error::{ApiError, HttpError};
pub use guard::{Navigation, RouteGuard};
pub use http::ApiClient;
pub use session::{Session, SessionContext, SessionResolver};
