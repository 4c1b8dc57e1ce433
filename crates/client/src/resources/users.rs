//! Application users and self-service registration.

use ajaxtreon_core::Role;
use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};

use super::fail;
use crate::error::ApiError;
use crate::http::{ApiClient, Auth};
use crate::models::{Registration, User};

/// `/user`
#[derive(Clone, Copy)]
pub struct Users<'a> {
    api: &'a ApiClient,
}

#[allow(clippy::missing_errors_doc)]
impl<'a> Users<'a> {
    pub(crate) const fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    /// Every application user.
    pub async fn list(&self) -> Result<Vec<User>, ApiError> {
        self.api
            .get("/user")
            .await
            .map(Option::unwrap_or_default)
            .map_err(|e| fail("Failed to fetch users", e))
    }
}

/// Sign-up endpoints. These need no session.
#[derive(Clone, Copy)]
pub struct Registrations<'a> {
    api: &'a ApiClient,
}

#[allow(clippy::missing_errors_doc)]
impl<'a> Registrations<'a> {
    pub(crate) const fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    /// Register a plain user account.
    pub async fn register(
        &self,
        email: &str,
        password: &SecretString,
        name: &str,
    ) -> Result<(), ApiError> {
        self.submit("/auth/register", Role::User, email, password, name)
            .await
            .map_err(|e| fail("Failed to register", e))
    }

    /// Register a seller account.
    pub async fn register_seller(
        &self,
        email: &str,
        password: &SecretString,
        name: &str,
    ) -> Result<(), ApiError> {
        self.submit("/auth/register-seller", Role::Seller, email, password, name)
            .await
            .map_err(|e| fail("Failed to register seller", e))
    }

    async fn submit(
        &self,
        path: &str,
        role: Role,
        email: &str,
        password: &SecretString,
        name: &str,
    ) -> Result<(), ApiError> {
        let body = Registration {
            email: email.to_string(),
            password: password.expose_secret().to_string(),
            name: name.to_string(),
            role,
        };
        self.api
            .send_as::<_, serde::de::IgnoredAny>(Method::POST, path, Auth::Anonymous, Some(&body))
            .await
            .map(drop)
    }
}
