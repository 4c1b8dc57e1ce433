//! Typed wrappers over the backend's REST resources.
//!
//! Each family is a thin borrowed view over [`ApiClient`], obtained through an
//! accessor such as [`ApiClient::leads`]. Failures other than `Unauthorized`
//! are logged with their cause and reported as
//! [`ApiError::RequestFailed`] with status 500 and a message that names the
//! operation, e.g. "Failed to fetch leads". The backend's own status and
//! message only reach the log. `Unauthorized` passes through untouched so the
//! caller can invalidate the session.

mod crm;
mod inventory;
mod notifications;
mod partners;
mod reports;
mod sales;
mod users;

pub use crm::{Activities, Contacts, CrmUsers, Leads, Opportunities};
pub use inventory::{Categories, Products, Stocks};
pub use notifications::Notifications;
pub use partners::{Sellers, Suppliers};
pub use reports::Reports;
pub use sales::{Orders, Purchases};
pub use users::{Registrations, Users};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::ApiError;
use crate::http::ApiClient;
use crate::models::CreatedId;

/// Status every normalized resource failure carries.
const FAILED_STATUS: u16 = 500;

/// Normalize a failed call into the caller-facing error for `operation`.
pub(crate) fn fail(operation: &str, err: ApiError) -> ApiError {
    if err.is_unauthorized() {
        return err;
    }
    tracing::error!(error = %err, status = err.status_code(), "{operation}");
    ApiError::RequestFailed {
        status: FAILED_STATUS,
        message: operation.to_string(),
    }
}

/// CRUD operations on one REST collection.
#[derive(Clone, Copy)]
pub(crate) struct Collection<'a> {
    api: &'a ApiClient,
    path: &'static str,
    singular: &'static str,
    plural: &'static str,
}

impl<'a> Collection<'a> {
    pub(crate) const fn new(
        api: &'a ApiClient,
        path: &'static str,
        singular: &'static str,
        plural: &'static str,
    ) -> Self {
        Self {
            api,
            path,
            singular,
            plural,
        }
    }

    fn item_path(&self, id: &str) -> String {
        format!("{}/{}", self.path, encode_segment(id))
    }

    /// Every record; a `null` body is an empty list.
    pub(crate) async fn list<T: DeserializeOwned>(&self) -> Result<Vec<T>, ApiError> {
        self.list_at(self.path, &format!("Failed to fetch {}", self.plural))
            .await
    }

    /// Records from a sub-path such as `/contacts/lead/{id}`.
    pub(crate) async fn list_at<T: DeserializeOwned>(
        &self,
        path: &str,
        operation: &str,
    ) -> Result<Vec<T>, ApiError> {
        self.api
            .get::<Vec<T>>(path)
            .await
            .map(Option::unwrap_or_default)
            .map_err(|e| fail(operation, e))
    }

    /// One record; 404 or a `null` body is `None`.
    pub(crate) async fn get<T: DeserializeOwned>(&self, id: &str) -> Result<Option<T>, ApiError> {
        self.get_at(&self.item_path(id), &format!("Failed to fetch {}", self.singular))
            .await
    }

    pub(crate) async fn get_at<T: DeserializeOwned>(
        &self,
        path: &str,
        operation: &str,
    ) -> Result<Option<T>, ApiError> {
        match self.api.get::<T>(path).await {
            Ok(found) => Ok(found),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(fail(operation, e)),
        }
    }

    /// Create a record and return what the backend answers with.
    pub(crate) async fn create<B, T>(&self, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let operation = format!("Failed to create {}", self.singular);
        self.api
            .post::<B, T>(self.path, body)
            .await
            .and_then(|created| created.ok_or_else(empty_body))
            .map_err(|e| fail(&operation, e))
    }

    /// Create a record on an endpoint that answers `{"id": ...}`.
    pub(crate) async fn add<B>(&self, body: &B) -> Result<String, ApiError>
    where
        B: Serialize + Sync,
    {
        let operation = format!("Failed to add {}", self.singular);
        self.api
            .post::<B, CreatedId>(self.path, body)
            .await
            .map(|created| created.map(|c| c.id).unwrap_or_default())
            .map_err(|e| fail(&operation, e))
    }

    /// Replace fields of a record and return the updated record.
    pub(crate) async fn update<B, T>(&self, id: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let operation = format!("Failed to update {}", self.singular);
        self.api
            .put::<B, T>(&self.item_path(id), body)
            .await
            .and_then(|updated| updated.ok_or_else(empty_body))
            .map_err(|e| fail(&operation, e))
    }

    /// Update a record whose endpoint answers without a usable body.
    pub(crate) async fn update_quietly<B>(&self, id: &str, body: &B) -> Result<(), ApiError>
    where
        B: Serialize + Sync,
    {
        let operation = format!("Failed to update {}", self.singular);
        self.api
            .put::<B, serde::de::IgnoredAny>(&self.item_path(id), body)
            .await
            .map(drop)
            .map_err(|e| fail(&operation, e))
    }

    pub(crate) async fn delete(&self, id: &str) -> Result<(), ApiError> {
        let operation = format!("Failed to delete {}", self.singular);
        self.api
            .delete(&self.item_path(id))
            .await
            .map_err(|e| fail(&operation, e))
    }
}

fn empty_body() -> ApiError {
    ApiError::InvalidResponse("empty response body".to_string())
}

/// Percent-encode a value used as a single path segment.
pub(crate) fn encode_segment(raw: &str) -> String {
    url::form_urlencoded::byte_serialize(raw.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

impl ApiClient {
    #[must_use]
    pub const fn leads(&self) -> Leads<'_> {
        Leads::new(self)
    }

    #[must_use]
    pub const fn contacts(&self) -> Contacts<'_> {
        Contacts::new(self)
    }

    #[must_use]
    pub const fn opportunities(&self) -> Opportunities<'_> {
        Opportunities::new(self)
    }

    #[must_use]
    pub const fn activities(&self) -> Activities<'_> {
        Activities::new(self)
    }

    /// CRM back-office users (`/users`), distinct from [`ApiClient::users`].
    #[must_use]
    pub const fn crm_users(&self) -> CrmUsers<'_> {
        CrmUsers::new(self)
    }

    #[must_use]
    pub const fn suppliers(&self) -> Suppliers<'_> {
        Suppliers::new(self)
    }

    #[must_use]
    pub const fn sellers(&self) -> Sellers<'_> {
        Sellers::new(self)
    }

    #[must_use]
    pub const fn products(&self) -> Products<'_> {
        Products::new(self)
    }

    #[must_use]
    pub const fn categories(&self) -> Categories<'_> {
        Categories::new(self)
    }

    #[must_use]
    pub const fn stocks(&self) -> Stocks<'_> {
        Stocks::new(self)
    }

    #[must_use]
    pub const fn orders(&self) -> Orders<'_> {
        Orders::new(self)
    }

    #[must_use]
    pub const fn purchases(&self) -> Purchases<'_> {
        Purchases::new(self)
    }

    #[must_use]
    pub const fn reports(&self) -> Reports<'_> {
        Reports::new(self)
    }

    /// Application users (`/user`).
    #[must_use]
    pub const fn users(&self) -> Users<'_> {
        Users::new(self)
    }

    #[must_use]
    pub const fn notifications(&self) -> Notifications<'_> {
        Notifications::new(self)
    }

    /// Self-service sign-up; needs no session.
    #[must_use]
    pub const fn registrations(&self) -> Registrations<'_> {
        Registrations::new(self)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_fail_passes_unauthorized_through() {
        let err = fail("Failed to fetch leads", ApiError::Unauthorized);
        assert!(err.is_unauthorized());
    }

    #[test]
    fn test_fail_replaces_message_and_status() {
        for backend_status in [404, 409, 422, 503] {
            let err = fail(
                "Failed to fetch leads",
                ApiError::Status {
                    status: backend_status,
                    message: "SQLSTATE 23505".to_string(),
                },
            );
            assert_eq!(err.status_code(), 500);
            assert_eq!(err.message(), "Failed to fetch leads");
            assert!(matches!(err, ApiError::RequestFailed { .. }));
        }

        let err = fail(
            "Failed to add stock",
            ApiError::InvalidResponse("empty response body".to_string()),
        );
        assert_eq!(err.status_code(), 500);
        assert_eq!(err.message(), "Failed to add stock");
    }

    #[test]
    fn test_encode_segment() {
        assert_eq!(encode_segment("abc-123"), "abc-123");
        assert_eq!(encode_segment("a b/c"), "a%20b%2Fc");
        assert_eq!(encode_segment("rina@toko.id"), "rina%40toko.id");
    }
}
