//! Notifications for the signed-in user.

use ajaxtreon_core::NotificationId;

use super::{encode_segment, fail};
use crate::error::ApiError;
use crate::http::ApiClient;
use crate::models::Notification;

#[derive(Clone, Copy)]
pub struct Notifications<'a> {
    api: &'a ApiClient,
}

#[allow(clippy::missing_errors_doc)]
impl<'a> Notifications<'a> {
    pub(crate) const fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    /// Notifications addressed to whoever the session token belongs to.
    pub async fn mine(&self) -> Result<Vec<Notification>, ApiError> {
        self.api
            .get("/notifications/user/me")
            .await
            .map(Option::unwrap_or_default)
            .map_err(|e| fail("Failed to fetch notifications", e))
    }

    pub async fn mark_read(&self, id: &NotificationId) -> Result<(), ApiError> {
        let path = format!("/notifications/{}/read", encode_segment(id.as_str()));
        self.api
            .patch_empty(&path)
            .await
            .map_err(|e| fail("Failed to mark notification as read", e))
    }

    pub async fn delete(&self, id: &NotificationId) -> Result<(), ApiError> {
        let path = format!("/notifications/{}", encode_segment(id.as_str()));
        self.api
            .delete(&path)
            .await
            .map_err(|e| fail("Failed to delete notification", e))
    }
}
