//! In-app notifications for the signed-in user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use ajaxtreon_core::NotificationId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: NotificationId,
    #[serde(default)]
    pub title: String,
    pub message: String,
    #[serde(default, alias = "isRead")]
    pub read: bool,
    pub created_at: DateTime<Utc>,
}
