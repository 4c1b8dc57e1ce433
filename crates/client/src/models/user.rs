//! Application-level user record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use ajaxtreon_core::{Role, UserId};

/// The signed-in user as the backend (or the identity provider's user
/// document) describes them.
///
/// The backend is inconsistent about optional fields, so missing values fall
/// back to: empty name, role `user`, active, created now.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// User ID (older backend builds send it as `uid`).
    #[serde(alias = "uid")]
    pub id: UserId,
    pub email: String,
    #[serde(default, alias = "displayName")]
    pub name: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_picture_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

const fn default_active() -> bool {
    true
}
