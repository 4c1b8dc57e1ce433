//! Authentication and registration payloads.

use serde::{Deserialize, Serialize};

use ajaxtreon_core::Role;

use super::User;

/// `POST /auth/login` request body.
#[derive(Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// `POST /auth/login` response body.
#[derive(Debug, Deserialize)]
pub(crate) struct LoginResponse {
    #[serde(default)]
    pub token: String,
    pub user: User,
}

/// `GET /auth/me` response body.
///
/// Some backend builds wrap the user in `{ "user": ... }`, others return it bare.
/// `Bare` is tried first: a wrapped body never carries the required `id`/`email`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum MeResponse {
    Bare(User),
    Wrapped { user: Option<User> },
}

impl MeResponse {
    pub fn into_user(self) -> Option<User> {
        match self {
            Self::Wrapped { user } => user,
            Self::Bare(user) => Some(user),
        }
    }
}

/// Self-service registration request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub name: String,
    pub role: Role,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_me_response_wrapped() {
        let me: MeResponse =
            serde_json::from_str(r#"{"user":{"id":"u1","email":"a@b.co","role":"admin"}}"#)
                .unwrap();
        assert_eq!(me.into_user().unwrap().role, Role::Admin);
    }

    #[test]
    fn test_me_response_bare() {
        let me: MeResponse = serde_json::from_str(r#"{"id":"u1","email":"a@b.co"}"#).unwrap();
        assert_eq!(me.into_user().unwrap().id.as_str(), "u1");
    }

    #[test]
    fn test_me_response_null_user() {
        let me: MeResponse = serde_json::from_str(r#"{"user":null}"#).unwrap();
        assert!(me.into_user().is_none());
    }
}
