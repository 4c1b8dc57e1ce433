//! Firebase identity provider over its REST APIs.
//!
//! - Password sign-in: Identity Toolkit `accounts:signInWithPassword`
//! - Token refresh: Secure Token `token` (`grant_type=refresh_token`)
//! - User record: Firestore document `users/{uid}`
//!
//! The provider session (uid + refresh token) is persisted in the token store
//! under [`SESSION_KEY`] so it outlives the process, like the browser SDK's
//! local persistence.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::instrument;
use url::Url;

use super::{IdentityError, IdentityProvider, IdentitySession};
use crate::config::FirebaseConfig;
use crate::models::User;
use crate::store::TokenStore;

/// Store key holding the serialized [`IdentitySession`].
pub const SESSION_KEY: &str = "identitySession";

const IDENTITY_TOOLKIT_URL: &str = "https://identitytoolkit.googleapis.com/v1/";
const SECURE_TOKEN_URL: &str = "https://securetoken.googleapis.com/v1/";
const FIRESTORE_URL: &str = "https://firestore.googleapis.com/v1/";

/// Firebase Authentication + Firestore client.
#[derive(Clone)]
pub struct FirebaseIdentity {
    inner: Arc<FirebaseInner>,
}

struct FirebaseInner {
    client: reqwest::Client,
    api_key: SecretString,
    project_id: String,
    store: Arc<dyn TokenStore>,
    identity_toolkit: Url,
    secure_token: Url,
    firestore: Url,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SignInRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInResponse {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
    refresh_token: String,
}

#[derive(Deserialize)]
struct RefreshResponse {
    id_token: String,
    refresh_token: String,
    user_id: String,
}

#[derive(Deserialize)]
struct FirestoreDocument {
    #[serde(default)]
    fields: Map<String, Value>,
}

impl FirebaseIdentity {
    /// Create a Firebase provider that persists its session in `store`.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build or a default endpoint
    /// URL fails to parse.
    pub fn new(
        config: &FirebaseConfig,
        store: Arc<dyn TokenStore>,
        timeout: Duration,
    ) -> Result<Self, IdentityError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        let parse = |raw: &str| Url::parse(raw).map_err(|e| IdentityError::Parse(e.to_string()));

        Ok(Self {
            inner: Arc::new(FirebaseInner {
                client,
                api_key: config.api_key.clone(),
                project_id: config.project_id.clone(),
                store,
                identity_toolkit: parse(IDENTITY_TOOLKIT_URL)?,
                secure_token: parse(SECURE_TOKEN_URL)?,
                firestore: parse(FIRESTORE_URL)?,
            }),
        })
    }

    /// Point the provider at alternative API hosts, such as the Firebase
    /// emulator suite.
    #[must_use]
    pub fn with_endpoints(self, identity_toolkit: Url, secure_token: Url, firestore: Url) -> Self {
        let inner = &self.inner;
        Self {
            inner: Arc::new(FirebaseInner {
                client: inner.client.clone(),
                api_key: inner.api_key.clone(),
                project_id: inner.project_id.clone(),
                store: Arc::clone(&inner.store),
                identity_toolkit,
                secure_token,
                firestore,
            }),
        }
    }

    async fn persist(&self, session: &IdentitySession) -> Result<(), IdentityError> {
        let json =
            serde_json::to_string(session).map_err(|e| IdentityError::Parse(e.to_string()))?;
        self.inner.store.set(SESSION_KEY, &json).await?;
        Ok(())
    }

    fn keyed(&self, base: &Url, segments: &[&str]) -> Result<Url, IdentityError> {
        let mut url = endpoint(base, segments)?;
        url.query_pairs_mut()
            .append_pair("key", self.inner.api_key.expose_secret());
        Ok(url)
    }
}

#[async_trait]
impl IdentityProvider for FirebaseIdentity {
    async fn current_session(&self) -> Result<Option<IdentitySession>, IdentityError> {
        let Some(raw) = self.inner.store.get(SESSION_KEY).await? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                tracing::warn!(error = %e, "Discarding unreadable identity session");
                self.inner.store.remove(SESSION_KEY).await?;
                Ok(None)
            }
        }
    }

    #[instrument(skip(self, session), fields(uid = %session.uid))]
    async fn exchange_token(
        &self,
        session: &IdentitySession,
    ) -> Result<SecretString, IdentityError> {
        let url = self.keyed(&self.inner.secure_token, &["token"])?;
        let body = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("grant_type", "refresh_token")
            .append_pair("refresh_token", session.refresh_token.expose_secret())
            .finish();

        let response = self
            .inner
            .client
            .post(url)
            .header(
                reqwest::header::CONTENT_TYPE,
                "application/x-www-form-urlencoded",
            )
            .body(body)
            .send()
            .await?;
        let refreshed: RefreshResponse = handle_response(response).await?;

        if refreshed.user_id != session.uid {
            return Err(IdentityError::Parse(
                "refreshed token belongs to a different user".to_string(),
            ));
        }

        // Refresh tokens may rotate.
        if refreshed.refresh_token != session.refresh_token.expose_secret() {
            self.persist(&IdentitySession {
                uid: session.uid.clone(),
                email: session.email.clone(),
                refresh_token: SecretString::from(refreshed.refresh_token),
            })
            .await?;
        }

        Ok(SecretString::from(refreshed.id_token))
    }

    #[instrument(skip(self, session, token), fields(uid = %session.uid))]
    async fn lookup_user(
        &self,
        session: &IdentitySession,
        token: &SecretString,
    ) -> Result<Option<User>, IdentityError> {
        let url = endpoint(
            &self.inner.firestore,
            &[
                "projects",
                self.inner.project_id.as_str(),
                "databases",
                "(default)",
                "documents",
                "users",
                session.uid.as_str(),
            ],
        )?;

        let response = self
            .inner
            .client
            .get(url)
            .bearer_auth(token.expose_secret())
            .send()
            .await?;

        if response.status().as_u16() == 404 {
            tracing::debug!("No user document for identity session");
            return Ok(None);
        }

        let document: FirestoreDocument = handle_response(response).await?;
        let mut record: Map<String, Value> = document
            .fields
            .into_iter()
            .map(|(key, value)| (key, firestore_value(value)))
            .collect();
        record
            .entry("id")
            .or_insert_with(|| Value::String(session.uid.clone()));

        serde_json::from_value(Value::Object(record))
            .map(Some)
            .map_err(|e| IdentityError::Parse(format!("user document: {e}")))
    }

    #[instrument(skip(self, password))]
    async fn sign_in(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<IdentitySession, IdentityError> {
        let url = self.keyed(&self.inner.identity_toolkit, &["accounts:signInWithPassword"])?;
        let response = self
            .inner
            .client
            .post(url)
            .json(&SignInRequest {
                email,
                password: password.expose_secret(),
                return_secure_token: true,
            })
            .send()
            .await?;
        let signed_in: SignInResponse = handle_response(response).await?;

        let session = IdentitySession {
            uid: signed_in.local_id,
            email: signed_in.email.or_else(|| Some(email.to_string())),
            refresh_token: SecretString::from(signed_in.refresh_token),
        };
        self.persist(&session).await?;
        tracing::info!(uid = %session.uid, "Signed in to identity provider");
        Ok(session)
    }

    async fn sign_out(&self) -> Result<(), IdentityError> {
        self.inner.store.remove(SESSION_KEY).await?;
        Ok(())
    }
}

impl std::fmt::Debug for FirebaseIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FirebaseIdentity")
            .field("project_id", &self.inner.project_id)
            .field("api_key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

/// Append path segments to `base`, percent-encoding each one.
fn endpoint(base: &Url, segments: &[&str]) -> Result<Url, IdentityError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| IdentityError::Parse(format!("{base} cannot be a base URL")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

async fn handle_response<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, IdentityError> {
    let status = response.status();
    if status.is_success() {
        return response
            .json()
            .await
            .map_err(|e| IdentityError::Parse(e.to_string()));
    }

    let text = response.text().await.unwrap_or_default();
    Err(IdentityError::Api {
        status: status.as_u16(),
        message: google_error_message(&text).unwrap_or(text),
    })
}

/// Google APIs report `{"error": {"message": "INVALID_PASSWORD", ...}}`.
fn google_error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value
        .pointer("/error/message")
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Flatten a Firestore typed value (`{"stringValue": "x"}`) into plain JSON.
fn firestore_value(value: Value) -> Value {
    let Value::Object(mut typed) = value else {
        return value;
    };

    if let Some(v) = typed.remove("integerValue") {
        return match v {
            Value::String(s) => s.parse::<i64>().map_or(Value::String(s), Value::from),
            other => other,
        };
    }
    if let Some(Value::Object(mut map)) = typed.remove("mapValue") {
        let fields = match map.remove("fields") {
            Some(Value::Object(fields)) => fields,
            _ => Map::new(),
        };
        return Value::Object(
            fields
                .into_iter()
                .map(|(k, v)| (k, firestore_value(v)))
                .collect(),
        );
    }
    if let Some(Value::Object(mut array)) = typed.remove("arrayValue") {
        let values = match array.remove("values") {
            Some(Value::Array(values)) => values,
            _ => Vec::new(),
        };
        return Value::Array(values.into_iter().map(firestore_value).collect());
    }
    if typed.contains_key("nullValue") {
        return Value::Null;
    }

    // stringValue, booleanValue, doubleValue, timestampValue, referenceValue
    typed
        .into_iter()
        .next()
        .map_or(Value::Null, |(_, v)| v)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::sync::Mutex;

    use axum::extract::{Path, State};
    use axum::http::{HeaderMap, StatusCode, Uri};
    use axum::response::{IntoResponse, Response};
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::json;

    use super::*;
    use crate::store::MemoryTokenStore;

    const API_KEY: &str = "test-key";
    const PROJECT: &str = "demo-project";

    /// Requests seen by the Google stand-in, as `path?query` plus body.
    #[derive(Clone, Default)]
    struct Google {
        calls: Arc<Mutex<Vec<(String, String)>>>,
    }

    impl Google {
        fn record(&self, uri: &Uri, body: &str) {
            let target = uri
                .path_and_query()
                .map_or_else(|| uri.path().to_string(), ToString::to_string);
            self.calls.lock().unwrap().push((target, body.to_string()));
        }

        fn calls(&self) -> Vec<(String, String)> {
            self.calls.lock().unwrap().clone()
        }
    }

    fn google_error(status: StatusCode, message: &str) -> Response {
        (
            status,
            Json(json!({"error": {"code": status.as_u16(), "message": message}})),
        )
            .into_response()
    }

    async fn sign_in_with_password(
        State(google): State<Google>,
        uri: Uri,
        Json(body): Json<Value>,
    ) -> Response {
        google.record(&uri, &body.to_string());
        if body["password"] != "rahasia" || body["returnSecureToken"] != true {
            return google_error(StatusCode::BAD_REQUEST, "INVALID_PASSWORD");
        }
        Json(json!({
            "localId": "uid-7",
            "email": body["email"],
            "idToken": "id-0",
            "refreshToken": "refresh-old",
            "expiresIn": "3600"
        }))
        .into_response()
    }

    async fn refresh_token(State(google): State<Google>, uri: Uri, body: String) -> Response {
        google.record(&uri, &body);
        let form: std::collections::HashMap<String, String> =
            url::form_urlencoded::parse(body.as_bytes())
                .into_owned()
                .collect();
        if form.get("grant_type").map(String::as_str) != Some("refresh_token") {
            return google_error(StatusCode::BAD_REQUEST, "INVALID_GRANT_TYPE");
        }
        let (user_id, rotated) = match form.get("refresh_token").map(String::as_str) {
            Some("refresh-old") => ("uid-7", "refresh-new"),
            Some("refresh-stable") => ("uid-7", "refresh-stable"),
            Some("refresh-other") => ("uid-other", "refresh-other"),
            _ => return google_error(StatusCode::BAD_REQUEST, "TOKEN_EXPIRED"),
        };
        Json(json!({
            "access_token": "id-1",
            "expires_in": "3600",
            "token_type": "Bearer",
            "id_token": "id-1",
            "refresh_token": rotated,
            "user_id": user_id,
            "project_id": PROJECT
        }))
        .into_response()
    }

    async fn user_document(
        State(google): State<Google>,
        uri: Uri,
        headers: HeaderMap,
        Path((project, _database, uid)): Path<(String, String, String)>,
    ) -> Response {
        google.record(&uri, "");
        let bearer = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok());
        if bearer != Some("Bearer id-1") {
            return google_error(StatusCode::UNAUTHORIZED, "UNAUTHENTICATED");
        }
        if project != PROJECT || uid != "uid-7" {
            return google_error(StatusCode::NOT_FOUND, "Document not found");
        }
        Json(json!({
            "name": format!("projects/{PROJECT}/databases/(default)/documents/users/{uid}"),
            "fields": {
                "email": {"stringValue": "rina@toko.id"},
                "name": {"stringValue": "Rina"},
                "role": {"stringValue": "seller"},
                "isActive": {"booleanValue": true},
                "createdAt": {"timestampValue": "2024-05-01T08:00:00Z"},
                "phone": {"nullValue": null}
            }
        }))
        .into_response()
    }

    async fn spawn_google() -> (String, Google) {
        let google = Google::default();
        let app = Router::new()
            .route(
                "/identity/v1/accounts:signInWithPassword",
                post(sign_in_with_password),
            )
            .route("/securetoken/v1/token", post(refresh_token))
            .route(
                "/firestore/v1/projects/{project}/databases/{database}/documents/users/{uid}",
                get(user_document),
            )
            .with_state(google.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        (format!("http://{addr}"), google)
    }

    fn firebase(base: &str, store: Arc<MemoryTokenStore>) -> FirebaseIdentity {
        let config = FirebaseConfig {
            api_key: SecretString::from(API_KEY),
            project_id: PROJECT.to_string(),
        };
        let url = |service: &str| Url::parse(&format!("{base}/{service}/v1/")).unwrap();
        FirebaseIdentity::new(&config, store, Duration::from_secs(5))
            .unwrap()
            .with_endpoints(url("identity"), url("securetoken"), url("firestore"))
    }

    fn session(refresh_token: &str) -> IdentitySession {
        IdentitySession {
            uid: "uid-7".to_string(),
            email: Some("rina@toko.id".to_string()),
            refresh_token: SecretString::from(refresh_token),
        }
    }

    async fn stored_session(store: &MemoryTokenStore) -> Option<IdentitySession> {
        store
            .get(SESSION_KEY)
            .await
            .unwrap()
            .map(|raw| serde_json::from_str(&raw).unwrap())
    }

    #[tokio::test]
    async fn test_sign_in_persists_session() {
        let (base, google) = spawn_google().await;
        let store = Arc::new(MemoryTokenStore::new());
        let firebase = firebase(&base, Arc::clone(&store));

        let signed_in = firebase
            .sign_in("rina@toko.id", &SecretString::from("rahasia"))
            .await
            .unwrap();
        assert_eq!(signed_in.uid, "uid-7");
        assert_eq!(signed_in.email.as_deref(), Some("rina@toko.id"));

        let persisted = stored_session(&store).await.unwrap();
        assert_eq!(persisted.uid, "uid-7");
        assert_eq!(persisted.refresh_token.expose_secret(), "refresh-old");

        let current = firebase.current_session().await.unwrap().unwrap();
        assert_eq!(current.uid, "uid-7");

        let (target, _) = &google.calls()[0];
        assert_eq!(
            target,
            "/identity/v1/accounts:signInWithPassword?key=test-key"
        );
    }

    #[tokio::test]
    async fn test_sign_in_rejected_persists_nothing() {
        let (base, _google) = spawn_google().await;
        let store = Arc::new(MemoryTokenStore::new());
        let firebase = firebase(&base, Arc::clone(&store));

        let err = firebase
            .sign_in("rina@toko.id", &SecretString::from("salah"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            IdentityError::Api { status: 400, ref message } if message == "INVALID_PASSWORD"
        ));
        assert!(stored_session(&store).await.is_none());
    }

    #[tokio::test]
    async fn test_exchange_persists_rotated_refresh_token() {
        let (base, google) = spawn_google().await;
        let store = Arc::new(MemoryTokenStore::new());
        let firebase = firebase(&base, Arc::clone(&store));

        let token = firebase
            .exchange_token(&session("refresh-old"))
            .await
            .unwrap();
        assert_eq!(token.expose_secret(), "id-1");

        let persisted = stored_session(&store).await.unwrap();
        assert_eq!(persisted.uid, "uid-7");
        assert_eq!(persisted.email.as_deref(), Some("rina@toko.id"));
        assert_eq!(persisted.refresh_token.expose_secret(), "refresh-new");

        let (target, body) = &google.calls()[0];
        assert_eq!(target, "/securetoken/v1/token?key=test-key");
        assert_eq!(body, "grant_type=refresh_token&refresh_token=refresh-old");
    }

    #[tokio::test]
    async fn test_exchange_without_rotation_leaves_store_alone() {
        let (base, _google) = spawn_google().await;
        let store = Arc::new(MemoryTokenStore::new());
        let firebase = firebase(&base, Arc::clone(&store));

        let token = firebase
            .exchange_token(&session("refresh-stable"))
            .await
            .unwrap();

        assert_eq!(token.expose_secret(), "id-1");
        assert!(stored_session(&store).await.is_none());
    }

    #[tokio::test]
    async fn test_exchange_rejects_token_for_other_user() {
        let (base, _google) = spawn_google().await;
        let store = Arc::new(MemoryTokenStore::new());
        let firebase = firebase(&base, Arc::clone(&store));

        let err = firebase
            .exchange_token(&session("refresh-other"))
            .await
            .unwrap_err();

        assert!(matches!(err, IdentityError::Parse(_)));
        assert!(stored_session(&store).await.is_none());
    }

    #[tokio::test]
    async fn test_exchange_surfaces_google_error() {
        let (base, _google) = spawn_google().await;
        let firebase = firebase(&base, Arc::new(MemoryTokenStore::new()));

        let err = firebase
            .exchange_token(&session("refresh-revoked"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            IdentityError::Api { status: 400, ref message } if message == "TOKEN_EXPIRED"
        ));
    }

    #[tokio::test]
    async fn test_lookup_user_reads_firestore_document() {
        let (base, google) = spawn_google().await;
        let firebase = firebase(&base, Arc::new(MemoryTokenStore::new()));

        let user = firebase
            .lookup_user(&session("refresh-old"), &SecretString::from("id-1"))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(user.id.as_str(), "uid-7");
        assert_eq!(user.email, "rina@toko.id");
        assert_eq!(user.name, "Rina");
        assert_eq!(user.role, ajaxtreon_core::Role::Seller);
        assert!(user.is_active);
        assert_eq!(user.phone, None);

        let (target, _) = &google.calls()[0];
        assert_eq!(
            target,
            "/firestore/v1/projects/demo-project/databases/(default)/documents/users/uid-7"
        );
    }

    #[tokio::test]
    async fn test_lookup_user_missing_document_is_none() {
        let (base, _google) = spawn_google().await;
        let firebase = firebase(&base, Arc::new(MemoryTokenStore::new()));
        let gone = IdentitySession {
            uid: "uid-gone".to_string(),
            ..session("refresh-old")
        };

        let user = firebase
            .lookup_user(&gone, &SecretString::from("id-1"))
            .await
            .unwrap();

        assert!(user.is_none());
    }

    #[tokio::test]
    async fn test_sign_out_forgets_session() {
        let (base, _google) = spawn_google().await;
        let store = Arc::new(MemoryTokenStore::new());
        let firebase = firebase(&base, Arc::clone(&store));
        firebase
            .sign_in("rina@toko.id", &SecretString::from("rahasia"))
            .await
            .unwrap();

        firebase.sign_out().await.unwrap();

        assert!(firebase.current_session().await.unwrap().is_none());
    }

    #[test]
    fn test_firestore_document_flattens_to_user() {
        let fields = json!({
            "email": {"stringValue": "owner@toko.co.id"},
            "name": {"stringValue": "Owner"},
            "role": {"stringValue": "seller"},
            "isActive": {"booleanValue": true},
            "createdAt": {"timestampValue": "2024-05-01T08:00:00Z"},
            "loginCount": {"integerValue": "7"},
            "tags": {"arrayValue": {"values": [{"stringValue": "vip"}]}},
            "phone": {"nullValue": null}
        });
        let flat: Map<String, Value> = fields
            .as_object()
            .unwrap()
            .clone()
            .into_iter()
            .map(|(k, v)| (k, firestore_value(v)))
            .collect();
        assert_eq!(flat["loginCount"], json!(7));
        assert_eq!(flat["tags"], json!(["vip"]));
        assert_eq!(flat["phone"], Value::Null);

        let mut record = flat;
        record.insert("id".to_string(), json!("uid-9"));
        let user: User = serde_json::from_value(Value::Object(record)).unwrap();
        assert_eq!(user.id.as_str(), "uid-9");
        assert_eq!(user.role, ajaxtreon_core::Role::Seller);
    }

    #[test]
    fn test_endpoint_keeps_colon_segment() {
        let base = Url::parse(IDENTITY_TOOLKIT_URL).unwrap();
        let url = endpoint(&base, &["accounts:signInWithPassword"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://identitytoolkit.googleapis.com/v1/accounts:signInWithPassword"
        );
    }

    #[test]
    fn test_google_error_message() {
        let body = r#"{"error":{"code":400,"message":"INVALID_PASSWORD"}}"#;
        assert_eq!(
            google_error_message(body).as_deref(),
            Some("INVALID_PASSWORD")
        );
        assert_eq!(google_error_message("oops"), None);
    }
}
