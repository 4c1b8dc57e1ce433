//! HTTP client for the ERP REST backend.
//!
//! Every authenticated request reads the bearer token from the shared
//! [`SessionContext`] at send time, so a login or logout elsewhere in the
//! process is picked up by the next call.

use std::sync::Arc;

use reqwest::Method;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::instrument;
use url::Url;
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::error::{ApiError, HttpError};
use crate::session::SessionContext;

/// Header carrying a per-request correlation ID.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// How a request is authenticated.
#[derive(Clone, Copy)]
pub(crate) enum Auth<'a> {
    /// Bearer token from the session; missing token fails before sending.
    Session,
    /// Explicit bearer token, used while the session is being established.
    Token(&'a SecretString),
    /// No `Authorization` header.
    Anonymous,
}

/// ERP backend client.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    http: reqwest::Client,
    base_url: Url,
    session: SessionContext,
}

impl ApiClient {
    /// Create a client bound to `session`.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &ClientConfig, session: SessionContext) -> Result<Self, HttpError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.http_timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                http,
                base_url: config.api_base_url.clone(),
                session,
            }),
        })
    }

    /// Read-only view of the session this client authenticates with.
    #[must_use]
    pub fn session(&self) -> &SessionContext {
        &self.inner.session
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Resolve a backend path such as `/leads/42` against the base URL.
    pub(crate) fn url(&self, path: &str) -> Result<Url, HttpError> {
        Ok(self.inner.base_url.join(path.trim_start_matches('/'))?)
    }

    /// GET with the session token. `Ok(None)` for an empty or `null` body.
    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>, ApiError> {
        let url = self.url(path)?;
        self.execute::<(), T>(Method::GET, url, Auth::Session, None)
            .await
    }

    /// GET with query parameters appended to `path`.
    pub(crate) async fn get_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Option<T>, ApiError> {
        let mut url = self.url(path)?;
        url.query_pairs_mut()
            .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
        self.execute::<(), T>(Method::GET, url, Auth::Session, None)
            .await
    }

    pub(crate) async fn post<B, T>(&self, path: &str, body: &B) -> Result<Option<T>, ApiError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let url = self.url(path)?;
        self.execute(Method::POST, url, Auth::Session, Some(body))
            .await
    }

    pub(crate) async fn put<B, T>(&self, path: &str, body: &B) -> Result<Option<T>, ApiError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let url = self.url(path)?;
        self.execute(Method::PUT, url, Auth::Session, Some(body))
            .await
    }

    /// PATCH without a body, as used by state-flip endpoints.
    pub(crate) async fn patch_empty(&self, path: &str) -> Result<(), ApiError> {
        let url = self.url(path)?;
        self.execute::<(), serde::de::IgnoredAny>(Method::PATCH, url, Auth::Session, None)
            .await
            .map(drop)
    }

    pub(crate) async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let url = self.url(path)?;
        self.execute::<(), serde::de::IgnoredAny>(Method::DELETE, url, Auth::Session, None)
            .await
            .map(drop)
    }

    /// Send a request authenticated some other way than the session token.
    pub(crate) async fn send_as<B, T>(
        &self,
        method: Method,
        path: &str,
        auth: Auth<'_>,
        body: Option<&B>,
    ) -> Result<Option<T>, ApiError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let url = self.url(path)?;
        self.execute(method, url, auth, body).await
    }

    #[instrument(skip(self, url, auth, body), fields(url = %url))]
    async fn execute<B, T>(
        &self,
        method: Method,
        url: Url,
        auth: Auth<'_>,
        body: Option<&B>,
    ) -> Result<Option<T>, ApiError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let request_id = Uuid::new_v4().to_string();
        let mut request = self
            .inner
            .http
            .request(method, url)
            .header(REQUEST_ID_HEADER, &request_id);

        match auth {
            Auth::Session => {
                let token = self.inner.session.token().ok_or(ApiError::Unauthorized)?;
                request = request.bearer_auth(token.expose_secret());
            }
            Auth::Token(token) => request = request.bearer_auth(token.expose_secret()),
            Auth::Anonymous => {}
        }

        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        tracing::debug!(status = status.as_u16(), request_id = %request_id, "Backend responded");

        if status.is_success() {
            let bytes = response.bytes().await?;
            return decode_body(&bytes);
        }

        Err(parse_error(response).await)
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}

/// Empty and `null` bodies decode to `None`.
fn decode_body<T: DeserializeOwned>(bytes: &[u8]) -> Result<Option<T>, ApiError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice::<Option<T>>(bytes).map_err(|e| HttpError::from(e).into())
}

/// Map a non-2xx response onto `ApiError`.
async fn parse_error(response: reqwest::Response) -> ApiError {
    let status = response.status();
    if status.as_u16() == 401 {
        return ApiError::Unauthorized;
    }

    let text = response.text().await.unwrap_or_default();
    let message = error_message(&text).unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("Unknown error")
            .to_string()
    });

    ApiError::Status {
        status: status.as_u16(),
        message,
    }
}

/// The backend reports failures as `{"message": ...}` or `{"error": ...}`.
fn error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["message", "error"]
        .iter()
        .find_map(|key| value.get(key).and_then(serde_json::Value::as_str))
        .filter(|m| !m.is_empty())
        .map(str::to_string)
}
