//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `API_BASE_URL` - ERP backend base URL (default: `http://localhost:5000`)
//! - `AJAXTREON_TOKEN_STORE` - Path of the durable session file
//!   (default: `$HOME/.config/ajaxtreon/session.json`)
//! - `AJAXTREON_HTTP_TIMEOUT_SECS` - Per-request timeout (default: 30)
//!
//! ## Optional (Firebase - enables the identity-provider fallback)
//! - `FIREBASE_API_KEY` - Web API key of the Firebase project
//! - `FIREBASE_PROJECT_ID` - Firebase project ID (Firestore `users` collection)

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const DEFAULT_API_BASE_URL: &str = "http://localhost:5000";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
const SESSION_FILE_NAME: &str = "session.json";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// ERP client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend base URL, always ending in `/`
    pub api_base_url: Url,
    /// Where the bearer token is persisted between runs
    pub token_store_path: PathBuf,
    /// Timeout applied to every HTTP request
    pub http_timeout: Duration,
    /// Firebase identity provider (optional)
    pub firebase: Option<FirebaseConfig>,
}

/// Firebase identity provider configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct FirebaseConfig {
    /// Web API key
    pub api_key: SecretString,
    /// Project ID used for Firestore lookups
    pub project_id: String,
}

impl std::fmt::Debug for FirebaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FirebaseConfig")
            .field("api_key", &"[REDACTED]")
            .field("project_id", &self.project_id)
            .finish()
    }
}

impl ClientConfig {
    /// Build a configuration for `base_url` with every other setting at its default.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if `base_url` is not an absolute URL.
    pub fn new(base_url: &str, token_store_path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        Ok(Self {
            api_base_url: parse_base_url("API_BASE_URL", base_url)?,
            token_store_path: token_store_path.into(),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            firebase: None,
        })
    }

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but malformed, or if the
    /// Firebase variables are only partially set.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base_url = lookup("API_BASE_URL").unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
        let api_base_url = parse_base_url("API_BASE_URL", &base_url)?;

        let token_store_path = lookup("AJAXTREON_TOKEN_STORE").map_or_else(
            || default_store_path(lookup("HOME")),
            PathBuf::from,
        );

        let http_timeout = match lookup("AJAXTREON_HTTP_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .ok_or_else(|| {
                    ConfigError::InvalidEnvVar(
                        "AJAXTREON_HTTP_TIMEOUT_SECS".to_string(),
                        format!("expected a positive number of seconds, got {raw:?}"),
                    )
                })?,
            None => Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        };

        let firebase = FirebaseConfig::from_lookup(&lookup)?;

        Ok(Self {
            api_base_url,
            token_store_path,
            http_timeout,
            firebase,
        })
    }

    /// Returns a reference to the Firebase configuration, if available.
    ///
    /// Returns `None` if the Firebase variables were not set, which disables
    /// the identity-provider fallback during session resolution.
    #[must_use]
    pub const fn firebase(&self) -> Option<&FirebaseConfig> {
        self.firebase.as_ref()
    }
}

impl FirebaseConfig {
    /// Both variables must be set together.
    fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Result<Option<Self>, ConfigError> {
        match (lookup("FIREBASE_API_KEY"), lookup("FIREBASE_PROJECT_ID")) {
            (Some(api_key), Some(project_id)) => Ok(Some(Self {
                api_key: SecretString::from(api_key),
                project_id,
            })),
            (None, None) => Ok(None),
            (Some(_), None) => Err(ConfigError::MissingEnvVar(
                "FIREBASE_PROJECT_ID".to_string(),
            )),
            (None, Some(_)) => Err(ConfigError::MissingEnvVar("FIREBASE_API_KEY".to_string())),
        }
    }
}

/// Parse a base URL and make sure it ends in `/` so relative joins keep its path.
fn parse_base_url(var: &str, raw: &str) -> Result<Url, ConfigError> {
    let mut url =
        Url::parse(raw).map_err(|e| ConfigError::InvalidEnvVar(var.to_string(), e.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidEnvVar(
            var.to_string(),
            "URL cannot be used as a base".to_string(),
        ));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn default_store_path(home: Option<String>) -> PathBuf {
    home.map_or_else(
        || PathBuf::from(".ajaxtreon-session.json"),
        |home| {
            PathBuf::from(home)
                .join(".config")
                .join("ajaxtreon")
                .join(SESSION_FILE_NAME)
        },
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::from_lookup(lookup_from(&[("HOME", "/home/ajax")])).unwrap();
        assert_eq!(config.api_base_url.as_str(), "http://localhost:5000/");
        assert_eq!(
            config.token_store_path,
            PathBuf::from("/home/ajax/.config/ajaxtreon/session.json")
        );
        assert_eq!(config.http_timeout, Duration::from_secs(30));
        assert!(config.firebase().is_none());
    }

    #[test]
    fn test_store_path_without_home() {
        let config = ClientConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(
            config.token_store_path,
            PathBuf::from(".ajaxtreon-session.json")
        );
    }

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let config = ClientConfig::from_lookup(lookup_from(&[(
            "API_BASE_URL",
            "https://erp.example.com/api",
        )]))
        .unwrap();
        assert_eq!(config.api_base_url.as_str(), "https://erp.example.com/api/");
    }

    #[test]
    fn test_invalid_base_url() {
        let result = ClientConfig::from_lookup(lookup_from(&[("API_BASE_URL", "not a url")]));
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar(var, _)) if var == "API_BASE_URL"));
    }

    #[test]
    fn test_invalid_timeout() {
        let result =
            ClientConfig::from_lookup(lookup_from(&[("AJAXTREON_HTTP_TIMEOUT_SECS", "0")]));
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar(_, _))));
    }

    #[test]
    fn test_firebase_all_or_nothing() {
        let partial = ClientConfig::from_lookup(lookup_from(&[("FIREBASE_API_KEY", "key")]));
        assert!(
            matches!(partial, Err(ConfigError::MissingEnvVar(var)) if var == "FIREBASE_PROJECT_ID")
        );

        let full = ClientConfig::from_lookup(lookup_from(&[
            ("FIREBASE_API_KEY", "key"),
            ("FIREBASE_PROJECT_ID", "ajaxtreon-erp"),
        ]))
        .unwrap();
        assert_eq!(full.firebase().unwrap().project_id, "ajaxtreon-erp");
    }

    #[test]
    fn test_firebase_debug_redacts_key() {
        let config = FirebaseConfig {
            api_key: SecretString::from("AIza-very-secret".to_string()),
            project_id: "p".to_string(),
        };
        let debug = format!("{config:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("very-secret"));
    }
}
