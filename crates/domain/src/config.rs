//! Client configuration
//!
//! [`ClientConfig`] is deserialised from environment variables or JSON/TOML
//! files by the infrastructure loader. Every field has a default so partial
//! files are accepted.

use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::constants::{
    DEFAULT_API_PATH, DEFAULT_ENDPOINT, DEFAULT_LOG_LEVEL, DEFAULT_MAX_ATTEMPTS,
    DEFAULT_TIMEOUT_SECS, USER_AGENT,
};
use crate::{ParaError, Result};

/// Configuration for a Para client
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Server base URL (e.g., "https://paraio.com")
    pub endpoint: String,
    /// API path prefix prepended to every resource path
    pub api_path: String,
    /// Access key (app identifier, e.g. "app:myapp")
    pub access_key: Option<String>,
    /// Secret key used for request signing
    pub secret_key: Option<String>,
    /// Value of the `User-Agent` header
    pub user_agent: String,
    /// Transport timeout in seconds
    pub timeout_secs: u64,
    /// Total attempts per request (initial try + retries)
    pub max_attempts: usize,
    /// Default tracing filter directive
    pub log_level: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_path: DEFAULT_API_PATH.to_string(),
            access_key: None,
            secret_key: None,
            user_agent: USER_AGENT.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl ClientConfig {
    /// Create a configuration for the given credentials with default settings
    pub fn new(access_key: impl Into<String>, secret_key: Option<String>) -> Self {
        Self { access_key: Some(access_key.into()), secret_key, ..Self::default() }
    }

    /// Override the endpoint
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Override the API path
    #[must_use]
    pub fn with_api_path(mut self, api_path: impl Into<String>) -> Self {
        self.api_path = api_path.into();
        self
    }

    /// Endpoint without a trailing slash
    pub fn endpoint_base(&self) -> &str {
        self.endpoint.trim_end_matches('/')
    }

    /// API path that always starts and ends with `/`
    ///
    /// An empty path falls back to [`DEFAULT_API_PATH`].
    pub fn normalized_api_path(&self) -> String {
        let trimmed = self.api_path.trim().trim_matches('/');
        if self.api_path.trim().is_empty() {
            return DEFAULT_API_PATH.to_string();
        }
        if trimmed.is_empty() {
            return "/".to_string();
        }
        format!("/{trimmed}/")
    }

    /// Validate settings that must hold before a client can be built
    ///
    /// A missing access key is deliberately not checked here; it is reported
    /// when a request is authenticated.
    ///
    /// # Errors
    /// Returns `ParaError::Config` if the endpoint is not an absolute
    /// http(s) URL or `max_attempts` is zero.
    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(self.endpoint_base())
            .map_err(|e| ParaError::Config(format!("Invalid endpoint '{}': {e}", self.endpoint)))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(ParaError::Config(format!(
                "Unsupported endpoint scheme '{}'",
                url.scheme()
            )));
        }
        if url.host_str().is_none() {
            return Err(ParaError::Config(format!("Endpoint '{}' has no host", self.endpoint)));
        }
        if self.max_attempts == 0 {
            return Err(ParaError::Config("max_attempts must be at least 1".to_string()));
        }
        Ok(())
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("endpoint", &self.endpoint)
            .field("api_path", &self.api_path)
            .field("access_key", &self.access_key)
            .field("secret_key", &self.secret_key.as_ref().map(|_| "<redacted>"))
            .field("user_agent", &self.user_agent)
            .field("timeout_secs", &self.timeout_secs)
            .field("max_attempts", &self.max_attempts)
            .field("log_level", &self.log_level)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.endpoint, "https://paraio.com");
        assert_eq!(config.normalized_api_path(), "/v1/");
        assert_eq!(config.max_attempts, 1);
        assert!(config.user_agent.starts_with("Para client for Rust/"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_api_path_normalization() {
        let config = ClientConfig::default().with_api_path("v2");
        assert_eq!(config.normalized_api_path(), "/v2/");

        let config = ClientConfig::default().with_api_path("/api/v1");
        assert_eq!(config.normalized_api_path(), "/api/v1/");

        let config = ClientConfig::default().with_api_path("");
        assert_eq!(config.normalized_api_path(), "/v1/");

        let config = ClientConfig::default().with_api_path("/");
        assert_eq!(config.normalized_api_path(), "/");
    }

    #[test]
    fn test_validate_rejects_bad_endpoint() {
        let config = ClientConfig::default().with_endpoint("not a url");
        assert!(matches!(config.validate(), Err(ParaError::Config(_))));

        let config = ClientConfig::default().with_endpoint("ftp://example.com");
        assert!(matches!(config.validate(), Err(ParaError::Config(_))));

        let config = ClientConfig { max_attempts: 0, ..ClientConfig::default() };
        assert!(matches!(config.validate(), Err(ParaError::Config(_))));
    }

    #[test]
    fn test_partial_deserialization_and_redacted_debug() {
        let config: ClientConfig =
            serde_json::from_str(r#"{"access_key":"app:demo","secret_key":"s3cr3t"}"#).unwrap();
        assert_eq!(config.access_key.as_deref(), Some("app:demo"));
        assert_eq!(config.endpoint, "https://paraio.com");

        let debug = format!("{config:?}");
        assert!(!debug.contains("s3cr3t"));
        assert!(debug.contains("<redacted>"));
    }
}
