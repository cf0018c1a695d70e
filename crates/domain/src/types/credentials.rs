//! Credential store
//!
//! Plain data: the long-lived access/secret key pair and the short-lived
//! session token with its expiry window. All token mutation goes through
//! the session token manager in `para-core`.

use std::fmt;

use chrono::{DateTime, Utc};

use crate::constants::APP_ID_PREFIX;

/// Keys and session token used to authenticate requests
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub access_key: String,
    pub secret_key: Option<String>,
    pub session_token: Option<String>,
    pub token_expires_at: Option<DateTime<Utc>>,
    pub token_next_refresh_at: Option<DateTime<Utc>>,
}

impl Credentials {
    pub fn new(access_key: impl Into<String>, secret_key: Option<String>) -> Self {
        Self { access_key: access_key.into(), secret_key, ..Self::default() }
    }

    /// Credentials that can only authenticate anonymously
    pub fn anonymous(access_key: impl Into<String>) -> Self {
        Self::new(access_key, None)
    }

    pub fn has_access_key(&self) -> bool {
        !self.access_key.trim().is_empty()
    }

    pub fn has_secret_key(&self) -> bool {
        self.secret_key.as_deref().is_some_and(|secret| !secret.is_empty())
    }

    pub fn has_session_token(&self) -> bool {
        self.session_token.as_deref().is_some_and(|token| !token.is_empty())
    }

    /// Application id derived from the access key (`app:demo` → `demo`)
    pub fn app_id(&self) -> &str {
        self.access_key.strip_prefix(APP_ID_PREFIX).unwrap_or(&self.access_key)
    }

    /// Replace the key pair; session token fields are left untouched
    pub fn rotate_keys(&mut self, access_key: impl Into<String>, secret_key: Option<String>) {
        self.access_key = access_key.into();
        self.secret_key = secret_key;
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key", &self.access_key)
            .field("secret_key", &self.secret_key.as_ref().map(|_| "<redacted>"))
            .field("session_token", &self.session_token.as_ref().map(|_| "<redacted>"))
            .field("token_expires_at", &self.token_expires_at)
            .field("token_next_refresh_at", &self.token_next_refresh_at)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_presence() {
        let creds = Credentials::new("app:demo", Some("s3cr3t".into()));
        assert!(creds.has_access_key());
        assert!(creds.has_secret_key());
        assert!(!creds.has_session_token());
        assert_eq!(creds.app_id(), "demo");

        let blank = Credentials::new("  ", Some(String::new()));
        assert!(!blank.has_access_key());
        assert!(!blank.has_secret_key());
    }

    #[test]
    fn test_rotate_keys_keeps_session() {
        let mut creds = Credentials::new("app:demo", Some("old".into()));
        creds.session_token = Some("jwt".into());
        creds.rotate_keys("app:demo", Some("new".into()));
        assert_eq!(creds.secret_key.as_deref(), Some("new"));
        assert_eq!(creds.session_token.as_deref(), Some("jwt"));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let mut creds = Credentials::new("app:demo", Some("s3cr3t".into()));
        creds.session_token = Some("eyJhbGciOi".into());
        let debug = format!("{creds:?}");
        assert!(debug.contains("app:demo"));
        assert!(!debug.contains("s3cr3t"));
        assert!(!debug.contains("eyJhbGciOi"));
    }
}
