//! Session token lifecycle
//!
//! The [`SessionTokenManager`] is the only code that mutates the token
//! fields of [`Credentials`]. It moves between three states:
//!
//! - `NoToken`: nothing stored
//! - `Valid`: a token is stored and has not expired
//! - `Expired`: a token is stored but its `exp` has passed
//!
//! Refresh is lazy. Before a bearer request the invoker calls
//! [`SessionTokenManager::refresh_if_needed`], which may perform one extra
//! round trip through a [`TokenRefresher`].

use std::sync::Arc;

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use para_domain::{Credentials, Entity, Result};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::response::Payload;

/// Epoch values at or above this are read as milliseconds
const MILLIS_THRESHOLD: i64 = 100_000_000_000;

/// Lifecycle state of the session token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenState {
    NoToken,
    Valid,
    Expired,
}

/// Performs the token refresh round trip
#[async_trait]
pub trait TokenRefresher: Send + Sync {
    /// Call the refresh endpoint with the current token
    async fn refresh(&self, credentials: &Credentials) -> Result<Payload>;
}

/// Owns all session token state transitions
#[derive(Clone)]
pub struct SessionTokenManager {
    clock: Arc<dyn Clock>,
}

impl SessionTokenManager {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn state(&self, credentials: &Credentials) -> TokenState {
        if !credentials.has_session_token() {
            return TokenState::NoToken;
        }
        match credentials.token_expires_at {
            Some(expires) if self.now() >= expires => TokenState::Expired,
            _ => TokenState::Valid,
        }
    }

    /// Store a raw token and read its expiry window from the payload
    ///
    /// Claims are decoded without verifying the signature. A malformed
    /// token is still stored, with both timestamps unset.
    pub fn set_token(&self, credentials: &mut Credentials, raw: &str) {
        let claims = decode_claims(raw);
        if claims.is_none() {
            debug!("Session token payload could not be decoded");
        }
        let claims = claims.unwrap_or_default();
        credentials.session_token = Some(raw.to_string());
        credentials.token_expires_at = claims.get("exp").and_then(epoch_to_datetime);
        credentials.token_next_refresh_at = claims.get("refresh").and_then(epoch_to_datetime);
    }

    /// Drop the token and its timestamps
    pub fn clear(&self, credentials: &mut Credentials) {
        credentials.session_token = None;
        credentials.token_expires_at = None;
        credentials.token_next_refresh_at = None;
    }

    /// Whether the refresh window is open
    ///
    /// True when a token is held, it has not expired, and either the refresh
    /// time has passed or the window is inverted (`refresh > exp`). Without
    /// both timestamps no refresh is attempted.
    pub fn needs_refresh(&self, credentials: &Credentials) -> bool {
        if !credentials.has_session_token() {
            return false;
        }
        let (Some(expires), Some(refresh)) =
            (credentials.token_expires_at, credentials.token_next_refresh_at)
        else {
            return false;
        };
        let now = self.now();
        now < expires && (now >= refresh || refresh > expires)
    }

    /// Refresh the session when the window is open
    ///
    /// Returns `true` only when a new token was stored. Any failed attempt
    /// clears the session; it is not retried.
    pub async fn refresh_if_needed(
        &self,
        credentials: &mut Credentials,
        refresher: &dyn TokenRefresher,
    ) -> bool {
        if !self.needs_refresh(credentials) {
            return false;
        }

        match refresher.refresh(credentials).await {
            Ok(Payload::Json(value)) => {
                if self.apply_session(credentials, &value).is_some() {
                    info!("Session token refreshed");
                    true
                } else {
                    warn!("Token refresh returned an unexpected response; session cleared");
                    false
                }
            }
            Ok(_) => {
                warn!("Token refresh returned no session; session cleared");
                self.clear(credentials);
                false
            }
            Err(e) => {
                warn!(error = %e, "Token refresh failed; session cleared");
                self.clear(credentials);
                false
            }
        }
    }

    /// Store the session carried by a sign-in or refresh response
    ///
    /// A well-formed response is `{user: {..}, jwt: {access_token, expires?,
    /// refresh?}}`. On success all three token fields are replaced together
    /// and the user is returned. Any other shape clears the session.
    pub fn apply_session(&self, credentials: &mut Credentials, response: &Value) -> Option<Entity> {
        let Some((user, jwt, token)) = parse_session(response) else {
            self.clear(credentials);
            return None;
        };

        let claims = decode_claims(token).unwrap_or_default();
        let expires = jwt
            .get("expires")
            .and_then(epoch_to_datetime)
            .or_else(|| claims.get("exp").and_then(epoch_to_datetime));
        let refresh = jwt
            .get("refresh")
            .and_then(epoch_to_datetime)
            .or_else(|| claims.get("refresh").and_then(epoch_to_datetime));

        credentials.session_token = Some(token.to_string());
        credentials.token_expires_at = expires;
        credentials.token_next_refresh_at = refresh;

        Some(Entity::from_fields(user.clone()))
    }
}

fn parse_session(response: &Value) -> Option<(&Map<String, Value>, &Map<String, Value>, &str)> {
    let user = response.get("user")?.as_object()?;
    let jwt = response.get("jwt")?.as_object()?;
    let token = jwt.get("access_token")?.as_str().filter(|t| !t.is_empty())?;
    Some((user, jwt, token))
}

/// Decode the JSON payload segment of a JWT
pub fn decode_claims(token: &str) -> Option<Map<String, Value>> {
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    match serde_json::from_slice(&bytes).ok()? {
        Value::Object(claims) => Some(claims),
        _ => None,
    }
}

/// Interpret an epoch number in seconds or milliseconds
pub fn epoch_to_datetime(value: &Value) -> Option<DateTime<Utc>> {
    let epoch = value
        .as_i64()
        .or_else(|| value.as_f64().map(|f| f as i64))
        .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))?;
    if epoch >= MILLIS_THRESHOLD {
        DateTime::from_timestamp_millis(epoch)
    } else {
        DateTime::from_timestamp(epoch, 0)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::{Duration, TimeZone};
    use para_domain::ParaError;
    use serde_json::json;

    use super::*;
    use crate::clock::MockClock;

    fn token(claims: Value) -> String {
        format!("e30.{}.sig", URL_SAFE_NO_PAD.encode(claims.to_string()))
    }

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    struct StubRefresher {
        calls: AtomicUsize,
        response: Result<Payload>,
    }

    impl StubRefresher {
        fn new(response: Result<Payload>) -> Self {
            Self { calls: AtomicUsize::new(0), response }
        }
    }

    #[async_trait]
    impl TokenRefresher for StubRefresher {
        async fn refresh(&self, _credentials: &Credentials) -> Result<Payload> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.response.clone()
        }
    }

    fn session_with_window(clock: &MockClock) -> (SessionTokenManager, Credentials) {
        let manager = SessionTokenManager::new(Arc::new(clock.clone()));
        let mut creds = Credentials::new("app:demo", Some("s3cr3t".into()));
        let now = start().timestamp();
        manager.set_token(&mut creds, &token(json!({"exp": now + 3600, "refresh": now + 600})));
        (manager, creds)
    }

    #[test]
    fn test_set_token_decodes_window() {
        let clock = MockClock::at(start());
        let (manager, creds) = session_with_window(&clock);
        assert_eq!(manager.state(&creds), TokenState::Valid);
        assert_eq!(creds.token_expires_at, Some(start() + Duration::hours(1)));
        assert_eq!(creds.token_next_refresh_at, Some(start() + Duration::minutes(10)));
    }

    #[test]
    fn test_malformed_token_is_stored_without_window() {
        let manager = SessionTokenManager::new(Arc::new(MockClock::at(start())));
        let mut creds = Credentials::anonymous("app:demo");
        manager.set_token(&mut creds, "not-a-jwt");
        assert_eq!(creds.session_token.as_deref(), Some("not-a-jwt"));
        assert!(creds.token_expires_at.is_none());
        assert_eq!(manager.state(&creds), TokenState::Valid);
        assert!(!manager.needs_refresh(&creds));
    }

    #[test]
    fn test_expired_state_and_clear() {
        let clock = MockClock::at(start());
        let (manager, mut creds) = session_with_window(&clock);
        clock.advance(Duration::hours(2));
        assert_eq!(manager.state(&creds), TokenState::Expired);
        assert!(!manager.needs_refresh(&creds));

        manager.clear(&mut creds);
        assert_eq!(manager.state(&creds), TokenState::NoToken);
        assert!(creds.token_next_refresh_at.is_none());
    }

    #[test]
    fn test_inverted_window_permits_refresh() {
        let manager = SessionTokenManager::new(Arc::new(MockClock::at(start())));
        let mut creds = Credentials::anonymous("app:demo");
        let now = start().timestamp();
        manager.set_token(&mut creds, &token(json!({"exp": now + 60, "refresh": now + 600})));
        assert!(manager.needs_refresh(&creds));
    }

    #[test]
    fn test_epoch_units() {
        let seconds = epoch_to_datetime(&json!(1_700_000_000)).unwrap();
        let millis = epoch_to_datetime(&json!(1_700_000_000_000_i64)).unwrap();
        assert_eq!(seconds, millis);
        assert_eq!(epoch_to_datetime(&json!("1700000000")), Some(seconds));
        assert!(epoch_to_datetime(&json!(null)).is_none());
    }

    #[tokio::test]
    async fn test_no_refresh_before_window_opens() {
        let clock = MockClock::at(start());
        let (manager, mut creds) = session_with_window(&clock);
        let refresher = StubRefresher::new(Ok(Payload::Empty));

        assert!(!manager.refresh_if_needed(&mut creds, &refresher).await);
        assert_eq!(refresher.calls.load(Ordering::SeqCst), 0);
        assert!(creds.has_session_token());
    }

    #[tokio::test]
    async fn test_one_refresh_inside_window() {
        let clock = MockClock::at(start());
        let (manager, mut creds) = session_with_window(&clock);
        clock.advance(Duration::minutes(15));

        let later = start().timestamp() + 7200;
        let refresher = StubRefresher::new(Ok(Payload::Json(json!({
            "user": {"id": "u1", "type": "user"},
            "jwt": {"access_token": "new-token", "expires": later * 1000, "refresh": (later - 3600) * 1000}
        }))));

        assert!(manager.refresh_if_needed(&mut creds, &refresher).await);
        assert_eq!(refresher.calls.load(Ordering::SeqCst), 1);
        assert_eq!(creds.session_token.as_deref(), Some("new-token"));
        assert_eq!(creds.token_expires_at, Some(start() + Duration::hours(2)));

        // new window not open yet
        assert!(!manager.refresh_if_needed(&mut creds, &refresher).await);
        assert_eq!(refresher.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_malformed_refresh_response_clears_session() {
        let clock = MockClock::at(start());
        let (manager, mut creds) = session_with_window(&clock);
        clock.advance(Duration::minutes(15));

        let refresher = StubRefresher::new(Ok(Payload::Json(json!({"ok": true}))));
        assert!(!manager.refresh_if_needed(&mut creds, &refresher).await);
        assert_eq!(manager.state(&creds), TokenState::NoToken);
        assert!(creds.token_expires_at.is_none());
        assert!(creds.has_secret_key());
    }

    #[tokio::test]
    async fn test_failed_refresh_clears_session() {
        let clock = MockClock::at(start());
        let (manager, mut creds) = session_with_window(&clock);
        clock.advance(Duration::minutes(15));

        let refresher = StubRefresher::new(Err(ParaError::Remote {
            status: 401,
            code: Some(401),
            message: "expired".into(),
        }));
        assert!(!manager.refresh_if_needed(&mut creds, &refresher).await);
        assert_eq!(manager.state(&creds), TokenState::NoToken);
    }

    #[test]
    fn test_apply_session_falls_back_to_claims() {
        let manager = SessionTokenManager::new(Arc::new(MockClock::at(start())));
        let mut creds = Credentials::anonymous("app:demo");
        let now = start().timestamp();
        let raw = token(json!({"exp": now + 100, "refresh": now + 50}));

        let user = manager
            .apply_session(&mut creds, &json!({"user": {"id": "u1"}, "jwt": {"access_token": raw}}))
            .unwrap();
        assert_eq!(user.id(), Some("u1"));
        assert_eq!(creds.token_expires_at, Some(start() + Duration::seconds(100)));
        assert_eq!(creds.token_next_refresh_at, Some(start() + Duration::seconds(50)));
    }
}
