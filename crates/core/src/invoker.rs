//! Request orchestration
//!
//! The [`Invoker`] builds the full resource path, authenticates the request
//! (refreshing the session first when its window is open), dispatches it
//! through the transport port and classifies the response. Every failure is
//! logged here before it is returned.

use std::sync::Arc;

use async_trait::async_trait;
use para_domain::constants::JWT_PATH;
use para_domain::{ClientConfig, Credentials, Entity, ParaError, QueryParams, Result};
use serde_json::Value;
use tracing::{debug, error, instrument, warn};

use crate::auth::{AuthStrategy, RequestAuthenticator, SessionTokenManager, TokenRefresher};
use crate::clock::Clock;
use crate::response::{decode_response, Payload};
use crate::transport_ports::{HttpMethod, HttpRequest, HttpTransport};

/// Fixed request settings derived from [`ClientConfig`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvokerSettings {
    pub endpoint: String,
    pub api_path: String,
    pub user_agent: String,
}

impl InvokerSettings {
    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            endpoint: config.endpoint_base().to_string(),
            api_path: config.normalized_api_path(),
            user_agent: config.user_agent.clone(),
        }
    }

    /// Resource path with the API prefix, e.g. `dog/d1` -> `/v1/dog/d1`
    ///
    /// The prefix is always added, even when the path already starts with it.
    pub fn full_path(&self, resource_path: &str) -> String {
        format!("{}{}", self.api_path, resource_path.trim_start_matches('/'))
    }

    /// Unauthenticated request carrying the fixed headers
    ///
    /// # Errors
    /// Returns `ParaError::InvalidInput` if the body cannot be serialised.
    pub fn build_request(
        &self,
        method: HttpMethod,
        resource_path: &str,
        headers: &[(String, String)],
        query: QueryParams,
        body: Option<&Value>,
    ) -> Result<HttpRequest> {
        let path = self.full_path(resource_path);
        let mut request = HttpRequest::new(method, format!("{}{path}", self.endpoint), path);
        request.set_header("Content-Type", "application/json");
        request.set_header("User-Agent", self.user_agent.clone());
        for (name, value) in headers {
            request.set_header(name.clone(), value.clone());
        }
        request.query = query;
        request.body = body
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| ParaError::InvalidInput(format!("Request body is not serialisable: {e}")))?;
        Ok(request)
    }
}

/// Orchestrates authenticated calls against one Para endpoint
pub struct Invoker {
    transport: Arc<dyn HttpTransport>,
    settings: InvokerSettings,
    authenticator: RequestAuthenticator,
    session: SessionTokenManager,
    credentials: Credentials,
}

impl Invoker {
    pub fn new(
        settings: InvokerSettings,
        credentials: Credentials,
        transport: Arc<dyn HttpTransport>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            transport,
            settings,
            authenticator: RequestAuthenticator::default(),
            session: SessionTokenManager::new(clock),
            credentials,
        }
    }

    pub fn settings(&self) -> &InvokerSettings {
        &self.settings
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn credentials_mut(&mut self) -> &mut Credentials {
        &mut self.credentials
    }

    pub fn session(&self) -> &SessionTokenManager {
        &self.session
    }

    /// Store the session carried by a sign-in response
    pub fn apply_session(&mut self, response: &Value) -> Option<Entity> {
        self.session.apply_session(&mut self.credentials, response)
    }

    pub fn set_session_token(&mut self, token: &str) {
        self.session.set_token(&mut self.credentials, token);
    }

    pub fn clear_session(&mut self) {
        self.session.clear(&mut self.credentials);
    }

    /// Run the refresh check now
    ///
    /// Returns `true` when a new token was stored.
    pub async fn refresh_session(&mut self) -> bool {
        let refresher = SessionRefresher {
            transport: self.transport.as_ref(),
            settings: &self.settings,
            authenticator: &self.authenticator,
            session: &self.session,
        };
        self.session.refresh_if_needed(&mut self.credentials, &refresher).await
    }

    /// Send one authenticated request and decode the response
    ///
    /// # Errors
    /// - `ParaError::Config` when no access key is configured (nothing is sent)
    /// - `ParaError::Auth` when the request cannot be signed
    /// - `ParaError::Transport` for network failures
    /// - `ParaError::Remote` for any status other than 200, 201 or 304
    #[instrument(skip_all, fields(method = %method, path = %resource_path))]
    pub async fn invoke(
        &mut self,
        method: HttpMethod,
        resource_path: &str,
        headers: &[(String, String)],
        query: QueryParams,
        body: Option<&Value>,
    ) -> Result<Payload> {
        let mut strategy = self
            .authenticator
            .select_strategy(&self.credentials)
            .inspect_err(|e| error!(error = %e, "Request not sent"))?;

        if strategy == AuthStrategy::Bearer
            && self.authenticator.requires_refresh_check(method, resource_path)
        {
            self.refresh_session().await;
            strategy = self.authenticator.select_strategy(&self.credentials)?;
        }

        let mut request =
            self.settings.build_request(method, resource_path, headers, query, body)?;
        self.authenticator
            .apply(strategy, &mut request, &self.credentials, self.session.now())
            .inspect_err(|e| warn!(error = %e, "Request could not be authenticated"))?;

        debug!(?strategy, "Dispatching request");
        dispatch(self.transport.as_ref(), request).await
    }
}

async fn dispatch(transport: &dyn HttpTransport, request: HttpRequest) -> Result<Payload> {
    let response = transport
        .send(request)
        .await
        .inspect_err(|e| error!(error = %e, "Transport failure"))?;
    let status = response.status;

    match decode_response(response) {
        Ok(payload) => {
            debug!(status, "Request completed");
            Ok(payload)
        }
        Err(ParaError::Remote { status, code, message }) => {
            warn!(status, code, message = %message, "Remote error");
            Err(ParaError::Remote { status, code, message })
        }
        Err(e) => Err(e),
    }
}

/// Sends the token refresh call with the current bearer token
struct SessionRefresher<'a> {
    transport: &'a dyn HttpTransport,
    settings: &'a InvokerSettings,
    authenticator: &'a RequestAuthenticator,
    session: &'a SessionTokenManager,
}

#[async_trait]
impl TokenRefresher for SessionRefresher<'_> {
    async fn refresh(&self, credentials: &Credentials) -> Result<Payload> {
        let mut request =
            self.settings.build_request(HttpMethod::Get, JWT_PATH, &[], QueryParams::new(), None)?;
        self.authenticator.apply(
            AuthStrategy::Bearer,
            &mut request,
            credentials,
            self.session.now(),
        )?;
        debug!("Refreshing session token");
        dispatch(self.transport, request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(api_path: &str) -> InvokerSettings {
        InvokerSettings::from_config(
            &ClientConfig::new("app:demo", None)
                .with_endpoint("https://paraio.com/")
                .with_api_path(api_path),
        )
    }

    #[test]
    fn test_full_path() {
        let settings = settings("/v1/");
        assert_eq!(settings.full_path("dog/d1"), "/v1/dog/d1");
        assert_eq!(settings.full_path("/dog"), "/v1/dog");
        assert_eq!(settings.full_path("/v1/d1"), "/v1/v1/d1");
        assert_eq!(settings.full_path("v1/d1"), "/v1/v1/d1");
        assert_eq!(settings.full_path(""), "/v1/");
    }

    #[test]
    fn test_build_request_sets_fixed_headers() {
        let settings = settings("v1");
        let body = serde_json::json!({"type": "dog"});
        let request = settings
            .build_request(
                HttpMethod::Post,
                "dog",
                &[("X-Custom".to_string(), "1".to_string())],
                QueryParams::new(),
                Some(&body),
            )
            .unwrap();

        assert_eq!(request.url, "https://paraio.com/v1/dog");
        assert_eq!(request.path, "/v1/dog");
        assert_eq!(request.header("content-type"), Some("application/json"));
        assert!(request.header("user-agent").unwrap().starts_with("Para client for Rust/"));
        assert_eq!(request.header("X-Custom"), Some("1"));
        assert_eq!(request.body.as_deref(), Some(r#"{"type":"dog"}"#));
    }
}
