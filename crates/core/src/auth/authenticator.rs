//! Authentication strategy selection
//!
//! Rules are evaluated in order and the first match wins:
//!
//! 1. no access key: configuration error, nothing is sent
//! 2. no secret key and no session token: `Anonymous <accessKey>`
//! 3. session token: `Bearer <token>` (after the caller's refresh check)
//! 4. secret key: SigV4 signature

use chrono::{DateTime, Utc};
use para_domain::constants::{ANONYMOUS_SCHEME, BEARER_SCHEME, JWT_PATH};
use para_domain::{Credentials, ParaError, Result};

use super::signer::RequestSigner;
use crate::transport_ports::{HttpMethod, HttpRequest};

/// How a request is authenticated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStrategy {
    Anonymous,
    Bearer,
    Signed,
}

/// Applies one of the three authentication strategies to a request
#[derive(Debug, Clone, Default)]
pub struct RequestAuthenticator {
    signer: RequestSigner,
}

impl RequestAuthenticator {
    pub fn new(signer: RequestSigner) -> Self {
        Self { signer }
    }

    /// Pick the strategy for the current credentials
    ///
    /// # Errors
    /// Returns `ParaError::Config` when no access key is configured.
    pub fn select_strategy(&self, credentials: &Credentials) -> Result<AuthStrategy> {
        if !credentials.has_access_key() {
            return Err(ParaError::Config("Security credentials are invalid: missing access key".into()));
        }
        if credentials.has_session_token() {
            return Ok(AuthStrategy::Bearer);
        }
        if credentials.has_secret_key() {
            return Ok(AuthStrategy::Signed);
        }
        Ok(AuthStrategy::Anonymous)
    }

    /// Whether a bearer request must first run the session refresh check
    ///
    /// A GET on the token endpoint is the refresh call itself and is exempt.
    pub fn requires_refresh_check(&self, method: HttpMethod, resource_path: &str) -> bool {
        !(method == HttpMethod::Get && resource_path.trim_matches('/') == JWT_PATH)
    }

    /// Attach credentials to `request` using `strategy`
    ///
    /// # Errors
    /// Returns `ParaError::Auth` when the credentials required by the
    /// strategy are missing or the request cannot be signed.
    pub fn apply(
        &self,
        strategy: AuthStrategy,
        request: &mut HttpRequest,
        credentials: &Credentials,
        now: DateTime<Utc>,
    ) -> Result<()> {
        match strategy {
            AuthStrategy::Anonymous => {
                request.set_header(
                    "Authorization",
                    format!("{ANONYMOUS_SCHEME} {}", credentials.access_key),
                );
                Ok(())
            }
            AuthStrategy::Bearer => {
                let token = credentials
                    .session_token
                    .as_deref()
                    .filter(|token| !token.is_empty())
                    .ok_or_else(|| ParaError::Auth("No session token to send".into()))?;
                request.set_header("Authorization", format!("{BEARER_SCHEME} {token}"));
                Ok(())
            }
            AuthStrategy::Signed => {
                let secret = credentials
                    .secret_key
                    .as_deref()
                    .filter(|secret| !secret.is_empty())
                    .ok_or_else(|| ParaError::Auth("No secret key to sign with".into()))?;
                self.signer.sign(request, &credentials.access_key, secret, now)
            }
        }
    }
}
