//! Wiring of a ready-to-use [`ParaClient`] on the reqwest transport

use std::sync::Arc;
use std::time::Duration;

use para_core::ParaClient;
use para_domain::{ClientConfig, Result};
use tracing::info;

use crate::config;
use crate::http::HttpClient;

/// Build a client for `config` backed by [`HttpClient`].
///
/// # Errors
/// Returns `ParaError::Config` when the configuration is invalid or the
/// HTTP client cannot be constructed. A missing access key is reported
/// later, by the first request.
pub fn connect(config: &ClientConfig) -> Result<ParaClient> {
    config.validate()?;

    let transport = HttpClient::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .max_attempts(config.max_attempts)
        .user_agent(config.user_agent.clone())
        .build()?;

    info!(
        endpoint = %config.endpoint_base(),
        api_path = %config.normalized_api_path(),
        signed = config.secret_key.is_some(),
        "Para client ready"
    );

    Ok(ParaClient::new(config, Arc::new(transport)))
}

/// Load the configuration (environment, then file) and [`connect`].
///
/// # Errors
/// Propagates loader and [`connect`] errors.
pub fn connect_from_env() -> Result<ParaClient> {
    let config = config::load()?;
    connect(&config)
}

#[cfg(test)]
mod tests {
    use para_domain::ParaError;

    use super::*;

    #[test]
    fn connect_uses_normalized_settings() {
        let config = ClientConfig::new("app:demo", None)
            .with_endpoint("http://localhost:8080/")
            .with_api_path("v1");

        let client = connect(&config).expect("client");
        assert_eq!(client.endpoint(), "http://localhost:8080");
        assert_eq!(client.api_path(), "/v1/");
        assert_eq!(client.app_id(), "demo");
    }

    #[test]
    fn connect_rejects_invalid_config() {
        let config = ClientConfig::new("app:demo", None).with_endpoint("localhost");
        assert!(matches!(connect(&config), Err(ParaError::Config(_))));
    }
}
