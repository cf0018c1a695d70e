//! Conversions from external infrastructure errors into domain errors.

use para_domain::ParaError;
use reqwest::Error as HttpError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub ParaError);

impl From<InfraError> for ParaError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<ParaError> for InfraError {
    fn from(value: ParaError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoParaError {
    fn into_para(self) -> ParaError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → ParaError */
/* -------------------------------------------------------------------------- */

impl IntoParaError for HttpError {
    fn into_para(self) -> ParaError {
        if self.is_builder() {
            return ParaError::Config(format!("Invalid HTTP request: {self}"));
        }

        if self.is_timeout() {
            return ParaError::Transport("HTTP request timed out".into());
        }

        #[cfg(not(target_arch = "wasm32"))]
        if self.is_connect() {
            return ParaError::Transport(format!("HTTP connection failure: {self}"));
        }

        if self.is_body() || self.is_decode() {
            return ParaError::Transport(format!("Failed to read HTTP response body: {self}"));
        }

        if let Some(status) = self.status() {
            return ParaError::Remote {
                status: status.as_u16(),
                code: None,
                message: status.canonical_reason().unwrap_or("unknown status").to_string(),
            };
        }

        ParaError::Transport(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_para())
    }
}

/* -------------------------------------------------------------------------- */
/* Config file parsing errors → ParaError */
/* -------------------------------------------------------------------------- */

impl From<toml::de::Error> for InfraError {
    fn from(value: toml::de::Error) -> Self {
        InfraError(ParaError::Config(format!("Invalid TOML format: {value}")))
    }
}

impl From<serde_json::Error> for InfraError {
    fn from(value: serde_json::Error) -> Self {
        InfraError(ParaError::Config(format!("Invalid JSON format: {value}")))
    }
}

impl From<std::io::Error> for InfraError {
    fn from(value: std::io::Error) -> Self {
        InfraError(ParaError::Config(format!("Failed to read config file: {value}")))
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
