//! Configuration loader
//!
//! Loads client configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If no access key is set there, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `PARA_ACCESS_KEY`: Access key (required, e.g. `app:myapp`)
//! - `PARA_SECRET_KEY`: Secret key used for request signing
//! - `PARA_ENDPOINT`: Server base URL
//! - `PARA_API_PATH`: API path prefix
//! - `PARA_USER_AGENT`: Value of the `User-Agent` header
//! - `PARA_TIMEOUT_SECS`: Transport timeout in seconds
//! - `PARA_MAX_ATTEMPTS`: Total attempts per request
//! - `PARA_LOG_LEVEL`: Default tracing filter
//!
//! A `.env` file in the working directory is read first when present.
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./para.json` or `./para.toml` (current working directory)
//! 2. `./config.json` or `./config.toml` (current working directory)
//! 3. The same names in the parent directory

use std::path::{Path, PathBuf};
use std::str::FromStr;

use para_domain::{ClientConfig, ParaError, Result};

use crate::errors::InfraError;

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If the access key is
/// missing there, falls back to loading from a config file.
///
/// # Errors
/// Returns `ParaError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - The loaded settings fail validation
pub fn load() -> Result<ClientConfig> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// Only `PARA_ACCESS_KEY` is required; every other setting keeps its
/// default when unset.
///
/// # Errors
/// Returns `ParaError::Config` if the access key is missing or a numeric
/// variable cannot be parsed.
pub fn load_from_env() -> Result<ClientConfig> {
    dotenvy::dotenv().ok();

    let mut config = ClientConfig {
        access_key: Some(env_var("PARA_ACCESS_KEY")?),
        secret_key: env_opt("PARA_SECRET_KEY"),
        ..ClientConfig::default()
    };

    if let Some(endpoint) = env_opt("PARA_ENDPOINT") {
        config.endpoint = endpoint;
    }
    if let Some(api_path) = env_opt("PARA_API_PATH") {
        config.api_path = api_path;
    }
    if let Some(user_agent) = env_opt("PARA_USER_AGENT") {
        config.user_agent = user_agent;
    }
    if let Some(level) = env_opt("PARA_LOG_LEVEL") {
        config.log_level = level;
    }
    if let Some(timeout) = env_parse::<u64>("PARA_TIMEOUT_SECS", "timeout")? {
        config.timeout_secs = timeout;
    }
    if let Some(attempts) = env_parse::<usize>("PARA_MAX_ATTEMPTS", "max attempts")? {
        config.max_attempts = attempts;
    }

    config.validate()?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `ParaError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
/// - The loaded settings fail validation
pub fn load_from_file(path: Option<PathBuf>) -> Result<ClientConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(ParaError::Config(format!("Config file not found: {}", p.display())));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            ParaError::Config("No config file found in any of the standard locations".to_string())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path).map_err(InfraError::from)?;
    let config = parse_config(&contents, &config_path)?;
    config.validate()?;
    Ok(config)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<ClientConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => Ok(toml::from_str(contents).map_err(InfraError::from)?),
        "json" => Ok(serde_json::from_str(contents).map_err(InfraError::from)?),
        _ => Err(ParaError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe multiple paths for configuration files
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    const NAMES: [&str; 4] = ["para.json", "para.toml", "config.json", "config.toml"];

    let cwd = std::env::current_dir().ok()?;
    let parent = cwd.join("..");

    NAMES
        .iter()
        .map(|name| cwd.join(name))
        .chain(NAMES.iter().map(|name| parent.join(name)))
        .find(|path| path.exists())
}

/// Get required environment variable
fn env_var(key: &str) -> Result<String> {
    env_opt(key)
        .ok_or_else(|| ParaError::Config(format!("Missing required environment variable: {key}")))
}

/// Optional environment variable; blank values count as unset
fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn env_parse<T>(key: &str, what: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env_opt(key)
        .map(|raw| {
            raw.trim().parse::<T>().map_err(|e| ParaError::Config(format!("Invalid {what}: {e}")))
        })
        .transpose()
}
