//! # Para Infrastructure
//!
//! Infrastructure implementations of the `para-core` ports.
//!
//! This crate contains:
//! - The reqwest-backed [`HttpClient`] implementing `HttpTransport`
//! - Configuration loading from environment variables and JSON/TOML files
//! - Conversions from reqwest, TOML and JSON errors into `ParaError`
//! - Tracing subscriber initialisation
//!
//! ## Architecture
//! - Implements traits defined in `para-core`
//! - Depends on `para-domain` and `para-core`
//! - Contains all "impure" code (network, filesystem, environment)
//!
//! ## Example
//! ```no_run
//! # async fn run() -> para_domain::Result<()> {
//! let config = para_infra::config::load()?;
//! para_infra::observability::init_tracing(&config.log_level);
//!
//! let mut client = para_infra::connect(&config)?;
//! let me = client.me().await?;
//! # let _ = me;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod errors;
pub mod http;
pub mod observability;

// Re-export commonly used items
pub use client::{connect, connect_from_env};
pub use errors::InfraError;
pub use http::{HttpClient, HttpClientBuilder};
