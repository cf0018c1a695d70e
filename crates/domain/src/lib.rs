//! # Para Domain
//!
//! Data types shared by the Para client crates.
//!
//! This crate contains:
//! - The generic [`Entity`] field bag and the [`Pager`] cursor
//! - Query parameter values, including multi-valued parameters
//! - The [`Credentials`] store and client configuration
//! - The [`ParaError`] taxonomy and `Result` alias
//!
//! ## Architecture
//! - No dependencies on other Para crates
//! - Only external dependencies allowed
//! - Pure data structures, no I/O

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
