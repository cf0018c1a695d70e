//! # Para Core
//!
//! Request authentication and response normalisation for the Para client.
//! No network, filesystem or TLS code lives here.
//!
//! This crate contains:
//! - The transport and clock ports (traits)
//! - The request authenticator, SigV4 signer and session token manager
//! - The entity mapper and pagination tracker
//! - The invoker and the [`ParaClient`] facade
//!
//! ## Architecture Principles
//! - Only depends on `para-domain`
//! - All I/O goes through [`HttpTransport`]
//! - Time is read through [`clock::Clock`]

pub mod auth;
pub mod client;
pub mod clock;
pub mod invoker;
pub mod mapper;
pub mod pagination;
pub mod response;

// Infrastructure ports
pub mod transport_ports;

pub use auth::{AuthStrategy, RequestAuthenticator, RequestSigner, SessionTokenManager, TokenState};
pub use client::ParaClient;
pub use clock::{Clock, MockClock, SystemClock};
pub use invoker::{Invoker, InvokerSettings};
pub use response::Payload;
pub use transport_ports::{HttpMethod, HttpRequest, HttpResponse, HttpTransport};
