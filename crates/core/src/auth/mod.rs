//! Request authentication and session token management

pub mod authenticator;
pub mod session;
pub mod signer;

pub use authenticator::{AuthStrategy, RequestAuthenticator};
pub use session::{SessionTokenManager, TokenRefresher, TokenState};
pub use signer::RequestSigner;
