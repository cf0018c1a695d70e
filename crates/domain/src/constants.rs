//! Client constants
//!
//! Centralized location for the fixed paths, names and defaults used when
//! talking to a Para server.

// Endpoint defaults
pub const DEFAULT_ENDPOINT: &str = "https://paraio.com";
pub const DEFAULT_API_PATH: &str = "/v1/";
pub const USER_AGENT: &str = concat!("Para client for Rust/", env!("CARGO_PKG_VERSION"));

// Fixed resource paths (relative to the API path)
pub const JWT_PATH: &str = "jwt_auth";
pub const BATCH_PATH: &str = "_batch";
pub const SEARCH_PATH: &str = "search";
pub const ME_PATH: &str = "_me";
pub const NEW_KEYS_PATH: &str = "_newkeys";
pub const READ_BY_ID_PATH: &str = "_id";

// Request signing
pub const SIGNING_SERVICE: &str = "para";
pub const SIGNING_REGION: &str = "us-east-1";
pub const ANONYMOUS_SCHEME: &str = "Anonymous";
pub const BEARER_SCHEME: &str = "Bearer";

// Entity defaults
pub const DEFAULT_TYPE: &str = "sysprop";
pub const APP_ID_PREFIX: &str = "app:";

// Pagination
pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_PAGE_LIMIT: u32 = 30;
pub const RESULTS_FIELD: &str = "items";
pub const TOTAL_HITS_FIELD: &str = "totalHits";
pub const LAST_KEY_FIELD: &str = "lastKey";

// Transport defaults
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_MAX_ATTEMPTS: usize = 1;
pub const DEFAULT_LOG_LEVEL: &str = "info";
