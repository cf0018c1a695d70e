//! Port interface for the HTTP transport
//!
//! The core builds fully authenticated request descriptors and hands them to
//! an [`HttpTransport`]. Connection pooling, TLS and timeouts belong to the
//! adapter in `para-infra`.

use std::fmt;

use async_trait::async_trait;
use para_domain::{QueryParams, Result};
use url::Url;

/// HTTP verbs used by the Para API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outbound request descriptor
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    /// Absolute URL without the query string
    pub url: String,
    /// Path component of `url`, API prefix included
    pub path: String,
    pub headers: Vec<(String, String)>,
    /// Complete parameter set; adapters send every value of a collection
    pub query: QueryParams,
    /// Serialised JSON body
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn new(method: HttpMethod, url: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            path: path.into(),
            headers: Vec::new(),
            query: QueryParams::new(),
            body: None,
        }
    }

    /// Case-insensitive header lookup
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Set a header, replacing any existing value with the same name
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.headers.retain(|(key, _)| !key.eq_ignore_ascii_case(&name));
        self.headers.push((name, value.into()));
    }

    /// `host[:port]` as sent in the `Host` header
    ///
    /// The port is only included when it differs from the scheme default.
    pub fn host(&self) -> Option<String> {
        let url = Url::parse(&self.url).ok()?;
        let host = url.host_str()?;
        Some(match url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        })
    }
}

/// Raw response returned by the transport
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HttpResponse {
    pub status: u16,
    /// Reason phrase, e.g. "Not Found"
    pub reason: Option<String>,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self { status, reason: None, headers: Vec::new(), body: body.into() }
    }

    #[must_use]
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

/// Trait for sending HTTP requests
///
/// Implementations report network-level failures as
/// `ParaError::Transport`; any status code, including errors, is returned
/// as a normal [`HttpResponse`].
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_header_replaces_case_insensitively() {
        let mut request = HttpRequest::new(HttpMethod::Get, "https://paraio.com/v1/", "/v1/");
        request.set_header("authorization", "Anonymous app:a");
        request.set_header("Authorization", "Bearer t");
        assert_eq!(request.headers.len(), 1);
        assert_eq!(request.header("AUTHORIZATION"), Some("Bearer t"));
    }

    #[test]
    fn test_host_includes_non_default_port() {
        let request = HttpRequest::new(HttpMethod::Get, "http://127.0.0.1:8080/v1/dog", "/v1/dog");
        assert_eq!(request.host().as_deref(), Some("127.0.0.1:8080"));

        let request = HttpRequest::new(HttpMethod::Get, "https://paraio.com:443/v1/", "/v1/");
        assert_eq!(request.host().as_deref(), Some("paraio.com"));
    }
}
