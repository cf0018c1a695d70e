//! Shared test helpers for `para-core` integration tests.
//!
//! The recording transport replays canned responses in order and keeps every
//! request it was given, so tests can assert on headers, query pairs and
//! call counts without a network.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, TimeZone, Utc};
use para_core::{HttpRequest, HttpResponse, HttpTransport, MockClock, ParaClient};
use para_domain::{ClientConfig, ParaError, Result as DomainResult};
use serde_json::Value;
use tokio::sync::Mutex;

#[derive(Default)]
struct State {
    responses: VecDeque<DomainResult<HttpResponse>>,
    requests: Vec<HttpRequest>,
}

/// In-memory `HttpTransport` that records requests.
#[derive(Default, Clone)]
pub struct RecordingTransport {
    state: Arc<Mutex<State>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response with the given status and body.
    pub async fn respond(&self, status: u16, body: impl Into<String>) {
        self.state.lock().await.responses.push_back(Ok(HttpResponse::new(status, body)));
    }

    /// Queue a JSON response.
    pub async fn respond_json(&self, status: u16, body: Value) {
        self.respond(status, body.to_string()).await;
    }

    /// Queue a transport-level failure.
    pub async fn fail(&self, message: &str) {
        self.state.lock().await.responses.push_back(Err(ParaError::Transport(message.to_string())));
    }

    pub async fn requests(&self) -> Vec<HttpRequest> {
        self.state.lock().await.requests.clone()
    }

    pub async fn request_count(&self) -> usize {
        self.state.lock().await.requests.len()
    }

    pub async fn last_request(&self) -> HttpRequest {
        self.state.lock().await.requests.last().cloned().expect("no request was sent")
    }
}

#[async_trait]
impl HttpTransport for RecordingTransport {
    async fn send(&self, request: HttpRequest) -> DomainResult<HttpResponse> {
        let mut state = self.state.lock().await;
        let url = request.url.clone();
        state.requests.push(request);
        state
            .responses
            .pop_front()
            .unwrap_or_else(|| Err(ParaError::Transport(format!("no canned response for {url}"))))
    }
}

/// Fixed instant used by the mock clock.
pub fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

/// Client with the given keys, a recording transport and a mock clock.
pub fn client(
    access_key: &str,
    secret_key: Option<&str>,
) -> (ParaClient, RecordingTransport, MockClock) {
    let transport = RecordingTransport::new();
    let clock = MockClock::at(start());
    let config = ClientConfig::new(access_key, secret_key.map(str::to_string));
    let client = ParaClient::with_clock(&config, Arc::new(transport.clone()), Arc::new(clock.clone()));
    (client, transport, clock)
}

/// Unsigned JWT with the given claims.
pub fn jwt(claims: &Value) -> String {
    format!("eyJhbGciOiJIUzI1NiJ9.{}.c2ln", URL_SAFE_NO_PAD.encode(claims.to_string()))
}

/// Query value for `key`, first occurrence.
pub fn query_value(request: &HttpRequest, key: &str) -> Option<String> {
    request.query.transport_pairs().into_iter().find(|(k, _)| k == key).map(|(_, v)| v)
}
