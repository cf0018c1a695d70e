//! Response classification and body decoding

use para_domain::{ParaError, Result};
use serde_json::Value;

use crate::transport_ports::HttpResponse;

/// Decoded body of a successful response
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Body parsed as JSON; `{}` stays an empty object
    Json(Value),
    /// Body that is not valid JSON, returned verbatim
    Text(String),
    /// Empty body
    Empty,
}

impl Payload {
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_json(self) -> Option<Value> {
        match self {
            Self::Json(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

/// Status codes treated as success
pub fn is_success(status: u16) -> bool {
    matches!(status, 200 | 201 | 304)
}

/// Turn a raw response into a [`Payload`] or a `ParaError::Remote`
///
/// # Errors
/// Any status other than 200, 201 or 304 is a failure. The `{code, message}`
/// envelope is used when the body carries one, the reason phrase otherwise.
pub fn decode_response(response: HttpResponse) -> Result<Payload> {
    if !is_success(response.status) {
        return Err(remote_error(&response));
    }

    if response.body.trim().is_empty() {
        return Ok(Payload::Empty);
    }

    match serde_json::from_str::<Value>(&response.body) {
        Ok(value) => Ok(Payload::Json(value)),
        Err(_) => Ok(Payload::Text(response.body)),
    }
}

fn remote_error(response: &HttpResponse) -> ParaError {
    let envelope = serde_json::from_str::<Value>(&response.body).ok();
    let envelope = envelope.as_ref().and_then(Value::as_object);

    let code = envelope.and_then(|e| e.get("code")).and_then(|code| {
        code.as_i64().or_else(|| code.as_str().and_then(|s| s.trim().parse().ok()))
    });
    let message = envelope
        .and_then(|e| e.get("message"))
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .or_else(|| response.reason.clone().filter(|r| !r.is_empty()))
        .unwrap_or_else(|| format!("HTTP {}", response.status));

    ParaError::Remote { status: response.status, code, message }
}
