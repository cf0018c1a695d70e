//! AWS Signature Version 4 request signing
//!
//! Para servers verify requests signed with the SigV4 algorithm under the
//! fixed service name `para` and region `us-east-1`.
//!
//! # Multi-valued query parameters
//!
//! Only the first element of a collection-valued parameter is covered by the
//! signature, while every element is transmitted. Servers compute the
//! expected signature the same way, so this undersigning is a compatibility
//! accommodation and must be kept in step with them.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use para_domain::constants::{SIGNING_REGION, SIGNING_SERVICE};
use para_domain::{ParaError, Result};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::transport_ports::HttpRequest;

type HmacSha256 = Hmac<Sha256>;

pub const ALGORITHM: &str = "AWS4-HMAC-SHA256";
pub const DATE_HEADER: &str = "X-Amz-Date";
const SIGNED_HEADERS: &str = "host;x-amz-date";
const TERMINATOR: &str = "aws4_request";

/// Signs request descriptors with a secret key
#[derive(Debug, Clone)]
pub struct RequestSigner {
    region: String,
    service: String,
}

impl Default for RequestSigner {
    fn default() -> Self {
        Self::new(SIGNING_REGION, SIGNING_SERVICE)
    }
}

impl RequestSigner {
    pub fn new(region: impl Into<String>, service: impl Into<String>) -> Self {
        Self { region: region.into(), service: service.into() }
    }

    /// Credential scope for the given instant, e.g. `20240101/us-east-1/para/aws4_request`
    pub fn scope(&self, now: DateTime<Utc>) -> String {
        format!("{}/{}/{}/{TERMINATOR}", now.format("%Y%m%d"), self.region, self.service)
    }

    /// Add `X-Amz-Date` and `Authorization` headers to `request`
    ///
    /// # Errors
    /// Returns `ParaError::Auth` when the request has no host or the
    /// signing key cannot be derived.
    pub fn sign(
        &self,
        request: &mut HttpRequest,
        access_key: &str,
        secret_key: &str,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();
        let host = request
            .host()
            .ok_or_else(|| ParaError::Auth(format!("Cannot sign request without host: {}", request.url)))?;

        let canonical = canonical_request(request, &host, &amz_date);
        let scope = self.scope(now);
        let string_to_sign =
            format!("{ALGORITHM}\n{amz_date}\n{scope}\n{}", hex::encode(Sha256::digest(canonical)));

        let key = self.signing_key(secret_key, now)?;
        let signature = hex::encode(hmac(&key, string_to_sign.as_bytes())?);

        if request.query.has_truncated_values() {
            debug!(path = %request.path, "Multi-valued query parameters signed by first value only");
        }

        request.set_header(DATE_HEADER, amz_date);
        request.set_header(
            "Authorization",
            format!(
                "{ALGORITHM} Credential={access_key}/{scope}, SignedHeaders={SIGNED_HEADERS}, Signature={signature}"
            ),
        );
        Ok(())
    }

    fn signing_key(&self, secret_key: &str, now: DateTime<Utc>) -> Result<Vec<u8>> {
        let date = now.format("%Y%m%d").to_string();
        let k_date = hmac(format!("AWS4{secret_key}").as_bytes(), date.as_bytes())?;
        let k_region = hmac(&k_date, self.region.as_bytes())?;
        let k_service = hmac(&k_region, self.service.as_bytes())?;
        hmac(&k_service, TERMINATOR.as_bytes())
    }
}

fn hmac(key: &[u8], data: &[u8]) -> Result<Vec<u8>> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|e| ParaError::Auth(format!("Invalid signing key: {e}")))?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

fn canonical_request(request: &HttpRequest, host: &str, amz_date: &str) -> String {
    let payload_hash = hex::encode(Sha256::digest(request.body.as_deref().unwrap_or("")));
    format!(
        "{}\n{}\n{}\nhost:{host}\nx-amz-date:{amz_date}\n\n{SIGNED_HEADERS}\n{payload_hash}",
        request.method.as_str(),
        canonical_uri(&request.path),
        canonical_query(request),
    )
}

fn canonical_uri(path: &str) -> String {
    if path.is_empty() {
        return "/".to_string();
    }
    path.split('/').map(|segment| urlencoding::encode(segment).into_owned()).collect::<Vec<_>>().join("/")
}

fn canonical_query(request: &HttpRequest) -> String {
    let mut pairs: Vec<(String, String)> = request
        .query
        .signing_pairs()
        .into_iter()
        .map(|(key, value)| {
            (urlencoding::encode(&key).into_owned(), urlencoding::encode(&value).into_owned())
        })
        .collect();
    pairs.sort();
    pairs.into_iter().map(|(key, value)| format!("{key}={value}")).collect::<Vec<_>>().join("&")
}
