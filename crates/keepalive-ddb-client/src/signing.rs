//! AWS Signature Version 4 request signing.
//!
//! Produces the `Authorization` header for a request:
//!
//! 1. Build the canonical request from method, path, signed headers and the
//!    payload hash.
//! 2. Build the string to sign from the timestamp, credential scope and
//!    canonical request hash.
//! 3. Derive the signing key with the HMAC-SHA256 chain over the credential
//!    scope and sign.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use hmac::{Hmac, KeyInit, Mac};
use sha2::{Digest, Sha256};

const ALGORITHM: &str = "AWS4-HMAC-SHA256";

type HmacSha256 = Hmac<Sha256>;

/// Static AWS credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Access key id.
    pub access_key_id: String,
    /// Secret access key.
    pub secret_access_key: String,
    /// Session token for temporary credentials.
    pub session_token: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("session_token", &self.session_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// The parts of an HTTP request covered by the signature.
#[derive(Debug, Clone, Copy)]
pub struct SigningRequest<'a> {
    /// HTTP method.
    pub method: &'a str,
    /// URI path, already encoded.
    pub path: &'a str,
    /// Headers to sign; must include `host` and `x-amz-date`.
    pub headers: &'a [(&'a str, &'a str)],
    /// Request body.
    pub payload: &'a [u8],
}

/// Formats a timestamp as the `x-amz-date` header value.
#[must_use]
pub fn amz_date(timestamp: &DateTime<Utc>) -> String {
    timestamp.format("%Y%m%dT%H%M%SZ").to_string()
}

/// Computes the `Authorization` header value for `request`.
#[must_use]
pub fn authorization_header(
    request: &SigningRequest<'_>,
    credentials: &Credentials,
    region: &str,
    service: &str,
    timestamp: &DateTime<Utc>,
) -> String {
    let date = timestamp.format("%Y%m%d").to_string();
    let (canonical_headers, signed_headers) = canonical_headers(request.headers);
    let canonical_request = format!(
        "{}\n{}\n\n{canonical_headers}\n\n{signed_headers}\n{}",
        request.method,
        request.path,
        hash_payload(request.payload)
    );
    let credential_scope = format!("{date}/{region}/{service}/aws4_request");
    let string_to_sign = build_string_to_sign(
        &amz_date(timestamp),
        &credential_scope,
        &hex::encode(Sha256::digest(canonical_request.as_bytes())),
    );
    let signing_key = derive_signing_key(&credentials.secret_access_key, &date, region, service);
    let signature = compute_signature(&signing_key, &string_to_sign);

    format!(
        "{ALGORITHM} Credential={}/{credential_scope}, SignedHeaders={signed_headers}, \
         Signature={signature}",
        credentials.access_key_id
    )
}

/// Lowercases, trims and sorts headers; returns the canonical header block
/// and the `;`-joined signed header list.
fn canonical_headers(headers: &[(&str, &str)]) -> (String, String) {
    let mut sorted: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in headers {
        let value = value.split_whitespace().collect::<Vec<_>>().join(" ");
        sorted
            .entry(name.to_ascii_lowercase())
            .and_modify(|existing| {
                existing.push(',');
                existing.push_str(&value);
            })
            .or_insert(value);
    }
    let block = sorted
        .iter()
        .map(|(name, value)| format!("{name}:{value}"))
        .collect::<Vec<_>>()
        .join("\n");
    let names = sorted.keys().cloned().collect::<Vec<_>>().join(";");
    (block, names)
}

/// Build the SigV4 string to sign.
#[must_use]
pub fn build_string_to_sign(
    timestamp: &str,
    credential_scope: &str,
    canonical_request_hash: &str,
) -> String {
    format!("{ALGORITHM}\n{timestamp}\n{credential_scope}\n{canonical_request_hash}")
}

/// Derive the SigV4 signing key using the HMAC-SHA256 chain.
///
/// ```text
/// DateKey              = HMAC-SHA256("AWS4" + secret_key, date)
/// DateRegionKey        = HMAC-SHA256(DateKey, region)
/// DateRegionServiceKey = HMAC-SHA256(DateRegionKey, service)
/// SigningKey           = HMAC-SHA256(DateRegionServiceKey, "aws4_request")
/// ```
#[must_use]
pub fn derive_signing_key(secret_key: &str, date: &str, region: &str, service: &str) -> Vec<u8> {
    let date_key = hmac_sha256(format!("AWS4{secret_key}").as_bytes(), date.as_bytes());
    let date_region_key = hmac_sha256(&date_key, region.as_bytes());
    let date_region_service_key = hmac_sha256(&date_region_key, service.as_bytes());
    hmac_sha256(&date_region_service_key, b"aws4_request")
}

/// Compute the hex-encoded HMAC-SHA256 signature of `data`.
#[must_use]
pub fn compute_signature(signing_key: &[u8], data: &str) -> String {
    hex::encode(hmac_sha256(signing_key, data.as_bytes()))
}

/// Hex-encoded SHA-256 of a request body.
#[must_use]
pub fn hash_payload(payload: &[u8]) -> String {
    hex::encode(Sha256::digest(payload))
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC can accept keys of any length");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn example_credentials() -> Credentials {
        Credentials {
            access_key_id: "AKIDEXAMPLE".to_owned(),
            secret_access_key: "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY".to_owned(),
            session_token: None,
        }
    }

    #[test]
    fn test_should_sign_vanilla_get_request() {
        let timestamp = Utc.with_ymd_and_hms(2015, 8, 30, 12, 36, 0).unwrap();
        let date = amz_date(&timestamp);
        let headers = [("Host", "example.amazonaws.com"), ("X-Amz-Date", date.as_str())];
        let request = SigningRequest {
            method: "GET",
            path: "/",
            headers: &headers,
            payload: b"",
        };
        let header = authorization_header(
            &request,
            &example_credentials(),
            "us-east-1",
            "service",
            &timestamp,
        );
        assert_eq!(
            header,
            "AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/20150830/us-east-1/service/aws4_request, \
             SignedHeaders=host;x-amz-date, \
             Signature=5fa00fa31553b73ebf1942676e86291e8372ff2a2260956d9b8aae1d763fbf31"
        );
    }

    #[test]
    fn test_should_hash_empty_payload() {
        assert_eq!(
            hash_payload(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_should_canonicalize_headers() {
        let (block, names) = canonical_headers(&[("X-Amz-Target", " a  b "), ("Host", "h")]);
        assert_eq!(block, "host:h\nx-amz-target:a b");
        assert_eq!(names, "host;x-amz-target");
    }

    #[test]
    fn test_should_redact_secret_in_debug_output() {
        let rendered = format!("{:?}", example_credentials());
        assert!(!rendered.contains("wJalr"));
        assert!(rendered.contains("AKIDEXAMPLE"));
    }
}
