//! Minimal AWS Signature Version 4 signing for S3 object puts.

use auditrelay_core::{AppError, AppResult};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;

const SIGNED_HEADERS: &str = "host;x-amz-content-sha256;x-amz-date";

/// Request components participating in the signature.
pub(crate) struct SigningInput<'a> {
    pub method: &'a str,
    pub host: &'a str,
    pub path: &'a str,
    pub region: &'a str,
    pub service: &'a str,
    pub payload_hash: &'a str,
    pub timestamp: DateTime<Utc>,
    pub access_key_id: &'a str,
    pub secret_access_key: &'a str,
}

/// Headers produced by signing.
pub(crate) struct SignedHeaders {
    pub amz_date: String,
    pub authorization: String,
}

/// Hex-encoded SHA-256 digest of the given bytes.
pub(crate) fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> AppResult<Vec<u8>> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|error| AppError::Internal(format!("invalid hmac key length: {error}")))?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

fn derive_signing_key(
    secret_access_key: &str,
    date: &str,
    region: &str,
    service: &str,
) -> AppResult<Vec<u8>> {
    let k_date = hmac_sha256(format!("AWS4{secret_access_key}").as_bytes(), date.as_bytes())?;
    let k_region = hmac_sha256(k_date.as_slice(), region.as_bytes())?;
    let k_service = hmac_sha256(k_region.as_slice(), service.as_bytes())?;
    hmac_sha256(k_service.as_slice(), b"aws4_request")
}

/// Signs one request with query-less canonical form and the fixed
/// `host;x-amz-content-sha256;x-amz-date` header set.
pub(crate) fn sign(input: &SigningInput<'_>) -> AppResult<SignedHeaders> {
    let amz_date = input.timestamp.format("%Y%m%dT%H%M%SZ").to_string();
    let date = input.timestamp.format("%Y%m%d").to_string();

    let canonical_headers = format!(
        "host:{}\nx-amz-content-sha256:{}\nx-amz-date:{}\n",
        input.host, input.payload_hash, amz_date
    );
    let canonical_request = format!(
        "{}\n{}\n\n{}\n{}\n{}",
        input.method, input.path, canonical_headers, SIGNED_HEADERS, input.payload_hash
    );

    let credential_scope = format!("{date}/{}/{}/aws4_request", input.region, input.service);
    let string_to_sign = format!(
        "AWS4-HMAC-SHA256\n{amz_date}\n{credential_scope}\n{}",
        sha256_hex(canonical_request.as_bytes())
    );

    let signing_key = derive_signing_key(
        input.secret_access_key,
        date.as_str(),
        input.region,
        input.service,
    )?;
    let signature = hex::encode(hmac_sha256(
        signing_key.as_slice(),
        string_to_sign.as_bytes(),
    )?);

    let authorization = format!(
        "AWS4-HMAC-SHA256 Credential={}/{credential_scope}, SignedHeaders={SIGNED_HEADERS}, Signature={signature}",
        input.access_key_id
    );

    Ok(SignedHeaders {
        amz_date,
        authorization,
    })
}
