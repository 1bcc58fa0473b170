//
// Request signing
// https://api.slack.com/authentication/verifying-requests-from-slack
//
use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

pub const TIMESTAMP_HEADER: &str = "x-slack-request-timestamp";
pub const SIGNATURE_HEADER: &str = "x-slack-signature";

/// Oldest request timestamp accepted, in seconds either side of now.
pub const MAX_SKEW_SECS: i64 = 5 * 60;

const VERSION: &str = "v0";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("missing {0} header")]
    Missing(&'static str),

    #[error("malformed request timestamp {0:?}")]
    BadTimestamp(String),

    #[error("request timestamp {timestamp} is {skew}s away from now")]
    Stale { timestamp: i64, skew: i64 },

    #[error("signature does not match")]
    Mismatch,
}

/// Check `signature` (`v0=<hex>`) against the HMAC-SHA256 of `v0:{timestamp}:{body}`.
pub fn verify(
    secret: &str,
    timestamp: Option<&str>,
    signature: Option<&str>,
    body: &[u8],
    now: i64,
) -> Result<(), SignatureError> {
    let raw_ts = timestamp.ok_or(SignatureError::Missing(TIMESTAMP_HEADER))?;
    let signature = signature.ok_or(SignatureError::Missing(SIGNATURE_HEADER))?;

    let ts: i64 = raw_ts
        .trim()
        .parse()
        .map_err(|_| SignatureError::BadTimestamp(raw_ts.to_string()))?;

    let skew = now.saturating_sub(ts).saturating_abs();
    if skew > MAX_SKEW_SECS {
        return Err(SignatureError::Stale { timestamp: ts, skew });
    }

    let expected = signature
        .strip_prefix("v0=")
        .and_then(|hex_sig| hex::decode(hex_sig).ok())
        .ok_or(SignatureError::Mismatch)?;

    base_string_mac(secret, raw_ts.trim(), body)
        .map_err(|_| SignatureError::Mismatch)?
        .verify_slice(&expected)
        .map_err(|_| SignatureError::Mismatch)
}

fn base_string_mac(
    secret: &str,
    timestamp: &str,
    body: &[u8],
) -> Result<Hmac<Sha256>, hmac::digest::InvalidLength> {
    let mut mac = <Hmac<Sha256> as Mac>::new_from_slice(secret.as_bytes())?;
    mac.update(format!("{VERSION}:{timestamp}:").as_bytes());
    mac.update(body);
    Ok(mac)
}
