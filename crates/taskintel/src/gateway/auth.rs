//! Webhook signature verification.
//!
//! Inbound commands carry a timestamped HMAC-SHA256 signature pair
//! (`X-Slack-Request-Timestamp`, `X-Slack-Signature`). The signature is
//! `v0=<hex>` over the base string `v0:{timestamp}:{raw body}`. Requests
//! older than the configured age, or with a mismatched signature, are
//! rejected before any processing happens.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use taskintel_core::error::{IntelError, Result};

type HmacSha256 = Hmac<Sha256>;

/// Verify a signed request. `now_unix` is passed in so tests control the
/// clock.
pub fn verify_signature(
    signing_secret: &str,
    timestamp: &str,
    signature: &str,
    body: &[u8],
    now_unix: i64,
    max_age_secs: u64,
) -> Result<()> {
    let ts: i64 = timestamp
        .parse()
        .map_err(|_| IntelError::auth("Malformed request timestamp"))?;

    if now_unix.abs_diff(ts) > max_age_secs {
        return Err(IntelError::auth("Request timestamp too old"));
    }

    let provided = signature
        .strip_prefix("v0=")
        .ok_or_else(|| IntelError::auth("Malformed signature header"))?;
    let provided =
        hex::decode(provided).map_err(|_| IntelError::auth("Malformed signature header"))?;

    let mut mac = HmacSha256::new_from_slice(signing_secret.as_bytes())
        .map_err(|_| IntelError::auth("Invalid signing secret"))?;
    mac.update(format!("v0:{ts}:").as_bytes());
    mac.update(body);

    // verify_slice is constant-time
    mac.verify_slice(&provided)
        .map_err(|_| IntelError::auth("Signature mismatch"))
}

/// Compute the signature header value for a body; the counterpart of
/// [`verify_signature`], used by tests and useful for local tooling.
pub fn sign(signing_secret: &str, timestamp: i64, body: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(signing_secret.as_bytes())
        .expect("HMAC accepts any key length");
    mac.update(format!("v0:{timestamp}:").as_bytes());
    mac.update(body);
    format!("v0={}", hex::encode(mac.finalize().into_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "8f742231b10e8888abcd99yyyzzz85a5";
    const NOW: i64 = 1_750_000_000;

    #[test]
    fn test_valid_signature_passes() {
        let body = b"text=brief&user_id=U1";
        let sig = sign(SECRET, NOW, body);
        assert!(verify_signature(SECRET, &NOW.to_string(), &sig, body, NOW + 30, 300).is_ok());
    }

    #[test]
    fn test_tampered_body_fails() {
        let sig = sign(SECRET, NOW, b"text=brief");
        let err =
            verify_signature(SECRET, &NOW.to_string(), &sig, b"text=evil", NOW, 300).unwrap_err();
        assert!(matches!(err, IntelError::Auth(_)));
    }

    #[test]
    fn test_wrong_secret_fails() {
        let body = b"text=brief";
        let sig = sign("other-secret", NOW, body);
        assert!(verify_signature(SECRET, &NOW.to_string(), &sig, body, NOW, 300).is_err());
    }

    #[test]
    fn test_stale_timestamp_fails() {
        let body = b"text=brief";
        let sig = sign(SECRET, NOW, body);
        let err =
            verify_signature(SECRET, &NOW.to_string(), &sig, body, NOW + 301, 300).unwrap_err();
        assert!(matches!(err, IntelError::Auth(_)));
    }

    #[test]
    fn test_malformed_headers_fail() {
        assert!(verify_signature(SECRET, "yesterday", "v0=aa", b"", NOW, 300).is_err());
        assert!(verify_signature(SECRET, &NOW.to_string(), "nope", b"", NOW, 300).is_err());
        assert!(verify_signature(SECRET, &NOW.to_string(), "v0=zz", b"", NOW, 300).is_err());
    }
}
