//! Access-token expiry evaluation.
//!
//! Tokens are JWT-shaped: three dot-separated segments, the middle one a
//! base64 JSON object carrying an `exp` claim in seconds since the epoch.
//! Anything that cannot be decoded counts as expired.

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

/// Prefix of synthetic tokens issued for offline/demo sessions. They never expire.
pub const SYNTHETIC_TOKEN_PREFIX: &str = "mock-token-";

// Accepts both padded and unpadded payloads; standard-alphabet input is
// mapped onto the URL-safe alphabet before decoding.
const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("expected 3 token segments, found {0}")]
    SegmentCount(usize),
    #[error("token payload is not valid base64: {0}")]
    Encoding(String),
    #[error("token payload is not a valid claims object: {0}")]
    Payload(String),
}

/// The claims the client cares about.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TokenClaims {
    /// Expiry, seconds since the epoch.
    pub exp: f64,
    #[serde(default)]
    pub sub: Option<String>,
}

impl TokenClaims {
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis((self.exp * 1000.0) as i64)
    }
}

pub fn is_synthetic_token(token: &str) -> bool {
    token.starts_with(SYNTHETIC_TOKEN_PREFIX)
}

/// Decodes the claims segment of `token`.
pub fn decode_claims(token: &str) -> Result<TokenClaims, TokenError> {
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 {
        return Err(TokenError::SegmentCount(segments.len()));
    }

    let payload = segments[1].replace('+', "-").replace('/', "_");
    let bytes = PAYLOAD_ENGINE
        .decode(payload.as_bytes())
        .map_err(|e| TokenError::Encoding(e.to_string()))?;

    let claims: TokenClaims =
        serde_json::from_slice(&bytes).map_err(|e| TokenError::Payload(e.to_string()))?;
    if !claims.exp.is_finite() {
        return Err(TokenError::Payload("exp is not a finite number".to_string()));
    }
    Ok(claims)
}

/// Returns true if `token` is expired at `now`.
///
/// Synthetic tokens never expire. Empty or undecodable tokens are expired.
pub fn is_token_expired_at(token: &str, now: DateTime<Utc>) -> bool {
    if token.is_empty() {
        return true;
    }
    if is_synthetic_token(token) {
        tracing::debug!("[Auth] Synthetic token detected, never expires");
        return false;
    }

    match decode_claims(token) {
        Ok(claims) => {
            let expired = claims.exp * 1000.0 < now.timestamp_millis() as f64;
            tracing::debug!(
                "[Auth] Token expiry check: exp={}, now={}, expired={}",
                claims.exp,
                now.timestamp(),
                expired
            );
            expired
        }
        Err(e) => {
            tracing::debug!("[Auth] Invalid token format, treating as expired: {}", e);
            true
        }
    }
}

/// Returns true if `token` is expired right now.
pub fn is_token_expired(token: &str) -> bool {
    is_token_expired_at(token, Utc::now())
}

/// Expiry instant of `token`, if it is a decodable, non-synthetic token.
pub fn token_expires_at(token: &str) -> Option<DateTime<Utc>> {
    if is_synthetic_token(token) {
        return None;
    }
    decode_claims(token).ok().and_then(|c| c.expires_at())
}
