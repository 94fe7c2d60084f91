//! Unverified JWT payload decoding
//!
//! The backend issues JWT access tokens. The client never trusts their
//! contents for authorization; it only peeks at the payload to report who is
//! logged in and when the token lapses.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::Deserialize;

use crate::error::{Error, Result};

/// Claims carried by an access token payload.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct AccessClaims {
    #[serde(default)]
    pub user_id: Option<u64>,
    /// Expiry as unix seconds
    #[serde(default)]
    pub exp: Option<u64>,
    #[serde(default)]
    pub token_type: Option<String>,
}

impl AccessClaims {
    /// Seconds until expiry relative to `now` (unix seconds), negative once lapsed.
    pub fn seconds_left(&self, now: u64) -> Option<i64> {
        self.exp.map(|exp| exp as i64 - now as i64)
    }

    pub fn is_expired_at(&self, now: u64) -> bool {
        self.exp.is_some_and(|exp| exp <= now)
    }
}

/// Decode the payload segment of a JWT without verifying its signature.
pub fn decode_unverified(token: &str) -> Result<AccessClaims> {
    let mut segments = token.split('.');
    let payload = match (segments.next(), segments.next(), segments.next()) {
        (Some(_), Some(payload), Some(_)) if segments.next().is_none() => payload,
        _ => return Err(Error::Claims("expected three dot-separated segments".into())),
    };

    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| Error::Claims(format!("payload is not base64url: {e}")))?;

    serde_json::from_slice(&bytes).map_err(|e| Error::Claims(format!("payload is not JSON: {e}")))
}
