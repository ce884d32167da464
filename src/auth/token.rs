// Bearer token inspection
//
// Tokens are opaque to the client. When one happens to be a JWT its `iat` and
// `exp` claims are read without verifying the signature; they only feed
// informational session timestamps and are never trusted for authorization.

use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::{decode, decode_header, DecodingKey, Validation};
use serde::Deserialize;

/// Timestamp claims of interest
#[derive(Debug, Deserialize)]
struct TimeClaims {
    iat: Option<i64>,
    exp: Option<i64>,
}

/// Issue and expiry times read from a token, when available
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenTimes {
    pub issued_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Read `iat`/`exp` from a JWT without verifying it
///
/// Returns empty times for opaque or malformed tokens.
pub fn peek_token_times(token: &str) -> TokenTimes {
    let header = match decode_header(token) {
        Ok(header) => header,
        Err(_) => return TokenTimes::default(),
    };

    let mut validation = Validation::new(header.alg);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    match decode::<TimeClaims>(token, &DecodingKey::from_secret(&[]), &validation) {
        Ok(data) => TokenTimes {
            issued_at: data.claims.iat.and_then(timestamp_to_utc),
            expires_at: data.claims.exp.and_then(timestamp_to_utc),
        },
        Err(e) => {
            tracing::debug!("Token claims unreadable, treating token as opaque: {}", e);
            TokenTimes::default()
        }
    }
}

fn timestamp_to_utc(secs: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_opt(secs, 0).single()
}
