use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{ DateTime, TimeZone, Utc };
use serde::Deserialize;
use thiserror::Error;
use crate::models::user::User;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token is not a JWT: expected 3 segments, found {0}")]
    Malformed(usize),
    #[error("token payload is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("token payload is not a valid claim set: {0}")]
    Claims(#[from] serde_json::Error),
}

/// Claims the backend signs into every access token.
#[derive(Debug, Clone, Deserialize)]
pub struct Claims {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub exp: Option<i64>,
}

impl Claims {
    pub fn user(&self) -> User {
        User {
            id: self.id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp.and_then(|secs| Utc.timestamp_opt(secs, 0).single())
    }

    /// A token without a usable `exp` claim counts as expired.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at() {
            Some(expiry) => expiry < now,
            None => true,
        }
    }
}

/// Reads the payload segment of a JWT. The signature is not verified; the
/// backend does that on every request.
pub fn decode_claims(token: &str) -> Result<Claims, TokenError> {
    let segments: Vec<&str> = token.trim().split('.').collect();
    if segments.len() != 3 {
        return Err(TokenError::Malformed(segments.len()));
    }
    let payload = URL_SAFE_NO_PAD.decode(segments[1].trim_end_matches('='))?;
    Ok(serde_json::from_slice(&payload)?)
}

#[cfg(test)]
pub(crate) fn encode_for_test(claims: serde_json::Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{}.{}.signature", header, payload)
}
