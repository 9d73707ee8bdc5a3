//! JWT Token Handler
//! Mission: Issue and validate signed bearer tokens

use anyhow::{Context, Result};
use chrono::Utc;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Claims embedded in every issued token. The subject is the user's email.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
}

/// Why a token was rejected. Both kinds surface to clients as the same
/// uniform 401; the distinction exists for server-side logging only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    Expired,
    Invalid,
}

/// JWT handler for token operations. Holds the process-wide signing secret;
/// rotating the secret invalidates every outstanding token.
pub struct JwtHandler {
    secret: String,
    ttl_minutes: i64,
}

impl JwtHandler {
    pub fn new(secret: String, ttl_minutes: i64) -> Self {
        Self {
            secret,
            ttl_minutes,
        }
    }

    /// Issue a token for a subject, expiring `ttl_minutes` from now.
    pub fn issue(&self, subject: &str) -> Result<String> {
        let expiration = Utc::now()
            .checked_add_signed(chrono::Duration::minutes(self.ttl_minutes))
            .context("Invalid expiry timestamp")?
            .timestamp() as usize;

        let claims = Claims {
            sub: subject.to_string(),
            exp: expiration,
        };

        debug!("Issuing token for {}, ttl {}m", subject, self.ttl_minutes);

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .context("Failed to sign token")
    }

    /// Validate a token: recompute the signature, then check expiry.
    /// Zero leeway, so the expiry instant is an exact boundary.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::default();
        validation.leeway = 0;

        match decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        ) {
            Ok(data) => Ok(data.claims),
            Err(e) if matches!(e.kind(), ErrorKind::ExpiredSignature) => Err(TokenError::Expired),
            Err(_) => Err(TokenError::Invalid),
        }
    }
}
