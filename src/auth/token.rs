use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Represents the claims encoded within a credential token.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    /// Identity id of the subject. Tokens minted by older clients carry it
    /// as `id` or `userId`.
    #[serde(alias = "id", alias = "userId")]
    pub sub: i32,
    /// Expiration timestamp (seconds since epoch).
    pub exp: usize,
    /// Issued-at timestamp (seconds since epoch).
    #[serde(default)]
    pub iat: usize,
}

/// Issues and verifies HS256 tokens against a shared secret.
///
/// Verification classifies failures:
/// - an `exp` in the past yields `TokenExpired`, whether or not the
///   signature is valid,
/// - a bad signature, wrong algorithm or undecodable token yields
///   `TokenMalformed`,
/// - anything else yields `AuthFailure`.
///
/// HMAC comparison inside `jsonwebtoken` is constant-time. No clock-skew
/// leeway is applied unless one is configured.
#[derive(Clone)]
pub struct TokenVerifier {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
    leeway_secs: u64,
}

impl TokenVerifier {
    pub fn new(secret: &str, ttl: Duration, leeway_secs: u64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
            leeway_secs,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Signs a token for `user_id` that expires after the configured TTL.
    pub fn issue(&self, user_id: i32) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id,
            exp: (now + self.ttl).timestamp() as usize,
            iat: now.timestamp() as usize,
        };
        self.sign(&claims)
    }

    pub fn sign(&self, claims: &Claims) -> Result<String, AppError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| AppError::AuthFailure(format!("failed to sign token: {}", e)))
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        // Expiry is judged from the structurally decoded claim first so that
        // an expired token is reported as such even with a bad signature.
        let mut structural = Validation::new(Algorithm::HS256);
        structural.insecure_disable_signature_validation();
        structural.validate_exp = false;
        let unverified = decode::<Claims>(token, &self.decoding, &structural)?.claims;

        if self.is_expired(unverified.exp) {
            return Err(AppError::TokenExpired);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = self.leeway_secs;
        let verified = decode::<Claims>(token, &self.decoding, &validation)?;
        Ok(verified.claims)
    }

    fn is_expired(&self, exp: usize) -> bool {
        let now = Utc::now().timestamp().max(0) as u64;
        (exp as u64).saturating_add(self.leeway_secs) < now
    }
}
