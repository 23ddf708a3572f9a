//! JWT token verification.
//!
//! Verification is the only cryptographic operation in this crate; token
//! issuance belongs to whoever signs the tokens. Tokens are HMAC-SHA256
//! signed, must carry an `exp` claim, and expiry is checked with zero leeway.

use std::fmt;

use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

/// Flat claim bag decoded from a verified token.
///
/// Beyond the registered `exp` field, claims are free-form key/value
/// assertions about the authenticated principal, looked up by key
/// (e.g. `user.id`, `user.code`, `user.name`, `roles`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimSet {
    /// Expiration time (Unix timestamp)
    pub exp: u64,
    #[serde(flatten)]
    data: serde_json::Map<String, serde_json::Value>,
}

impl ClaimSet {
    /// Look up a string claim by key. Non-string claim values yield `None`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(|value| value.as_str())
    }
}

/// Verifies bearer tokens against the configured secret.
///
/// Built once at filter construction; read-only afterwards, so it is shared
/// across concurrent requests without locking.
#[derive(Clone)]
pub struct TokenVerifier {
    decoding_key: DecodingKey,
}

impl TokenVerifier {
    /// Create a verifier with the given HMAC secret.
    pub fn new(secret: &[u8]) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret),
        }
    }

    /// Verify and decode a token.
    ///
    /// A malformed, tampered or expired token yields a [`VerifyError`];
    /// the caller decides how to respond.
    pub fn verify(&self, token: &str) -> Result<ClaimSet, VerifyError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let token_data = jsonwebtoken::decode::<ClaimSet>(token, &self.decoding_key, &validation)
            .map_err(VerifyError::Decode)?;

        Ok(token_data.claims)
    }
}

/// Errors that can occur during token verification.
#[derive(Debug)]
pub enum VerifyError {
    /// Token is malformed, expired, or carries an invalid signature
    Decode(jsonwebtoken::errors::Error),
}

impl fmt::Display for VerifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerifyError::Decode(e) => write!(f, "Failed to decode token: {}", e),
        }
    }
}

impl std::error::Error for VerifyError {}
