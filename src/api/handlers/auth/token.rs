//! Signed session bearer tokens.
//!
//! Tokens are stateless: the payload carries the user id, role and expiry,
//! signed with a server-held secret, so protected requests are verifiable
//! without a session table lookup.

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::types::Role;

/// Claims embedded in every session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: Uuid,
    /// Role at issuance time.
    pub role: Role,
    /// Issued at (unix seconds).
    pub iat: i64,
    /// Expiry (unix seconds).
    pub exp: i64,
}

/// Why a presented token was rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenError {
    /// Past the embedded expiry.
    Expired,
    /// Bad signature, malformed structure, or wrong algorithm.
    Invalid,
}

/// Issues and verifies session tokens with a shared `HS256` secret.
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_seconds: i64,
}

impl TokenCodec {
    #[must_use]
    pub fn new(secret: &[u8], ttl_seconds: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl_seconds,
        }
    }

    #[must_use]
    pub fn ttl_seconds(&self) -> i64 {
        self.ttl_seconds
    }

    /// Issue a signed token for the given identity.
    ///
    /// # Errors
    ///
    /// Returns an error if claim serialization or signing fails.
    pub fn issue(&self, user_id: Uuid, role: Role) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id,
            role,
            iat: now.timestamp(),
            exp: (now + Duration::seconds(self.ttl_seconds)).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding).context("failed to sign session token")
    }

    /// Verify signature and expiry, returning the embedded claims.
    ///
    /// # Errors
    ///
    /// `Expired` past the embedded expiry, `Invalid` for everything else
    /// (bad signature, garbage input, missing claims).
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|err| match err.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> TokenCodec {
        TokenCodec::new(b"test-secret", 7 * 24 * 60 * 60)
    }

    #[test]
    fn issue_then_verify_round_trips_identity_and_role() -> Result<()> {
        let codec = codec();
        let user_id = Uuid::new_v4();
        let token = codec.issue(user_id, Role::Admin)?;

        let claims = codec
            .verify(&token)
            .map_err(|err| anyhow::anyhow!("verify failed: {err:?}"))?;
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.role, Role::Admin);
        assert!(claims.exp > claims.iat);
        Ok(())
    }

    #[test]
    fn verify_rejects_wrong_secret() -> Result<()> {
        let token = codec().issue(Uuid::new_v4(), Role::User)?;
        let other = TokenCodec::new(b"different-secret", 3600);
        assert_eq!(other.verify(&token), Err(TokenError::Invalid));
        Ok(())
    }

    #[test]
    fn verify_rejects_tampered_token() -> Result<()> {
        let codec = codec();
        let mut token = codec.issue(Uuid::new_v4(), Role::User)?;
        // Flip a character in the signature segment.
        let tail = token.pop().map(|c| if c == 'A' { 'B' } else { 'A' });
        token.extend(tail);
        assert_eq!(codec.verify(&token), Err(TokenError::Invalid));
        Ok(())
    }

    #[test]
    fn verify_rejects_expired_token() -> Result<()> {
        // Negative TTL produces an already-expired token. jsonwebtoken's
        // default leeway is 60s, so go well past it.
        let codec = TokenCodec::new(b"test-secret", -120);
        let token = codec.issue(Uuid::new_v4(), Role::User)?;
        assert_eq!(codec.verify(&token), Err(TokenError::Expired));
        Ok(())
    }

    #[test]
    fn verify_rejects_garbage() {
        assert_eq!(codec().verify("not-a-token"), Err(TokenError::Invalid));
        assert_eq!(codec().verify(""), Err(TokenError::Invalid));
    }
}
