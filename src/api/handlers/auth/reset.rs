//! Password-reset secrets.
//!
//! The raw secret is only ever handed to the user (via the reset link); the
//! database stores its SHA-256 digest and an expiry. A database compromise
//! therefore exposes no usable reset secrets, mirroring how plaintext
//! passwords are never stored.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use rand::{rngs::OsRng, RngCore};
use sha2::{Digest, Sha256};

/// A freshly issued reset secret with its stored form.
#[derive(Clone, Debug)]
pub struct ResetIssued {
    /// Raw secret for the reset link; never persisted.
    pub secret: String,
    /// Hex SHA-256 of the secret; the only thing the database sees.
    pub digest: String,
    pub expires_at: DateTime<Utc>,
}

/// Issue a 32-byte random secret, hex encoded, with the given lifetime.
///
/// # Errors
///
/// Returns an error if the OS random source fails.
pub fn issue(ttl_seconds: i64) -> Result<ResetIssued> {
    let mut bytes = [0u8; 32];
    OsRng
        .try_fill_bytes(&mut bytes)
        .context("failed to generate reset secret")?;
    let secret = hex::encode(bytes);
    Ok(ResetIssued {
        digest: digest(&secret),
        secret,
        expires_at: Utc::now() + Duration::seconds(ttl_seconds),
    })
}

/// Digest a presented secret for lookup; matching happens in SQL against the
/// stored digest with an unexpired-only predicate.
#[must_use]
pub fn digest(secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    hex::encode(hasher.finalize())
}
