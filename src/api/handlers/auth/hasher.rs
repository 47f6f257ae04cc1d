//! Password hashing with bcrypt.

use anyhow::{Context, Result};

/// Default bcrypt cost factor, matching the original deployment.
const DEFAULT_COST: u32 = 10;

/// One-way credential hasher.
///
/// Hashing is invoked explicitly at the three call sites that persist a new
/// plaintext credential (signup, change-password, reset-password). There is
/// no save-hook magic: a digest is never re-hashed because the caller only
/// hashes values it knows to be plaintext.
#[derive(Clone, Copy, Debug)]
pub struct Hasher {
    cost: u32,
}

impl Hasher {
    #[must_use]
    pub fn new() -> Self {
        Self { cost: DEFAULT_COST }
    }

    #[must_use]
    pub fn with_cost(mut self, cost: u32) -> Self {
        self.cost = cost;
        self
    }

    /// Hash a plaintext password with a random per-password salt.
    ///
    /// # Errors
    ///
    /// Returns an error if bcrypt fails (out of memory, invalid cost).
    pub fn hash(&self, plaintext: &str) -> Result<String> {
        bcrypt::hash(plaintext, self.cost).context("failed to hash password")
    }

    /// Verify a plaintext password against a stored digest.
    ///
    /// A malformed digest is treated as a non-match rather than an error so a
    /// corrupt row cannot take down the sign-in path.
    #[must_use]
    pub fn verify(&self, plaintext: &str, digest: &str) -> bool {
        bcrypt::verify(plaintext, digest).unwrap_or(false)
    }
}

impl Default for Hasher {
    fn default() -> Self {
        Self::new()
    }
}
