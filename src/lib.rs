//! # Brew Haven Café API
//!
//! Backend for the Brew Haven Café web application. This crate owns the
//! account and credential lifecycle: signup, one-time-passcode (OTP) email
//! verification, sign-in with signed bearer tokens, and password reset.
//!
//! ## Credential handling
//!
//! - Passwords are hashed with bcrypt (cost 10) before they are persisted;
//!   plaintext never reaches the database.
//! - OTPs are 6-digit codes valid for 15 minutes; a resend overwrites the
//!   previous code (last write wins, by contract).
//! - Password-reset secrets are 32 random bytes handed to the user as hex;
//!   only their SHA-256 digest is stored, valid for 1 hour and single-use.
//! - Sessions are stateless `HS256` bearer tokens carrying the user id and
//!   role, verified without a database lookup.
//!
//! Sign-in failures are deliberately uniform ("Invalid credentials") whether
//! the account is missing or the password is wrong, and forgot-password
//! answers identically for known and unknown emails, so callers cannot probe
//! which accounts exist.

pub mod api;
pub mod cli;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
