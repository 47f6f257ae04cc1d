//! One-time-passcode issuing and verification.

use chrono::{DateTime, Duration, Utc};
use rand::{rngs::OsRng, Rng};

/// A freshly issued OTP and the instant it stops being valid.
#[derive(Clone, Debug)]
pub struct OtpIssued {
    pub code: String,
    pub expires_at: DateTime<Utc>,
}

/// Why a submitted OTP was rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OtpError {
    /// No code on file, or past the stored expiry instant.
    Expired,
    /// Code on file but the submitted value differs.
    Mismatch,
}

/// Issue a uniformly distributed 6-digit code with the given lifetime.
///
/// Leading zeros are preserved: the full `"000000"`-`"999999"` range is used,
/// not the 100000+ subset.
#[must_use]
pub fn issue(ttl_seconds: i64) -> OtpIssued {
    let code = format!("{:06}", OsRng.gen_range(0..=999_999u32));
    OtpIssued {
        code,
        expires_at: Utc::now() + Duration::seconds(ttl_seconds),
    }
}

/// Check a submitted code against the stored one.
///
/// Verification itself is side-effect free; on success the caller must clear
/// the stored fields so the code is single-use.
///
/// # Errors
///
/// `Expired` when nothing is on file or `now` is at/past the stored expiry,
/// `Mismatch` when the code differs (exact string compare, no normalization).
pub fn verify(
    submitted: &str,
    stored_code: Option<&str>,
    stored_expiry: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Result<(), OtpError> {
    let (code, expires_at) = match (stored_code, stored_expiry) {
        (Some(code), Some(expires_at)) => (code, expires_at),
        _ => return Err(OtpError::Expired),
    };

    if now >= expires_at {
        return Err(OtpError::Expired);
    }

    if submitted != code {
        return Err(OtpError::Mismatch);
    }

    Ok(())
}
