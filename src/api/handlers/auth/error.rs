//! Error taxonomy for the account lifecycle.
//!
//! Lifecycle operations return typed variants; this module is the single
//! place where they are translated to HTTP statuses, keeping the handlers
//! transport-thin. Internal faults are logged and surfaced as an opaque 500
//! with no detail leaked to the caller.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    // Covers both "no such account" and "wrong password" so responses cannot
    // be used to probe which accounts exist.
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Email not verified")]
    NotVerified,

    #[error("Not authorized, token missing or invalid")]
    Unauthenticated,

    #[error("Admin access only")]
    Forbidden,

    #[error("{0}")]
    NotFound(String),

    #[error("OTP expired or not set")]
    OtpExpired,

    #[error("Invalid OTP")]
    OtpMismatch,

    #[error("Invalid or expired reset token")]
    InvalidOrExpiredToken,

    #[error("Server error")]
    Internal(#[from] anyhow::Error),
}

impl AuthError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_)
            | Self::OtpExpired
            | Self::OtpMismatch
            | Self::InvalidOrExpiredToken => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::InvalidCredentials | Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::NotVerified | Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status();
        if let Self::Internal(err) = &self {
            // Full fault goes to the log; the caller only sees "Server error".
            error!("Internal error: {err:#}");
        }
        (status, Json(json!({ "message": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_match_taxonomy() {
        assert_eq!(
            AuthError::validation("Missing payload").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AuthError::conflict("Email already in use").status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AuthError::InvalidCredentials.status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(AuthError::NotVerified.status(), StatusCode::FORBIDDEN);
        assert_eq!(AuthError::Unauthenticated.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::Forbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            AuthError::not_found("User not found").status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(AuthError::OtpExpired.status(), StatusCode::BAD_REQUEST);
        assert_eq!(AuthError::OtpMismatch.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AuthError::InvalidOrExpiredToken.status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AuthError::Internal(anyhow::anyhow!("boom")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn internal_error_message_is_opaque() {
        let err = AuthError::Internal(anyhow::anyhow!("connection refused to 10.0.0.3"));
        assert_eq!(err.to_string(), "Server error");
    }

    #[test]
    fn invalid_credentials_message_is_uniform() {
        // Same text for unknown account and wrong password.
        assert_eq!(
            AuthError::InvalidCredentials.to_string(),
            "Invalid credentials"
        );
    }
}
