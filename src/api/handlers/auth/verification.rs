//! Email verification endpoints: submit an OTP, or ask for a fresh one.

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use chrono::Utc;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::info;

use super::error::AuthError;
use super::otp::{self, OtpError};
use super::state::AuthState;
use super::storage::{lookup_by_email, mark_verified, store_otp};
use super::types::{ResendOtpRequest, ResendOtpResponse, SessionResponse, VerifyEmailRequest};
use super::utils::normalize_email;

/// Verify the submitted OTP, activate the account, and open a session.
#[utoipa::path(
    post,
    path = "/auth/verify-email",
    request_body = VerifyEmailRequest,
    responses(
        (status = 200, description = "Account verified", body = SessionResponse),
        (status = 400, description = "OTP expired, absent, or wrong"),
        (status = 404, description = "Unknown email")
    ),
    tag = "auth"
)]
pub async fn verify_email(
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<VerifyEmailRequest>>,
) -> Result<impl IntoResponse, AuthError> {
    let Some(Json(request)) = payload else {
        return Err(AuthError::validation("Missing payload"));
    };

    let email = normalize_email(&request.email);
    let mut user = lookup_by_email(&pool, &email)
        .await?
        .ok_or_else(|| AuthError::not_found("User not found"))?;

    // Exact compare, no normalization: a padded or otherwise altered code is
    // a mismatch.
    otp::verify(
        &request.otp,
        user.email_otp.as_deref(),
        user.email_otp_expires_at,
        Utc::now(),
    )
    .map_err(|err| match err {
        OtpError::Expired => AuthError::OtpExpired,
        OtpError::Mismatch => AuthError::OtpMismatch,
    })?;

    // Verification succeeded: flip the account and clear the code so it is
    // single-use.
    mark_verified(&pool, user.id).await?;
    user.is_verified = true;
    user.email_otp = None;
    user.email_otp_expires_at = None;

    let token = auth_state.codec().issue(user.id, user.role)?;

    info!(user_id = %user.id, "account verified");
    auth_state.notifiers().welcome(&user.name, &user.email);

    Ok((
        StatusCode::OK,
        Json(SessionResponse {
            message: "Email verified".to_string(),
            user: user.summary(),
            token,
        }),
    ))
}

/// Replace the pending OTP and redeliver it. Concurrent requests race and the
/// last stored code wins; only that one verifies.
#[utoipa::path(
    post,
    path = "/auth/resend-otp",
    request_body = ResendOtpRequest,
    responses(
        (status = 200, description = "Fresh OTP sent", body = ResendOtpResponse),
        (status = 400, description = "Already verified"),
        (status = 404, description = "Unknown email")
    ),
    tag = "auth"
)]
pub async fn resend_otp(
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<ResendOtpRequest>>,
) -> Result<impl IntoResponse, AuthError> {
    let Some(Json(request)) = payload else {
        return Err(AuthError::validation("Missing payload"));
    };

    let email = normalize_email(&request.email);
    let user = lookup_by_email(&pool, &email)
        .await?
        .ok_or_else(|| AuthError::not_found("User not found"))?;

    if user.is_verified {
        return Err(AuthError::validation("Email already verified"));
    }

    let issued = otp::issue(auth_state.config().otp_ttl_seconds());
    store_otp(&pool, user.id, &issued.code, issued.expires_at).await?;

    auth_state.notifiers().verification_otp(&email, &issued.code);
    if let Some(phone) = user.phone.as_deref() {
        auth_state.notifiers().otp_sms(phone, &issued.code);
    }

    Ok((
        StatusCode::OK,
        Json(ResendOtpResponse {
            message: "A new OTP has been sent".to_string(),
            dev_otp: auth_state.config().dev_mode().then(|| issued.code.clone()),
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::super::state::{AuthConfig, AuthState};
    use super::{resend_otp, verify_email};
    use anyhow::Result;
    use axum::extract::Extension;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use sqlx::postgres::PgPoolOptions;
    use std::sync::Arc;

    fn auth_state() -> Arc<AuthState> {
        let config = AuthConfig::new("http://localhost:5173".to_string());
        AuthState::from_config(config, b"test-secret")
    }

    #[tokio::test]
    async fn verify_email_missing_payload() -> Result<()> {
        let pool = PgPoolOptions::new().connect_lazy("postgres://postgres@localhost/postgres")?;
        let response = verify_email(Extension(pool), Extension(auth_state()), None)
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[tokio::test]
    async fn resend_otp_missing_payload() -> Result<()> {
        let pool = PgPoolOptions::new().connect_lazy("postgres://postgres@localhost/postgres")?;
        let response = resend_otp(Extension(pool), Extension(auth_state()), None)
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        Ok(())
    }
}
