//! Account creation.

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::info;

use super::error::AuthError;
use super::otp;
use super::state::AuthState;
use super::storage::{insert_user, SignupOutcome};
use super::types::{SignupRequest, SignupResponse};
use super::utils::{normalize_email, valid_email};

/// Create an unverified account and deliver its first OTP.
#[utoipa::path(
    post,
    path = "/auth/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Account created, verification pending", body = SignupResponse),
        (status = 400, description = "Missing or invalid fields"),
        (status = 409, description = "Email already in use")
    ),
    tag = "auth"
)]
pub async fn signup(
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<SignupRequest>>,
) -> Result<impl IntoResponse, AuthError> {
    let Some(Json(request)) = payload else {
        return Err(AuthError::validation("Missing payload"));
    };

    let name = request.name.trim();
    let email = normalize_email(&request.email);
    if name.is_empty() || email.is_empty() || request.password.is_empty() {
        return Err(AuthError::validation("Name, email and password are required"));
    }
    if !valid_email(&email) {
        return Err(AuthError::validation("Invalid email"));
    }

    let phone = request
        .phone
        .as_deref()
        .map(str::trim)
        .filter(|phone| !phone.is_empty());

    let password_hash = auth_state.hasher().hash(&request.password)?;
    let issued = otp::issue(auth_state.config().otp_ttl_seconds());

    let user = match insert_user(
        &pool,
        name,
        &email,
        phone,
        &password_hash,
        &issued.code,
        issued.expires_at,
    )
    .await?
    {
        SignupOutcome::Created(user) => user,
        SignupOutcome::Conflict => return Err(AuthError::conflict("Email already in use")),
    };

    info!(user_id = %user.id, "account created, verification pending");

    // Best-effort delivery; the account exists regardless.
    auth_state.notifiers().verification_otp(&email, &issued.code);
    if let Some(phone) = phone {
        auth_state.notifiers().otp_sms(phone, &issued.code);
    }

    let response = SignupResponse {
        message: "Account created. Verify your email with the OTP we sent.".to_string(),
        user: user.summary(),
        dev_otp: auth_state.config().dev_mode().then(|| issued.code.clone()),
    };

    Ok((StatusCode::CREATED, Json(response)))
}

#[cfg(test)]
mod tests {
    use super::super::state::{AuthConfig, AuthState};
    use super::{signup, SignupRequest};
    use anyhow::Result;
    use axum::extract::Extension;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use axum::Json;
    use sqlx::postgres::PgPoolOptions;
    use std::sync::Arc;

    fn auth_state() -> Arc<AuthState> {
        let config = AuthConfig::new("http://localhost:5173".to_string());
        AuthState::from_config(config, b"test-secret")
    }

    #[tokio::test]
    async fn signup_missing_payload() -> Result<()> {
        let pool = PgPoolOptions::new().connect_lazy("postgres://postgres@localhost/postgres")?;
        let response = signup(Extension(pool), Extension(auth_state()), None)
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[tokio::test]
    async fn signup_rejects_blank_fields() -> Result<()> {
        let pool = PgPoolOptions::new().connect_lazy("postgres://postgres@localhost/postgres")?;
        let response = signup(
            Extension(pool),
            Extension(auth_state()),
            Some(Json(SignupRequest {
                name: "  ".to_string(),
                email: "ana@example.com".to_string(),
                phone: None,
                password: "pw123456".to_string(),
            })),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[tokio::test]
    async fn signup_rejects_invalid_email() -> Result<()> {
        let pool = PgPoolOptions::new().connect_lazy("postgres://postgres@localhost/postgres")?;
        let response = signup(
            Extension(pool),
            Extension(auth_state()),
            Some(Json(SignupRequest {
                name: "Ana".to_string(),
                email: "not-an-email".to_string(),
                phone: None,
                password: "pw123456".to_string(),
            })),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        Ok(())
    }
}
