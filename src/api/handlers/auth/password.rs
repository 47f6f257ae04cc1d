//! Password reset: request a link, then redeem it.

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::info;

use super::error::AuthError;
use super::reset;
use super::state::AuthState;
use super::storage::{
    consume_reset_digest, lookup_by_email, reset_digest_active, store_reset_digest,
};
use super::types::{ForgotPasswordRequest, ForgotPasswordResponse, MessageResponse, ResetPasswordRequest};
use super::utils::{build_reset_url, normalize_email};

const FORGOT_PASSWORD_MESSAGE: &str = "If that email exists, a reset link has been sent";

/// Start a reset. The response body is identical whether or not the account
/// exists (or the email even parses), so the endpoint leaks nothing.
#[utoipa::path(
    post,
    path = "/auth/forgot-password",
    request_body = ForgotPasswordRequest,
    responses(
        (status = 200, description = "Uniform acknowledgement", body = ForgotPasswordResponse),
        (status = 400, description = "Missing payload")
    ),
    tag = "auth"
)]
pub async fn forgot_password(
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<ForgotPasswordRequest>>,
) -> Result<impl IntoResponse, AuthError> {
    let Some(Json(request)) = payload else {
        return Err(AuthError::validation("Missing payload"));
    };

    let email = normalize_email(&request.email);
    let mut dev_reset_token = None;

    if let Some(user) = lookup_by_email(&pool, &email).await? {
        let issued = reset::issue(auth_state.config().reset_ttl_seconds())?;
        store_reset_digest(&pool, user.id, &issued.digest, issued.expires_at).await?;

        let reset_url = build_reset_url(auth_state.config().frontend_base_url(), &issued.secret);
        auth_state.notifiers().reset_link(&user.email, &reset_url);

        info!(user_id = %user.id, "reset link issued");
        dev_reset_token = auth_state.config().dev_mode().then(|| issued.secret.clone());
    }

    Ok((
        StatusCode::OK,
        Json(ForgotPasswordResponse {
            message: FORGOT_PASSWORD_MESSAGE.to_string(),
            dev_reset_token,
        }),
    ))
}

/// Redeem a reset secret and set a new password.
///
/// Lookup, expiry check, credential swap, and clearing the reset fields happen
/// in one statement, so the secret is single-use even under concurrent
/// redemption.
#[utoipa::path(
    post,
    path = "/auth/reset-password/{token}",
    request_body = ResetPasswordRequest,
    params(("token" = String, Path, description = "Reset secret from the emailed link")),
    responses(
        (status = 200, description = "Password reset", body = MessageResponse),
        (status = 400, description = "Missing password, or invalid/expired token")
    ),
    tag = "auth"
)]
pub async fn reset_password(
    Path(token): Path<String>,
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<ResetPasswordRequest>>,
) -> Result<impl IntoResponse, AuthError> {
    let Some(Json(request)) = payload else {
        return Err(AuthError::validation("Missing payload"));
    };

    if request.password.is_empty() {
        return Err(AuthError::validation("Password is required"));
    }

    // Check the token before hashing, so invalid or expired requests do not
    // pay the bcrypt cost.
    let digest = reset::digest(token.trim());
    if !reset_digest_active(&pool, &digest).await? {
        return Err(AuthError::InvalidOrExpiredToken);
    }

    let password_hash = auth_state.hasher().hash(&request.password)?;

    // The digest may have been consumed or expired between the check and
    // here; the single-statement redemption still decides.
    let user = consume_reset_digest(&pool, &digest, &password_hash)
        .await?
        .ok_or(AuthError::InvalidOrExpiredToken)?;

    info!(user_id = %user.id, "password reset");
    auth_state
        .notifiers()
        .reset_confirmation(&user.name, &user.email);

    Ok((
        StatusCode::OK,
        Json(MessageResponse {
            message: "Password has been reset".to_string(),
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::super::state::{AuthConfig, AuthState};
    use super::{forgot_password, reset_password, ResetPasswordRequest};
    use anyhow::Result;
    use axum::extract::{Extension, Path};
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
    async fn forgot_password_missing_payload() -> Result<()> {
        let pool = PgPoolOptions::new().connect_lazy("postgres://postgres@localhost/postgres")?;
        let response = forgot_password(Extension(pool), Extension(auth_state()), None)
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[tokio::test]
    async fn reset_password_missing_payload() -> Result<()> {
        let pool = PgPoolOptions::new().connect_lazy("postgres://postgres@localhost/postgres")?;
        let response = reset_password(
            Path("deadbeef".to_string()),
            Extension(pool),
            Extension(auth_state()),
            None,
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[tokio::test]
    async fn reset_password_requires_a_password() -> Result<()> {
        let pool = PgPoolOptions::new().connect_lazy("postgres://postgres@localhost/postgres")?;
        let response = reset_password(
            Path("deadbeef".to_string()),
            Extension(pool),
            Extension(auth_state()),
            Some(Json(ResetPasswordRequest {
                password: String::new(),
            })),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        Ok(())
    }
}
