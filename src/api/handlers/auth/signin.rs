//! Sign-in with email or phone plus password.

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::info;

use super::error::AuthError;
use super::state::AuthState;
use super::storage::{lookup_by_email, lookup_by_phone, UserRow};
use super::types::{SessionResponse, SigninRequest};
use super::utils::normalize_email;

/// Authenticate and issue a session token.
///
/// Unknown account and wrong password produce the same 401 body, so the
/// endpoint cannot be used to enumerate accounts.
#[utoipa::path(
    post,
    path = "/auth/signin",
    request_body = SigninRequest,
    responses(
        (status = 200, description = "Signed in", body = SessionResponse),
        (status = 400, description = "Missing identifier or password"),
        (status = 401, description = "Invalid credentials"),
        (status = 403, description = "Email not verified")
    ),
    tag = "auth"
)]
pub async fn signin(
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<SigninRequest>>,
) -> Result<impl IntoResponse, AuthError> {
    let Some(Json(request)) = payload else {
        return Err(AuthError::validation("Missing payload"));
    };

    if request.password.is_empty() {
        return Err(AuthError::validation("Password is required"));
    }

    let user = find_account(&pool, request.email.as_deref(), request.phone.as_deref()).await?;
    let user = user.ok_or(AuthError::InvalidCredentials)?;

    if !auth_state.hasher().verify(&request.password, &user.password_hash) {
        return Err(AuthError::InvalidCredentials);
    }

    if !user.is_verified {
        return Err(AuthError::NotVerified);
    }

    let token = auth_state.codec().issue(user.id, user.role)?;

    info!(user_id = %user.id, "signed in");
    auth_state.notifiers().signin_alert(&user.name, &user.email);

    Ok((
        StatusCode::OK,
        Json(SessionResponse {
            message: "Signed in".to_string(),
            user: user.summary(),
            token,
        }),
    ))
}

/// Resolve the identifier: email takes precedence when both are present.
async fn find_account(
    pool: &PgPool,
    email: Option<&str>,
    phone: Option<&str>,
) -> Result<Option<UserRow>, AuthError> {
    if let Some(email) = email.map(normalize_email).filter(|email| !email.is_empty()) {
        return Ok(lookup_by_email(pool, &email).await?);
    }
    if let Some(phone) = phone.map(str::trim).filter(|phone| !phone.is_empty()) {
        return Ok(lookup_by_phone(pool, phone).await?);
    }
    Err(AuthError::validation("Email or phone is required"))
}

#[cfg(test)]
mod tests {
    use super::super::state::{AuthConfig, AuthState};
    use super::{signin, SigninRequest};
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
    async fn signin_missing_payload() -> Result<()> {
        let pool = PgPoolOptions::new().connect_lazy("postgres://postgres@localhost/postgres")?;
        let response = signin(Extension(pool), Extension(auth_state()), None)
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[tokio::test]
    async fn signin_requires_an_identifier() -> Result<()> {
        let pool = PgPoolOptions::new().connect_lazy("postgres://postgres@localhost/postgres")?;
        let response = signin(
            Extension(pool),
            Extension(auth_state()),
            Some(Json(SigninRequest {
                email: None,
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
    async fn signin_requires_a_password() -> Result<()> {
        let pool = PgPoolOptions::new().connect_lazy("postgres://postgres@localhost/postgres")?;
        let response = signin(
            Extension(pool),
            Extension(auth_state()),
            Some(Json(SigninRequest {
                email: Some("ana@example.com".to_string()),
                phone: None,
                password: String::new(),
            })),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        Ok(())
    }
}
