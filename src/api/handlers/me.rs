//! Current-user endpoint.

use axum::{
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use sqlx::PgPool;
use std::sync::Arc;

use super::auth::principal::require_auth;
use super::auth::storage::lookup_by_id;
use super::auth::types::UserSummary;
use super::auth::{AuthError, AuthState};

/// Return the authenticated account's public profile.
#[utoipa::path(
    get,
    path = "/auth/me",
    responses(
        (status = 200, description = "Authenticated user profile", body = UserSummary),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 404, description = "Account no longer exists")
    ),
    tag = "auth"
)]
pub async fn get_me(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
) -> Result<impl IntoResponse, AuthError> {
    let principal = require_auth(&headers, &auth_state)?;

    let user = lookup_by_id(&pool, principal.user_id)
        .await?
        .ok_or_else(|| AuthError::not_found("User not found"))?;

    Ok((StatusCode::OK, Json(user.summary())))
}

#[cfg(test)]
mod tests {
    use super::super::auth::{AuthConfig, AuthState};
    use super::get_me;
    use anyhow::Result;
    use axum::extract::Extension;
    use axum::http::{HeaderMap, StatusCode};
    use axum::response::IntoResponse;
    use sqlx::postgres::PgPoolOptions;
    use std::sync::Arc;

    fn auth_state() -> Arc<AuthState> {
        let config = AuthConfig::new("http://localhost:5173".to_string());
        AuthState::from_config(config, b"test-secret")
    }

    #[tokio::test]
    async fn get_me_requires_bearer_token() -> Result<()> {
        let pool = PgPoolOptions::new().connect_lazy("postgres://postgres@localhost/postgres")?;
        let response = get_me(HeaderMap::new(), Extension(pool), Extension(auth_state()))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        Ok(())
    }
}
