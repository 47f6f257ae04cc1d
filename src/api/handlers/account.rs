//! Authenticated account self-service.
//!
//! 1) Authenticate via bearer token.
//! 2) Resolve the current account from the database.
//! 3) Apply allow-listed updates or the credential change.

use axum::{
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;

use super::auth::principal::require_auth;
use super::auth::storage::{lookup_by_id, update_password, update_profile};
use super::auth::types::UserSummary;
use super::auth::{AuthError, AuthState};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProfileResponse {
    pub message: String,
    pub user: UserSummary,
}

/// Return the caller's profile, same projection as `/auth/me`.
#[utoipa::path(
    get,
    path = "/account/profile",
    responses(
        (status = 200, description = "Account profile", body = UserSummary),
        (status = 401, description = "Missing or invalid bearer token")
    ),
    tag = "account"
)]
pub async fn get_profile(
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

/// Update name and/or phone. Email, role and verification state are not
/// writable here.
#[utoipa::path(
    patch,
    path = "/account/profile",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = ProfileResponse),
        (status = 400, description = "No updates provided"),
        (status = 401, description = "Missing or invalid bearer token")
    ),
    tag = "account"
)]
pub async fn patch_profile(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<UpdateProfileRequest>>,
) -> Result<impl IntoResponse, AuthError> {
    let principal = require_auth(&headers, &auth_state)?;

    let Some(Json(request)) = payload else {
        return Err(AuthError::validation("Missing payload"));
    };

    let name = normalize_optional(request.name);
    let phone = normalize_optional(request.phone);
    if name.is_none() && phone.is_none() {
        return Err(AuthError::validation("No updates provided"));
    }

    let user = update_profile(&pool, principal.user_id, name.as_deref(), phone.as_deref())
        .await?
        .ok_or_else(|| AuthError::not_found("User not found"))?;

    Ok((
        StatusCode::OK,
        Json(ProfileResponse {
            message: "Profile updated".to_string(),
            user: user.summary(),
        }),
    ))
}

/// Change the password after checking the current one. Mismatch is a 401, not
/// a 400: the caller has a valid session but failed re-authentication.
#[utoipa::path(
    patch,
    path = "/account/change-password",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed"),
        (status = 400, description = "Missing fields"),
        (status = 401, description = "Current password mismatch or invalid token")
    ),
    tag = "account"
)]
pub async fn change_password(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<ChangePasswordRequest>>,
) -> Result<impl IntoResponse, AuthError> {
    let principal = require_auth(&headers, &auth_state)?;

    let Some(Json(request)) = payload else {
        return Err(AuthError::validation("Missing payload"));
    };
    if request.current_password.is_empty() || request.new_password.is_empty() {
        return Err(AuthError::validation(
            "Current and new password are required",
        ));
    }

    let user = lookup_by_id(&pool, principal.user_id)
        .await?
        .ok_or_else(|| AuthError::not_found("User not found"))?;

    if !auth_state
        .hasher()
        .verify(&request.current_password, &user.password_hash)
    {
        return Err(AuthError::InvalidCredentials);
    }

    let password_hash = auth_state.hasher().hash(&request.new_password)?;
    update_password(&pool, user.id, &password_hash).await?;

    info!(user_id = %user.id, "password changed");

    Ok((
        StatusCode::OK,
        Json(serde_json::json!({ "message": "Password changed" })),
    ))
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
