//! Request/response types for auth endpoints.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Authorization scope of an account.
#[derive(ToSchema, Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    User,
    Admin,
}

impl Role {
    /// Parse the database representation; unknown values fall back to `User`
    /// so a bad row can never grant admin scope.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value {
            "Admin" => Self::Admin,
            _ => Self::User,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Admin => "Admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Public projection of an account: no credential, no ephemeral fields.
#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct UserSummary {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: Role,
    pub is_verified: bool,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub password: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct SignupResponse {
    pub message: String,
    pub user: UserSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dev_otp: Option<String>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct VerifyEmailRequest {
    pub email: String,
    pub otp: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ResendOtpRequest {
    pub email: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ResendOtpResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dev_otp: Option<String>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct SigninRequest {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub password: String,
}

/// Account summary plus a fresh bearer token.
#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct SessionResponse {
    pub message: String,
    pub user: UserSummary,
    pub token: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ForgotPasswordResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dev_reset_token: Option<String>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ResetPasswordRequest {
    pub password: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct MessageResponse {
    pub message: String,
}
