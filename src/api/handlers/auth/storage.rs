//! Database helpers for account and credential state.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use tracing::Instrument;
use uuid::Uuid;

use super::types::{Role, UserSummary};
use super::utils::is_unique_violation;

const USER_COLUMNS: &str = "id, name, email, phone, password_hash, role, is_verified, \
                            email_otp, email_otp_expires_at";

/// One account row, including credential and ephemeral fields. Never
/// serialized directly; `summary()` is the public projection.
pub(crate) struct UserRow {
    pub(crate) id: Uuid,
    pub(crate) name: String,
    pub(crate) email: String,
    pub(crate) phone: Option<String>,
    pub(crate) password_hash: String,
    pub(crate) role: Role,
    pub(crate) is_verified: bool,
    pub(crate) email_otp: Option<String>,
    pub(crate) email_otp_expires_at: Option<DateTime<Utc>>,
}

impl UserRow {
    fn from_row(row: &sqlx::postgres::PgRow) -> Self {
        let role: String = row.get("role");
        Self {
            id: row.get("id"),
            name: row.get("name"),
            email: row.get("email"),
            phone: row.get("phone"),
            password_hash: row.get("password_hash"),
            role: Role::parse(&role),
            is_verified: row.get("is_verified"),
            email_otp: row.get("email_otp"),
            email_otp_expires_at: row.get("email_otp_expires_at"),
        }
    }

    pub(crate) fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id.to_string(),
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            role: self.role,
            is_verified: self.is_verified,
        }
    }
}

/// Outcome when attempting to create a new account.
#[derive(Debug)]
pub(super) enum SignupOutcome {
    Created(Box<UserRow>),
    Conflict,
}

impl std::fmt::Debug for UserRow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Credential and OTP fields stay out of logs.
        f.debug_struct("UserRow")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("role", &self.role)
            .field("is_verified", &self.is_verified)
            .finish_non_exhaustive()
    }
}

pub(super) async fn insert_user(
    pool: &PgPool,
    name: &str,
    email: &str,
    phone: Option<&str>,
    password_hash: &str,
    otp_code: &str,
    otp_expires_at: DateTime<Utc>,
) -> Result<SignupOutcome> {
    let query = r"
        INSERT INTO users
            (name, email, phone, password_hash, email_otp, email_otp_expires_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, name, email, phone, password_hash, role, is_verified,
                  email_otp, email_otp_expires_at
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(name)
        .bind(email)
        .bind(phone)
        .bind(password_hash)
        .bind(otp_code)
        .bind(otp_expires_at)
        .fetch_one(pool)
        .instrument(span)
        .await;

    match row {
        Ok(row) => Ok(SignupOutcome::Created(Box::new(UserRow::from_row(&row)))),
        Err(err) if is_unique_violation(&err) => Ok(SignupOutcome::Conflict),
        Err(err) => Err(err).context("failed to insert user"),
    }
}

pub(super) async fn lookup_by_email(pool: &PgPool, email: &str) -> Result<Option<UserRow>> {
    let query = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1 LIMIT 1");
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query.as_str()
    );
    let row = sqlx::query(&query)
        .bind(email)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to lookup user by email")?;
    Ok(row.map(|row| UserRow::from_row(&row)))
}

pub(super) async fn lookup_by_phone(pool: &PgPool, phone: &str) -> Result<Option<UserRow>> {
    let query = format!("SELECT {USER_COLUMNS} FROM users WHERE phone = $1 LIMIT 1");
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query.as_str()
    );
    let row = sqlx::query(&query)
        .bind(phone)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to lookup user by phone")?;
    Ok(row.map(|row| UserRow::from_row(&row)))
}

pub(crate) async fn lookup_by_id(pool: &PgPool, user_id: Uuid) -> Result<Option<UserRow>> {
    let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1 LIMIT 1");
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query.as_str()
    );
    let row = sqlx::query(&query)
        .bind(user_id)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to lookup user by id")?;
    Ok(row.map(|row| UserRow::from_row(&row)))
}

/// Flip an account to verified and clear the OTP fields in one statement, so
/// a verified account can never carry a pending code.
pub(super) async fn mark_verified(pool: &PgPool, user_id: Uuid) -> Result<()> {
    let query = r"
        UPDATE users
        SET is_verified = TRUE,
            email_otp = NULL,
            email_otp_expires_at = NULL,
            updated_at = NOW()
        WHERE id = $1
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );
    sqlx::query(query)
        .bind(user_id)
        .execute(pool)
        .instrument(span)
        .await
        .context("failed to mark user verified")?;
    Ok(())
}

/// Overwrite the stored OTP. Concurrent resends race here and the last write
/// wins, which is the accepted behavior.
pub(super) async fn store_otp(
    pool: &PgPool,
    user_id: Uuid,
    code: &str,
    expires_at: DateTime<Utc>,
) -> Result<()> {
    let query = r"
        UPDATE users
        SET email_otp = $2,
            email_otp_expires_at = $3,
            updated_at = NOW()
        WHERE id = $1
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );
    sqlx::query(query)
        .bind(user_id)
        .bind(code)
        .bind(expires_at)
        .execute(pool)
        .instrument(span)
        .await
        .context("failed to store otp")?;
    Ok(())
}

pub(super) async fn store_reset_digest(
    pool: &PgPool,
    user_id: Uuid,
    digest: &str,
    expires_at: DateTime<Utc>,
) -> Result<()> {
    let query = r"
        UPDATE users
        SET reset_token_hash = $2,
            reset_expires_at = $3,
            updated_at = NOW()
        WHERE id = $1
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );
    sqlx::query(query)
        .bind(user_id)
        .bind(digest)
        .bind(expires_at)
        .execute(pool)
        .instrument(span)
        .await
        .context("failed to store reset digest")?;
    Ok(())
}

/// Whether an unexpired reset digest is on file. Used to reject a bad token
/// before the new credential is hashed; redemption itself stays atomic in
/// `consume_reset_digest`.
pub(super) async fn reset_digest_active(pool: &PgPool, digest: &str) -> Result<bool> {
    let query = r"
        SELECT 1 FROM users
        WHERE reset_token_hash = $1
          AND reset_expires_at > NOW()
        LIMIT 1
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(digest)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to check reset digest")?;
    Ok(row.is_some())
}

/// Atomically redeem an unexpired reset digest: set the new credential and
/// clear the reset fields in the same statement, making the secret single-use.
/// Returns the updated row, or `None` when no unexpired digest matched.
pub(super) async fn consume_reset_digest(
    pool: &PgPool,
    digest: &str,
    new_password_hash: &str,
) -> Result<Option<UserRow>> {
    let query = r"
        UPDATE users
        SET password_hash = $2,
            reset_token_hash = NULL,
            reset_expires_at = NULL,
            updated_at = NOW()
        WHERE reset_token_hash = $1
          AND reset_expires_at > NOW()
        RETURNING id, name, email, phone, password_hash, role, is_verified,
                  email_otp, email_otp_expires_at
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(digest)
        .bind(new_password_hash)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to consume reset digest")?;
    Ok(row.map(|row| UserRow::from_row(&row)))
}

pub(crate) async fn update_password(
    pool: &PgPool,
    user_id: Uuid,
    password_hash: &str,
) -> Result<()> {
    let query = r"
        UPDATE users
        SET password_hash = $2,
            updated_at = NOW()
        WHERE id = $1
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );
    sqlx::query(query)
        .bind(user_id)
        .bind(password_hash)
        .execute(pool)
        .instrument(span)
        .await
        .context("failed to update password")?;
    Ok(())
}

/// Allow-list profile update: only name and phone are writable here.
pub(crate) async fn update_profile(
    pool: &PgPool,
    user_id: Uuid,
    name: Option<&str>,
    phone: Option<&str>,
) -> Result<Option<UserRow>> {
    let query = r"
        UPDATE users
        SET name = COALESCE($2, name),
            phone = COALESCE($3, phone),
            updated_at = NOW()
        WHERE id = $1
        RETURNING id, name, email, phone, password_hash, role, is_verified,
                  email_otp, email_otp_expires_at
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(user_id)
        .bind(name)
        .bind(phone)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to update profile")?;
    Ok(row.map(|row| UserRow::from_row(&row)))
}
