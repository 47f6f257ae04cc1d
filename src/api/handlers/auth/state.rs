//! Auth state and configuration.

use std::sync::Arc;

use crate::api::notify::Notifiers;

use super::{hasher::Hasher, token::TokenCodec};

const DEFAULT_OTP_TTL_SECONDS: i64 = 15 * 60;
const DEFAULT_RESET_TTL_SECONDS: i64 = 60 * 60;
const DEFAULT_SESSION_TTL_SECONDS: i64 = 7 * 24 * 60 * 60;

#[derive(Clone, Debug)]
pub struct AuthConfig {
    frontend_base_url: String,
    otp_ttl_seconds: i64,
    reset_ttl_seconds: i64,
    session_ttl_seconds: i64,
    dev_mode: bool,
}

impl AuthConfig {
    #[must_use]
    pub fn new(frontend_base_url: String) -> Self {
        Self {
            frontend_base_url,
            otp_ttl_seconds: DEFAULT_OTP_TTL_SECONDS,
            reset_ttl_seconds: DEFAULT_RESET_TTL_SECONDS,
            session_ttl_seconds: DEFAULT_SESSION_TTL_SECONDS,
            dev_mode: false,
        }
    }

    #[must_use]
    pub fn with_otp_ttl_seconds(mut self, seconds: i64) -> Self {
        self.otp_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_reset_ttl_seconds(mut self, seconds: i64) -> Self {
        self.reset_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_session_ttl_seconds(mut self, seconds: i64) -> Self {
        self.session_ttl_seconds = seconds;
        self
    }

    /// Dev mode echoes OTPs and reset secrets back in responses so the flow
    /// can be exercised without an email/SMS provider. Never enable it on a
    /// deployment reachable by real users.
    #[must_use]
    pub fn with_dev_mode(mut self, dev_mode: bool) -> Self {
        self.dev_mode = dev_mode;
        self
    }

    pub(crate) fn frontend_base_url(&self) -> &str {
        &self.frontend_base_url
    }

    #[must_use]
    pub fn otp_ttl_seconds(&self) -> i64 {
        self.otp_ttl_seconds
    }

    #[must_use]
    pub fn reset_ttl_seconds(&self) -> i64 {
        self.reset_ttl_seconds
    }

    #[must_use]
    pub fn session_ttl_seconds(&self) -> i64 {
        self.session_ttl_seconds
    }

    #[must_use]
    pub fn dev_mode(&self) -> bool {
        self.dev_mode
    }
}

pub struct AuthState {
    config: AuthConfig,
    hasher: Hasher,
    codec: TokenCodec,
    notifiers: Notifiers,
}

impl AuthState {
    #[must_use]
    pub fn new(config: AuthConfig, hasher: Hasher, codec: TokenCodec, notifiers: Notifiers) -> Self {
        Self {
            config,
            hasher,
            codec,
            notifiers,
        }
    }

    /// Wire up the state from config plus the signing secret, with log-only
    /// notifiers. The server action uses this; tests swap in recording
    /// notifiers via `new`.
    #[must_use]
    pub fn from_config(config: AuthConfig, token_secret: &[u8]) -> Arc<Self> {
        let codec = TokenCodec::new(token_secret, config.session_ttl_seconds());
        Arc::new(Self::new(
            config,
            Hasher::default(),
            codec,
            Notifiers::log_only(),
        ))
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    pub(crate) fn hasher(&self) -> &Hasher {
        &self.hasher
    }

    pub(crate) fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    pub(super) fn notifiers(&self) -> &Notifiers {
        &self.notifiers
    }
}
