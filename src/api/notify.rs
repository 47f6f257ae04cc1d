//! Best-effort notification channels (email and SMS).
//!
//! Every account-lifecycle transition that wants to tell the user something
//! builds a [`Notification`] and hands it to a channel. Delivery is strictly
//! best-effort: a failed send is logged and the transition that triggered it
//! is never aborted or rolled back. The account-state change is the
//! transaction of record, not the notification.
//!
//! The default channel for local dev is [`LogNotifier`], which logs the
//! payload and returns `Ok(())`. A real SMTP or SMS gateway implements
//! [`Notifier`] and is injected at server start.

use anyhow::Result;
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info};

/// Templates the café backend sends.
pub mod template {
    pub const VERIFY_OTP: &str = "verify_otp";
    pub const WELCOME: &str = "welcome";
    pub const SIGNIN_ALERT: &str = "signin_alert";
    pub const RESET_LINK: &str = "reset_link";
    pub const RESET_CONFIRMATION: &str = "reset_confirmation";
    pub const OTP_SMS: &str = "otp_sms";
}

#[derive(Clone, Debug)]
pub struct Notification {
    pub to: String,
    pub template: String,
    pub payload_json: String,
}

/// Delivery abstraction for a single outbound channel.
pub trait Notifier: Send + Sync {
    /// Deliver a message or return an error; callers treat errors as
    /// log-and-continue.
    fn send(&self, message: &Notification) -> Result<()>;
}

/// Local dev channel that logs the payload instead of delivering it.
#[derive(Clone, Debug)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn send(&self, message: &Notification) -> Result<()> {
        info!(
            to = %message.to,
            template = %message.template,
            payload = %message.payload_json,
            "notification send stub"
        );
        Ok(())
    }
}

/// The two channels the lifecycle uses, bundled for injection.
#[derive(Clone)]
pub struct Notifiers {
    email: Arc<dyn Notifier>,
    sms: Arc<dyn Notifier>,
}

impl Notifiers {
    #[must_use]
    pub fn new(email: Arc<dyn Notifier>, sms: Arc<dyn Notifier>) -> Self {
        Self { email, sms }
    }

    /// Log-only channels for local development and tests.
    #[must_use]
    pub fn log_only() -> Self {
        Self::new(Arc::new(LogNotifier), Arc::new(LogNotifier))
    }

    pub fn verification_otp(&self, email: &str, otp: &str) {
        self.send_email(
            email,
            template::VERIFY_OTP,
            json!({ "otp": otp }).to_string(),
        );
    }

    pub fn otp_sms(&self, phone: &str, otp: &str) {
        let message = Notification {
            to: phone.to_string(),
            template: template::OTP_SMS.to_string(),
            payload_json: json!({ "otp": otp }).to_string(),
        };
        if let Err(err) = self.sms.send(&message) {
            error!("Failed to send OTP SMS: {err}");
        }
    }

    pub fn welcome(&self, name: &str, email: &str) {
        self.send_email(
            email,
            template::WELCOME,
            json!({ "name": name }).to_string(),
        );
    }

    pub fn signin_alert(&self, name: &str, email: &str) {
        self.send_email(
            email,
            template::SIGNIN_ALERT,
            json!({ "name": name }).to_string(),
        );
    }

    pub fn reset_link(&self, email: &str, reset_url: &str) {
        self.send_email(
            email,
            template::RESET_LINK,
            json!({ "reset_url": reset_url }).to_string(),
        );
    }

    pub fn reset_confirmation(&self, name: &str, email: &str) {
        self.send_email(
            email,
            template::RESET_CONFIRMATION,
            json!({ "name": name }).to_string(),
        );
    }

    fn send_email(&self, to: &str, template: &str, payload_json: String) {
        let message = Notification {
            to: to.to_string(),
            template: template.to_string(),
            payload_json,
        };
        if let Err(err) = self.email.send(&message) {
            error!("Failed to send {template} email: {err}");
        }
    }
}
