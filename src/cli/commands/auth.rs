use clap::{Arg, ArgAction, Command};

pub const ARG_TOKEN_SECRET: &str = "token-secret";
pub const ARG_FRONTEND_BASE_URL: &str = "frontend-base-url";
pub const ARG_OTP_TTL_SECONDS: &str = "otp-ttl-seconds";
pub const ARG_RESET_TTL_SECONDS: &str = "reset-ttl-seconds";
pub const ARG_SESSION_TTL_SECONDS: &str = "session-ttl-seconds";
pub const ARG_DEV_MODE: &str = "dev-mode";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_TOKEN_SECRET)
                .long("token-secret")
                .help("Secret used to sign session bearer tokens")
                .env("BREWHAVEN_TOKEN_SECRET")
                .required(true),
        )
        .arg(
            Arg::new(ARG_FRONTEND_BASE_URL)
                .long("frontend-base-url")
                .help("Frontend base URL used for CORS and reset links")
                .env("BREWHAVEN_FRONTEND_BASE_URL")
                .default_value("http://localhost:5173"),
        )
        .arg(
            Arg::new(ARG_OTP_TTL_SECONDS)
                .long("otp-ttl-seconds")
                .help("Email verification OTP TTL in seconds")
                .env("BREWHAVEN_OTP_TTL_SECONDS")
                .default_value("900")
                .value_parser(clap::value_parser!(i64)),
        )
        .arg(
            Arg::new(ARG_RESET_TTL_SECONDS)
                .long("reset-ttl-seconds")
                .help("Password reset token TTL in seconds")
                .env("BREWHAVEN_RESET_TTL_SECONDS")
                .default_value("3600")
                .value_parser(clap::value_parser!(i64)),
        )
        .arg(
            Arg::new(ARG_SESSION_TTL_SECONDS)
                .long("session-ttl-seconds")
                .help("Session bearer token TTL in seconds")
                .env("BREWHAVEN_SESSION_TTL_SECONDS")
                .default_value("604800")
                .value_parser(clap::value_parser!(i64)),
        )
        .arg(
            Arg::new(ARG_DEV_MODE)
                .long("dev-mode")
                .help("Echo OTPs and reset tokens in responses (development only)")
                .env("BREWHAVEN_DEV_MODE")
                .action(ArgAction::SetTrue),
        )
}
