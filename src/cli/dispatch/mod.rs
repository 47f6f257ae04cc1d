use crate::api::handlers::auth::AuthConfig;
use crate::cli::{actions::Action, commands::auth, globals::GlobalArgs};
use anyhow::Result;
use secrecy::SecretString;

/// Translate parsed arguments into an executable action.
///
/// # Errors
///
/// Returns an error if a required argument is missing.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>("port").copied().unwrap_or(5000);
    let dsn = matches
        .get_one::<String>("dsn")
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("missing required argument: --dsn"))?;

    let token_secret = matches
        .get_one::<String>(auth::ARG_TOKEN_SECRET)
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("missing required argument: --token-secret"))?;

    let dev_mode = matches.get_flag(auth::ARG_DEV_MODE);
    let globals = GlobalArgs::new(SecretString::from(token_secret)).with_dev_mode(dev_mode);

    let frontend_base_url = matches
        .get_one::<String>(auth::ARG_FRONTEND_BASE_URL)
        .cloned()
        .unwrap_or_else(|| "http://localhost:5173".to_string());

    let mut config = AuthConfig::new(frontend_base_url).with_dev_mode(dev_mode);
    if let Some(seconds) = matches.get_one::<i64>(auth::ARG_OTP_TTL_SECONDS) {
        config = config.with_otp_ttl_seconds(*seconds);
    }
    if let Some(seconds) = matches.get_one::<i64>(auth::ARG_RESET_TTL_SECONDS) {
        config = config.with_reset_ttl_seconds(*seconds);
    }
    if let Some(seconds) = matches.get_one::<i64>(auth::ARG_SESSION_TTL_SECONDS) {
        config = config.with_session_ttl_seconds(*seconds);
    }

    Ok(Action::Server {
        port,
        dsn,
        globals,
        config,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands;

    #[test]
    fn test_handler_builds_server_action() -> Result<()> {
        let matches = commands::new().try_get_matches_from(vec![
            "brewhaven",
            "--port",
            "9000",
            "--dsn",
            "postgres://localhost/brewhaven",
            "--token-secret",
            "secret",
            "--otp-ttl-seconds",
            "120",
            "--dev-mode",
        ])?;

        let Action::Server {
            port,
            dsn,
            globals,
            config,
        } = handler(&matches)?;

        assert_eq!(port, 9000);
        assert_eq!(dsn, "postgres://localhost/brewhaven");
        assert!(globals.dev_mode);
        assert_eq!(config.otp_ttl_seconds(), 120);
        assert!(config.dev_mode());
        Ok(())
    }
}
