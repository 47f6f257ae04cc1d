pub mod server;

use crate::api::handlers::auth::AuthConfig;
use crate::cli::globals::GlobalArgs;
use anyhow::Result;

/// Actions the CLI can dispatch to.
#[derive(Debug)]
pub enum Action {
    Server {
        port: u16,
        dsn: String,
        globals: GlobalArgs,
        config: AuthConfig,
    },
}

impl Action {
    /// Execute the action.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying action fails.
    pub async fn execute(self) -> Result<()> {
        match self {
            Self::Server { .. } => server::handle(self).await,
        }
    }
}
