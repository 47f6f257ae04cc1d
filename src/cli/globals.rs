use secrecy::SecretString;

/// Process-wide settings every action needs: the bearer-token signing secret
/// and whether development conveniences (OTP echo) are enabled.
#[derive(Clone)]
pub struct GlobalArgs {
    pub token_secret: SecretString,
    pub dev_mode: bool,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(token_secret: SecretString) -> Self {
        Self {
            token_secret,
            dev_mode: false,
        }
    }

    #[must_use]
    pub fn with_dev_mode(mut self, dev_mode: bool) -> Self {
        self.dev_mode = dev_mode;
        self
    }
}

impl std::fmt::Debug for GlobalArgs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlobalArgs")
            .field("token_secret", &"***")
            .field("dev_mode", &self.dev_mode)
            .finish()
    }
}
