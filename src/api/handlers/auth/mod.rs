//! Account lifecycle: signup, OTP verification, sign-in, password reset.
//!
//! Accounts move `Unverified -> Verified` exactly once; a reset-pending flag
//! is orthogonal to that state. Plaintext credentials exist only inside a
//! request, and OTP/reset secrets are expiry-bounded and single-use.

pub(crate) mod error;
pub(crate) mod hasher;
pub(crate) mod otp;
mod password;
pub mod principal;
pub(crate) mod reset;
mod signin;
mod signup;
mod state;
pub(crate) mod storage;
pub(crate) mod token;
pub mod types;
mod utils;
mod verification;

pub use error::AuthError;
pub use password::{__path_forgot_password, __path_reset_password, forgot_password, reset_password};
pub use signin::{__path_signin, signin};
pub use signup::{__path_signup, signup};
pub use state::{AuthConfig, AuthState};
pub use verification::{__path_resend_otp, __path_verify_email, resend_otp, verify_email};
