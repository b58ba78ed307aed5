//! Port for issuing and verifying bearer tokens.

use chrono::{DateTime, Utc};

use crate::domain::UserId;

use super::define_port_error;

define_port_error! {
    /// Failures raised by token adapters.
    pub enum TokenError {
        /// The token is missing, malformed, badly signed, or expired.
        Invalid { message: String } => "invalid token: {message}",
        /// The token could not be produced.
        Issue { message: String } => "token could not be issued: {message}",
    }
}

/// Signed token handed to a client after authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Issues tokens for users and resolves tokens back to a user id.
///
/// Implementations must validate signature and expiry before trusting the
/// subject claim.
#[cfg_attr(test, mockall::automock)]
pub trait TokenService: Send + Sync {
    /// Issue a token for `user`.
    fn issue(&self, user: &UserId) -> Result<IssuedToken, TokenError>;

    /// Verify `token` and return its subject.
    fn verify(&self, token: &str) -> Result<UserId, TokenError>;
}
