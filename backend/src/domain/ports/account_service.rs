//! Driving port for account registration and authentication.

use async_trait::async_trait;

use crate::domain::ports::IssuedToken;
use crate::domain::{Error, LoginCredentials, SignupCredentials, UserId, UserProfileView};

/// Successful signup or signin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedSession {
    pub token: IssuedToken,
    pub user: UserProfileView,
}

/// Registers users, verifies credentials, and resolves the current user.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountService: Send + Sync {
    /// Create an account and sign it in. Duplicate emails are a conflict.
    async fn signup(&self, credentials: SignupCredentials) -> Result<AuthenticatedSession, Error>;

    /// Verify credentials. Unknown emails and wrong passwords are
    /// indistinguishable to the caller.
    async fn signin(&self, credentials: LoginCredentials) -> Result<AuthenticatedSession, Error>;

    /// Profile of an authenticated user.
    async fn current_user(&self, user_id: UserId) -> Result<UserProfileView, Error>;
}
