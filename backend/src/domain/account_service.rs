//! Account domain service: signup, signin, and current-user lookup.
//!
//! Passwords are hashed through the [`PasswordHasher`] port and sessions are
//! bearer tokens minted by the [`TokenService`] port, so this module never
//! touches cryptographic crates directly.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{info, warn};

use crate::domain::lists::service::DEFAULT_STORE_TIMEOUT;
use crate::domain::ports::{
    AccountService, AuthenticatedSession, PasswordHashError, PasswordHasher, TokenError,
    TokenService, UserPersistenceError, UserRepository,
};
use crate::domain::{
    Error, LoginCredentials, SignupCredentials, User, UserDraft, UserId, UserProfileView,
};

const INVALID_CREDENTIALS: &str = "invalid email or password";

fn map_user_persistence_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserPersistenceError::DuplicateEmail { .. } => {
            Error::conflict("an account with this email already exists")
        }
        UserPersistenceError::DuplicateUsername { .. } => {
            Error::conflict("this username is already taken")
        }
    }
}

fn map_hash_error(error: PasswordHashError) -> Error {
    Error::internal(error.to_string())
}

fn map_token_error(error: TokenError) -> Error {
    match error {
        TokenError::Invalid { .. } => Error::unauthorized("invalid or expired token"),
        TokenError::Issue { message } => Error::internal(format!("token issue failed: {message}")),
    }
}

/// Account service implementing the [`AccountService`] driving port.
#[derive(Clone)]
pub struct AccountManager {
    users: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<dyn TokenService>,
    clock: Arc<dyn Clock>,
    store_timeout: Duration,
}

impl AccountManager {
    /// Create a new account service from its collaborators.
    pub fn new(
        users: Arc<dyn UserRepository>,
        hasher: Arc<dyn PasswordHasher>,
        tokens: Arc<dyn TokenService>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            hasher,
            tokens,
            clock,
            store_timeout: DEFAULT_STORE_TIMEOUT,
        }
    }

    /// Override the per-call store timeout.
    #[must_use]
    pub fn with_store_timeout(mut self, store_timeout: Duration) -> Self {
        self.store_timeout = store_timeout;
        self
    }

    async fn bounded<T, F>(&self, operation: &'static str, call: F) -> Result<T, Error>
    where
        F: Future<Output = Result<T, UserPersistenceError>>,
    {
        match tokio::time::timeout(self.store_timeout, call).await {
            Ok(result) => result.map_err(map_user_persistence_error),
            Err(_) => {
                warn!(operation, "user store timed out");
                Err(Error::service_unavailable(format!(
                    "user store timed out during {operation}"
                )))
            }
        }
    }

    fn session_for(&self, user: &User) -> Result<AuthenticatedSession, Error> {
        let token = self.tokens.issue(&user.id()).map_err(map_token_error)?;
        Ok(AuthenticatedSession {
            token,
            user: UserProfileView::from(user),
        })
    }
}

#[async_trait]
impl AccountService for AccountManager {
    async fn signup(&self, credentials: SignupCredentials) -> Result<AuthenticatedSession, Error> {
        let existing = self
            .bounded("find_by_email", self.users.find_by_email(credentials.email()))
            .await?;
        if existing.is_some() {
            return Err(Error::conflict("an account with this email already exists"));
        }

        let password_hash = self
            .hasher
            .hash(credentials.password())
            .await
            .map_err(map_hash_error)?;
        let now = self.clock.utc();
        let user = User::new(UserDraft {
            id: UserId::random(),
            email: credentials.email().clone(),
            username: credentials.username().cloned(),
            password_hash,
            profile: credentials.profile().clone(),
            created_at: now,
            updated_at: now,
        });
        self.bounded("insert", self.users.insert(&user)).await?;
        info!(user_id = %user.id(), "account created");
        self.session_for(&user)
    }

    async fn signin(&self, credentials: LoginCredentials) -> Result<AuthenticatedSession, Error> {
        let Some(user) = self
            .bounded("find_by_email", self.users.find_by_email(credentials.email()))
            .await?
        else {
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        };

        let matches = self
            .hasher
            .verify(credentials.password(), user.password_hash())
            .await
            .map_err(map_hash_error)?;
        if !matches {
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        }
        self.session_for(&user)
    }

    async fn current_user(&self, user_id: UserId) -> Result<UserProfileView, Error> {
        self.bounded("find_by_id", self.users.find_by_id(&user_id))
            .await?
            .map(|user| UserProfileView::from(&user))
            .ok_or_else(|| Error::not_found("user not found"))
    }
}

#[cfg(test)]
#[path = "account_service_tests.rs"]
mod tests;
