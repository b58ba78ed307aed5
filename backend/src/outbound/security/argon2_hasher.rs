//! Argon2id implementation of the password hashing port.
//!
//! Hashing is memory-hard and takes tens of milliseconds, so both operations
//! run on the blocking pool instead of an async worker thread.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{
    PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString,
};
use argon2::Argon2;
use async_trait::async_trait;
use zeroize::Zeroizing;

use crate::domain::ports::{PasswordHashError, PasswordHasher};

/// Password hasher using the `argon2` crate's default Argon2id parameters.
#[derive(Debug, Default, Clone, Copy)]
pub struct Argon2PasswordHasher;

fn hash_blocking(password: &str) -> Result<String, PasswordHashError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| PasswordHashError::hashing(err.to_string()))
}

fn verify_blocking(password: &str, hash: &str) -> Result<bool, PasswordHashError> {
    let parsed =
        PasswordHash::new(hash).map_err(|err| PasswordHashError::malformed_hash(err.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

#[async_trait]
impl PasswordHasher for Argon2PasswordHasher {
    async fn hash(&self, password: &str) -> Result<String, PasswordHashError> {
        let password = Zeroizing::new(password.to_owned());
        tokio::task::spawn_blocking(move || hash_blocking(&password))
            .await
            .map_err(|err| PasswordHashError::hashing(format!("hashing task failed: {err}")))?
    }

    async fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordHashError> {
        let password = Zeroizing::new(password.to_owned());
        let hash = hash.to_owned();
        tokio::task::spawn_blocking(move || verify_blocking(&password, &hash))
            .await
            .map_err(|err| PasswordHashError::hashing(format!("verification task failed: {err}")))?
    }
}
