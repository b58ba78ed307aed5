//! Port for password hashing and verification.

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Failures raised by password hashing adapters.
    pub enum PasswordHashError {
        /// Hashing or verification could not run.
        Hashing { message: String } => "password hashing failed: {message}",
        /// The stored hash is not a valid PHC string.
        MalformedHash { message: String } => "stored password hash is malformed: {message}",
    }
}

/// Hashes new passwords and checks candidates against stored hashes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PasswordHasher: Send + Sync {
    /// Produce a PHC-formatted hash of `password`.
    async fn hash(&self, password: &str) -> Result<String, PasswordHashError>;

    /// Whether `password` matches `hash`.
    async fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordHashError>;
}
