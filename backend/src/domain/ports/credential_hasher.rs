//! Driven port for credential hashing.

use crate::domain::CredentialHash;

use super::define_port_error;

define_port_error! {
    /// Hashing failures.
    pub enum CredentialError {
        /// The secret could not be hashed.
        Hash { message: String } => "failed to hash credential: {message}",
        /// The stored hash is not a valid encoding.
        MalformedHash { message: String } => "stored credential is malformed: {message}",
    }
}

/// Hash and verify user secrets.
#[cfg_attr(test, mockall::automock)]
pub trait CredentialHasher: Send + Sync {
    /// Hash a plaintext secret with a fresh salt.
    fn hash(&self, secret: &str) -> Result<CredentialHash, CredentialError>;

    /// Whether `secret` matches `stored`.
    fn verify(&self, secret: &str, stored: &CredentialHash) -> Result<bool, CredentialError>;
}
