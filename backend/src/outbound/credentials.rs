//! Argon2id credential hashing.
//!
//! Hashes are PHC strings (`$argon2id$v=19$...`) with a fresh random salt
//! per call and the crate's default memory-hard parameters.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use rand::rngs::OsRng;

use crate::domain::CredentialHash;
use crate::domain::ports::{CredentialError, CredentialHasher};

/// [`CredentialHasher`] backed by Argon2id.
#[derive(Debug, Clone, Copy, Default)]
pub struct Argon2CredentialHasher;

impl CredentialHasher for Argon2CredentialHasher {
    fn hash(&self, secret: &str) -> Result<CredentialHash, CredentialError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(secret.as_bytes(), &salt)
            .map_err(|err| CredentialError::hash(err.to_string()))?;
        Ok(CredentialHash::new(hash.to_string()))
    }

    fn verify(&self, secret: &str, stored: &CredentialHash) -> Result<bool, CredentialError> {
        let parsed = PasswordHash::new(stored.expose())
            .map_err(|err| CredentialError::malformed_hash(err.to_string()))?;
        Ok(Argon2::default()
            .verify_password(secret.as_bytes(), &parsed)
            .is_ok())
    }
}
