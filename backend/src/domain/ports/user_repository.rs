//! Driven port for user lookups.

use async_trait::async_trait;

use crate::domain::{User, UserAccount, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by user repository adapters.
    pub enum UserRepositoryError {
        /// The store could not be reached.
        Connection { message: String } =>
            "user repository connection failed: {message}",
        /// A query failed.
        Query { message: String } =>
            "user repository query failed: {message}",
    }
}

/// Read-only access to stored users.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fetch the public projection of a user.
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserRepositoryError>;

    /// Fetch a user with its credential hash, keyed by email.
    async fn find_account_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserAccount>, UserRepositoryError>;
}
