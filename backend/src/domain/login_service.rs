//! Credential login backed by the user store.
//!
//! Unknown emails and wrong passwords produce the same `401` so callers
//! cannot tell which accounts exist.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::domain::Error;
use crate::domain::ports::{
    CredentialHasher, LoginService, TokenError, TokenIssuer, UserRepository, UserRepositoryError,
};

const INVALID_CREDENTIALS: &str = "invalid credentials";

fn map_user_error(error: UserRepositoryError) -> Error {
    match error {
        UserRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("user store unavailable: {message}"))
        }
        UserRepositoryError::Query { message } => {
            Error::internal(format!("user store error: {message}"))
        }
    }
}

fn map_token_error(error: TokenError) -> Error {
    Error::internal(format!("token issuance failed: {error}"))
}

/// [`LoginService`] that checks a stored credential hash and mints a token.
#[derive(Clone)]
pub struct CredentialLoginService {
    users: Arc<dyn UserRepository>,
    hasher: Arc<dyn CredentialHasher>,
    issuer: Arc<dyn TokenIssuer>,
}

impl CredentialLoginService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        hasher: Arc<dyn CredentialHasher>,
        issuer: Arc<dyn TokenIssuer>,
    ) -> Self {
        Self {
            users,
            hasher,
            issuer,
        }
    }
}

#[async_trait]
impl LoginService for CredentialLoginService {
    async fn login(&self, email: &str, password: &str) -> Result<String, Error> {
        let Some(account) = self
            .users
            .find_account_by_email(email.trim())
            .await
            .map_err(map_user_error)?
        else {
            debug!("login rejected: unknown email");
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        };

        let matches = match self.hasher.verify(password, &account.credential) {
            Ok(matches) => matches,
            Err(error) => {
                warn!(user_id = %account.user.id(), %error, "stored credential rejected");
                false
            }
        };
        if !matches {
            debug!(user_id = %account.user.id(), "login rejected: password mismatch");
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        }

        self.issuer
            .issue(account.user.id())
            .map_err(map_token_error)
    }
}
