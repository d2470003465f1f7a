//! Driving port for credential login.

use async_trait::async_trait;

use crate::domain::Error;

/// Exchange an email and password for a bearer token.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Authenticate and return a freshly issued token.
    async fn login(&self, email: &str, password: &str) -> Result<String, Error>;
}
