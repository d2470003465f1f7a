//! Driven ports for bearer token handling.
//!
//! Token formats are an adapter concern; the domain only needs "which user
//! is calling" and "mint a token for this user".

use crate::domain::UserId;

use super::define_port_error;

define_port_error! {
    /// Token verification or issuance failures.
    pub enum TokenError {
        /// The token is malformed, unsigned, or signed with another key.
        Invalid { message: String } => "invalid token: {message}",
        /// The token's expiry has passed.
        Expired => "token expired",
        /// The token does not grant access.
        NotAuthorized => "token is not authorized",
        /// A token could not be produced.
        Signing { message: String } => "failed to sign token: {message}",
    }
}

/// Resolve a bearer token into the calling user.
#[cfg_attr(test, mockall::automock)]
pub trait TokenVerifier: Send + Sync {
    /// Verify `token` and return the user it was issued for.
    fn verify(&self, token: &str) -> Result<UserId, TokenError>;
}

/// Mint bearer tokens for authenticated users.
#[cfg_attr(test, mockall::automock)]
pub trait TokenIssuer: Send + Sync {
    /// Issue a token for `user_id`.
    fn issue(&self, user_id: UserId) -> Result<String, TokenError>;
}
