//! Ownership guard for event mutations.

use super::UserId;

/// Ownership check failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Unauthorized")]
    Unauthorized,
}

/// Permit the call only when `caller` is the resource's author.
///
/// There is no administrative bypass.
///
/// # Errors
/// [`AuthError::Unauthorized`] when the identifiers differ.
///
/// # Examples
/// ```
/// use events_backend::domain::{AuthError, UserId, authorize};
///
/// assert!(authorize(UserId::new(1), UserId::new(1)).is_ok());
/// assert_eq!(
///     authorize(UserId::new(2), UserId::new(1)),
///     Err(AuthError::Unauthorized)
/// );
/// ```
pub fn authorize(caller: UserId, author: UserId) -> Result<(), AuthError> {
    if caller == author {
        Ok(())
    } else {
        Err(AuthError::Unauthorized)
    }
}
