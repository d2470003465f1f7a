//! User identity as seen by the event core.
//!
//! Users are read-only here: they are created by the fixture loader or an
//! external registration flow and only looked up to authenticate callers and
//! to attach author snapshots to events.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

/// Store-assigned user identifier.
///
/// Zero or negative values never name a stored user; they are still
/// representable so that unvalidated payloads can carry them up to the
/// validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    /// Wrap a raw identifier.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Raw identifier.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }

    /// Whether the identifier can reference a stored user (`id >= 1`).
    #[must_use]
    pub const fn is_assigned(self) -> bool {
        self.0 >= 1
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<i64> for UserId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// Public projection of a stored user.
///
/// This is the denormalised author snapshot attached to events, so it never
/// carries the credential hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    display_name: String,
    email: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Field bundle for [`User::new`].
#[derive(Debug, Clone)]
pub struct UserDraft {
    pub id: UserId,
    pub display_name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Assemble a user from stored fields.
    #[must_use]
    pub fn new(draft: UserDraft) -> Self {
        let UserDraft {
            id,
            display_name,
            email,
            created_at,
            updated_at,
        } = draft;
        Self {
            id,
            display_name,
            email,
            created_at,
            updated_at,
        }
    }

    #[must_use]
    pub const fn id(&self) -> UserId {
        self.id
    }

    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

/// PHC-encoded credential hash. Wiped on drop and redacted from `Debug`.
#[derive(Clone)]
pub struct CredentialHash(Zeroizing<String>);

impl CredentialHash {
    /// Wrap an encoded hash string.
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(Zeroizing::new(encoded.into()))
    }

    /// Encoded hash for storage or verification.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for CredentialHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CredentialHash(<redacted>)")
    }
}

/// A stored user together with its credential hash.
///
/// Only the login flow sees this type.
#[derive(Debug, Clone)]
pub struct UserAccount {
    pub user: User,
    pub credential: CredentialHash,
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(1, true)]
    #[case(42, true)]
    #[case(0, false)]
    #[case(-3, false)]
    fn assigned_ids_are_positive(#[case] raw: i64, #[case] expected: bool) {
        assert_eq!(UserId::new(raw).is_assigned(), expected);
    }

    #[rstest]
    fn credential_debug_is_redacted() {
        let hash = CredentialHash::new("$argon2id$v=19$secret");
        let rendered = format!("{hash:?}");
        assert!(!rendered.contains("secret"));
        assert_eq!(hash.expose(), "$argon2id$v=19$secret");
    }

    #[rstest]
    fn user_id_serialises_as_number() {
        let value = serde_json::to_value(UserId::new(7)).expect("json");
        assert_eq!(value, serde_json::json!(7));
    }
}
