//! Shared Diesel error classification for the repositories.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

/// What a repository needs to know about a failed Diesel operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DieselFailure {
    /// The connection dropped or could not be used.
    Connection(String),
    /// Any other statement failure.
    Query(String),
    /// No row matched a `first`/`get_result` call.
    NotFound,
    UniqueViolation { constraint: Option<String> },
    ForeignKeyViolation { constraint: Option<String> },
}

impl DieselFailure {
    /// Whether this is a unique violation on `name`.
    pub fn is_unique(&self, name: &str) -> bool {
        matches!(self, Self::UniqueViolation { constraint } if constraint.as_deref() == Some(name))
    }

    /// Whether this is a foreign key violation on `name`.
    pub fn is_foreign_key(&self, name: &str) -> bool {
        matches!(self, Self::ForeignKeyViolation { constraint } if constraint.as_deref() == Some(name))
    }

    /// Diagnostic text for generic connection/query errors.
    pub fn into_message(self) -> String {
        match self {
            Self::Connection(message) | Self::Query(message) => message,
            Self::NotFound => "record not found".to_owned(),
            Self::UniqueViolation { constraint } => {
                format!("unique constraint violated: {}", constraint.unwrap_or_default())
            }
            Self::ForeignKeyViolation { constraint } => {
                format!("foreign key violated: {}", constraint.unwrap_or_default())
            }
        }
    }
}

/// Classify and log a Diesel error.
pub(crate) fn classify_diesel_error(error: DieselError) -> DieselFailure {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(
                ?kind,
                message = info.message(),
                constraint = info.constraint_name(),
                "diesel operation failed"
            );
        }
        _ => debug!(error = %error, "diesel operation failed"),
    }

    match error {
        DieselError::NotFound => DieselFailure::NotFound,
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            DieselFailure::Connection("database connection error".to_owned())
        }
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            DieselFailure::UniqueViolation {
                constraint: info.constraint_name().map(str::to_owned),
            }
        }
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) => {
            DieselFailure::ForeignKeyViolation {
                constraint: info.constraint_name().map(str::to_owned),
            }
        }
        DieselError::QueryBuilderError(_) => DieselFailure::Query("database query error".to_owned()),
        _ => DieselFailure::Query("database error".to_owned()),
    }
}
