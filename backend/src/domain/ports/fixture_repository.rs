//! Driven port for loading fixture records in setup contexts.

use async_trait::async_trait;

use crate::domain::{CredentialHash, Event, User};

use super::define_port_error;

define_port_error! {
    /// Errors raised while replacing stored records with fixtures.
    pub enum FixtureRepositoryError {
        /// The store could not be reached.
        Connection { message: String } =>
            "fixture repository connection failed: {message}",
        /// A statement failed; nothing was committed.
        Query { message: String } =>
            "fixture repository query failed: {message}",
        /// An event names an author position outside the user list.
        UnknownAuthor { position: usize } =>
            "fixture event references unknown author position {position}",
    }
}

/// A user row to insert, with its already-hashed credential.
#[derive(Debug, Clone)]
pub struct NewUserRecord {
    pub display_name: String,
    pub email: String,
    pub credential: CredentialHash,
}

/// A prepared event row whose author is given by position in the user list.
#[derive(Debug, Clone)]
pub struct NewEventRecord {
    pub event: Event,
    pub author_position: usize,
}

/// Stored records produced by a fixture load.
#[derive(Debug, Clone, Default)]
pub struct LoadedFixtures {
    pub users: Vec<User>,
    pub events: Vec<Event>,
}

/// Atomically replace all users and events.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FixtureRepository: Send + Sync {
    /// Delete existing events and users, then insert `users` and `events`.
    ///
    /// Either every record is stored or none is.
    async fn replace_all(
        &self,
        users: Vec<NewUserRecord>,
        events: Vec<NewEventRecord>,
    ) -> Result<LoadedFixtures, FixtureRepositoryError>;
}
