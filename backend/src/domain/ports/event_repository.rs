//! Driven port for event persistence.
//!
//! Adapters own the author join: every [`Event`] they return carries the
//! author snapshot looked up from `author_id`, and a failed lookup fails the
//! whole call. Constraint violations are translated into the typed variants
//! below before they leave the adapter.

use async_trait::async_trait;
use futures_util::stream::BoxStream;

use crate::domain::{Event, EventId, EventSummary, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by event repository adapters.
    pub enum EventRepositoryError {
        /// The store could not be reached.
        Connection { message: String } =>
            "event repository connection failed: {message}",
        /// A query failed for a reason other than those below.
        Query { message: String } =>
            "event repository query failed: {message}",
        /// No event has the requested identifier.
        NotFound { id: EventId } => "event {id} not found",
        /// Another event already uses the title.
        DuplicateTitle { title: String } => "title already taken: {title}",
        /// The referenced author does not exist.
        MissingAuthor { author_id: UserId } => "author {author_id} does not exist",
    }
}

/// Stream of rows for the unbounded list path.
pub type EventSummaryStream = BoxStream<'static, Result<EventSummary, EventRepositoryError>>;

/// Port for reading and writing events.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Insert a prepared event and return it with its assigned identifier.
    async fn create(&self, event: &Event) -> Result<Event, EventRepositoryError>;

    /// Load at most `limit` events in store order.
    async fn find_all(&self, limit: u32) -> Result<Vec<Event>, EventRepositoryError>;

    /// Load one event, failing with [`EventRepositoryError::NotFound`].
    async fn find_by_id(&self, id: EventId) -> Result<Event, EventRepositoryError>;

    /// Overwrite title, content and `updated_at` of the event with `event.id`.
    async fn update(&self, event: &Event) -> Result<Event, EventRepositoryError>;

    /// Delete the event only when both `id` and `author_id` match.
    ///
    /// Returns the number of rows removed, which is zero when the event
    /// exists under another author. An identifier that names no event at
    /// all is reported as [`EventRepositoryError::NotFound`].
    async fn delete(&self, id: EventId, author_id: UserId) -> Result<u64, EventRepositoryError>;

    /// Stream every event without a row cap.
    async fn stream_all(&self) -> Result<EventSummaryStream, EventRepositoryError>;
}
