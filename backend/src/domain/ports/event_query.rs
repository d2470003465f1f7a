//! Driving port for event reads.
//!
//! Reads are public: no caller identity is required.

use async_trait::async_trait;
use futures_util::stream::BoxStream;

use crate::domain::{Error, Event, EventId, EventSummary};

/// Row cap applied to [`EventQuery::list`].
pub const LIST_LIMIT: u32 = 100;

/// Stream returned by [`EventQuery::stream`]. An `Err` item is terminal.
pub type EventFeed = BoxStream<'static, Result<EventSummary, Error>>;

/// Use-cases that read events.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventQuery: Send + Sync {
    /// Fetch one event with its author.
    async fn get(&self, id: EventId) -> Result<Event, Error>;

    /// Fetch up to [`LIST_LIMIT`] events with their authors.
    async fn list(&self) -> Result<Vec<Event>, Error>;

    /// Stream every event, uncapped.
    async fn stream(&self) -> Result<EventFeed, Error>;
}
