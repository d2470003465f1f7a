//! Driving port for event mutations.
//!
//! Every operation takes the authenticated caller; ownership checks happen
//! behind the port.

use async_trait::async_trait;

use crate::domain::{Error, Event, EventDraft, EventId, UserId};

/// Use-cases that change events.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventCommand: Send + Sync {
    /// Create an event owned by `caller`.
    async fn create(&self, caller: UserId, draft: EventDraft) -> Result<Event, Error>;

    /// Fetch an event and confirm `caller` is its author.
    ///
    /// Transports use it to reject a foreign or missing event before they
    /// read a replacement payload.
    async fn owned(&self, caller: UserId, id: EventId) -> Result<Event, Error>;

    /// Replace title and content of an event `caller` owns.
    async fn update(&self, caller: UserId, id: EventId, draft: EventDraft)
    -> Result<Event, Error>;

    /// Delete an event `caller` owns.
    async fn delete(&self, caller: UserId, id: EventId) -> Result<(), Error>;
}
