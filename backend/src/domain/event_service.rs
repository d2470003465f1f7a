//! Event domain service.
//!
//! Runs each request through the same gates in order (prepare, validate,
//! authorize, persist) and rejects at the first one that fails. The service
//! holds no per-resource state; every call is independent.

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::StreamExt;
use mockable::Clock;
use serde_json::json;
use tracing::debug;

use crate::domain::ports::{
    EventCommand, EventFeed, EventQuery, EventRepository, EventRepositoryError, LIST_LIMIT,
};
use crate::domain::{
    AuthError, Error, Event, EventDraft, EventId, UserId, authorize,
};

const EVENT_NOT_FOUND: &str = "Event not found";

fn map_repository_error(error: EventRepositoryError) -> Error {
    match error {
        EventRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("event store unavailable: {message}"))
        }
        EventRepositoryError::Query { message } => {
            Error::internal(format!("event store error: {message}"))
        }
        EventRepositoryError::NotFound { .. } => Error::not_found(EVENT_NOT_FOUND),
        EventRepositoryError::DuplicateTitle { title } => Error::conflict("Title Already Taken")
            .with_details(json!({
                "field": "title",
                "value": title,
                "code": "duplicate_title",
            })),
        EventRepositoryError::MissingAuthor { author_id } => Error::unprocessable("Required Author")
            .with_details(json!({
                "field": "authorId",
                "value": author_id.get(),
                "code": "unknown_author",
            })),
    }
}

fn map_auth_error(error: AuthError) -> Error {
    Error::unauthorized(error.to_string())
}

/// Event service implementing the command and query driving ports.
#[derive(Clone)]
pub struct EventService<R> {
    events: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<R> EventService<R> {
    /// Create a service over an event repository.
    ///
    /// `clock` stamps `created_at`/`updated_at` during preparation.
    pub fn new(events: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self { events, clock }
    }
}

impl<R> EventService<R>
where
    R: EventRepository,
{
    fn prepared(&self, draft: EventDraft) -> Result<Event, Error> {
        let now = self.clock.utc();
        let event = Event::candidate(draft, now).prepare(now);
        event.validate()?;
        Ok(event)
    }

    async fn existing(&self, id: EventId) -> Result<Event, Error> {
        self.events
            .find_by_id(id)
            .await
            .map_err(map_repository_error)
    }
}

#[async_trait]
impl<R> EventCommand for EventService<R>
where
    R: EventRepository,
{
    async fn create(&self, caller: UserId, draft: EventDraft) -> Result<Event, Error> {
        let event = self.prepared(draft)?;
        authorize(caller, event.author_id).map_err(map_auth_error)?;

        let created = self
            .events
            .create(&event)
            .await
            .map_err(map_repository_error)?;
        debug!(event_id = %created.id, author_id = %created.author_id, "event created");
        Ok(created)
    }

    async fn owned(&self, caller: UserId, id: EventId) -> Result<Event, Error> {
        let existing = self.existing(id).await?;
        authorize(caller, existing.author_id).map_err(map_auth_error)?;
        Ok(existing)
    }

    async fn update(
        &self,
        caller: UserId,
        id: EventId,
        draft: EventDraft,
    ) -> Result<Event, Error> {
        let existing = self.owned(caller, id).await?;
        authorize(caller, draft.author_id).map_err(map_auth_error)?;

        let mut event = self.prepared(draft)?;
        event.id = existing.id;
        event.created_at = existing.created_at;

        let updated = self
            .events
            .update(&event)
            .await
            .map_err(map_repository_error)?;
        debug!(event_id = %updated.id, "event updated");
        Ok(updated)
    }

    async fn delete(&self, caller: UserId, id: EventId) -> Result<(), Error> {
        self.owned(caller, id).await?;

        let removed = self
            .events
            .delete(id, caller)
            .await
            .map_err(map_repository_error)?;
        if removed == 0 {
            return Err(Error::not_found(EVENT_NOT_FOUND));
        }
        debug!(event_id = %id, "event deleted");
        Ok(())
    }
}

#[async_trait]
impl<R> EventQuery for EventService<R>
where
    R: EventRepository,
{
    async fn get(&self, id: EventId) -> Result<Event, Error> {
        self.existing(id).await
    }

    async fn list(&self) -> Result<Vec<Event>, Error> {
        self.events
            .find_all(LIST_LIMIT)
            .await
            .map_err(map_repository_error)
    }

    async fn stream(&self) -> Result<EventFeed, Error> {
        let rows = self
            .events
            .stream_all()
            .await
            .map_err(map_repository_error)?;
        Ok(rows.map(|row| row.map_err(map_repository_error)).boxed())
    }
}

#[cfg(test)]
#[path = "event_service_tests.rs"]
mod tests;
