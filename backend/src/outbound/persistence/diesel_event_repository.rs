//! PostgreSQL-backed `EventRepository` implementation using Diesel ORM.
//!
//! Every returned [`Event`] carries its author, fetched by a second query on
//! `author_id`; an event whose author row is gone fails the read instead of
//! vanishing from it. The RPC stream uses `load_stream` on an owned
//! connection and yields rows as the server produces them.

use std::collections::HashMap;

use async_stream::stream;
use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use futures_util::StreamExt;

use crate::domain::ports::{EventRepository, EventRepositoryError, EventSummaryStream};
use crate::domain::{Event, EventId, EventSummary, UserId};

use super::diesel_error_mapping::{DieselFailure, classify_diesel_error};
use super::models::{EventChangeset, EventRow, NewEventRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::{EVENTS_AUTHOR_FKEY, EVENTS_TITLE_KEY, events, users};

/// Diesel-backed implementation of the `EventRepository` port.
#[derive(Clone)]
pub struct DieselEventRepository {
    pool: DbPool,
}

impl DieselEventRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> EventRepositoryError {
    EventRepositoryError::connection(error.into_message())
}

fn map_diesel_error(error: diesel::result::Error) -> EventRepositoryError {
    match classify_diesel_error(error) {
        DieselFailure::Connection(message) => EventRepositoryError::connection(message),
        other => EventRepositoryError::query(other.into_message()),
    }
}

/// Map a failed insert or update of `event`, recognising its constraints.
fn map_write_error(error: diesel::result::Error, event: &Event) -> EventRepositoryError {
    match classify_diesel_error(error) {
        failure if failure.is_unique(EVENTS_TITLE_KEY) => {
            EventRepositoryError::duplicate_title(event.title.clone())
        }
        failure if failure.is_foreign_key(EVENTS_AUTHOR_FKEY) => {
            EventRepositoryError::missing_author(event.author_id)
        }
        DieselFailure::Connection(message) => EventRepositoryError::connection(message),
        other => EventRepositoryError::query(other.into_message()),
    }
}

fn missing_author_row(event_id: i64, author_id: i64) -> EventRepositoryError {
    EventRepositoryError::query(format!("author {author_id} of event {event_id} not found"))
}

async fn load_author<C>(conn: &mut C, row: &EventRow) -> Result<UserRow, EventRepositoryError>
where
    C: diesel_async::AsyncConnection<Backend = diesel::pg::Pg> + Send,
{
    users::table
        .find(row.author_id)
        .select(UserRow::as_select())
        .first(conn)
        .await
        .optional()
        .map_err(map_diesel_error)?
        .ok_or_else(|| missing_author_row(row.id, row.author_id))
}

/// Pair each row with its author, failing on the first row whose author is
/// absent from `authors`.
fn attach_authors(
    rows: Vec<EventRow>,
    authors: Vec<UserRow>,
) -> Result<Vec<Event>, EventRepositoryError> {
    let authors: HashMap<i64, UserRow> =
        authors.into_iter().map(|author| (author.id, author)).collect();
    rows.into_iter()
        .map(|row| {
            let author = authors
                .get(&row.author_id)
                .cloned()
                .ok_or_else(|| missing_author_row(row.id, row.author_id))?;
            Ok(row.into_event(author))
        })
        .collect()
}

#[async_trait]
impl EventRepository for DieselEventRepository {
    async fn create(&self, event: &Event) -> Result<Event, EventRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: EventRow = diesel::insert_into(events::table)
            .values(NewEventRow::from_event(event, event.author_id.get()))
            .returning(EventRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|err| map_write_error(err, event))?;

        let author = load_author(&mut conn, &row).await?;
        Ok(row.into_event(author))
    }

    async fn find_all(&self, limit: u32) -> Result<Vec<Event>, EventRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<EventRow> = events::table
            .select(EventRow::as_select())
            .order(events::id.asc())
            .limit(i64::from(limit))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let mut author_ids: Vec<i64> = rows.iter().map(|row| row.author_id).collect();
        author_ids.sort_unstable();
        author_ids.dedup();
        let authors: Vec<UserRow> = users::table
            .filter(users::id.eq_any(author_ids))
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        attach_authors(rows, authors)
    }

    async fn find_by_id(&self, id: EventId) -> Result<Event, EventRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: EventRow = events::table
            .find(id.get())
            .select(EventRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .ok_or_else(|| EventRepositoryError::not_found(id))?;

        let author = load_author(&mut conn, &row).await?;
        Ok(row.into_event(author))
    }

    async fn update(&self, event: &Event) -> Result<Event, EventRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<EventRow> = diesel::update(events::table.find(event.id.get()))
            .set(EventChangeset::from(event))
            .returning(EventRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(|err| map_write_error(err, event))?;

        let row = row.ok_or_else(|| EventRepositoryError::not_found(event.id))?;
        let author = load_author(&mut conn, &row).await?;
        Ok(row.into_event(author))
    }

    async fn delete(&self, id: EventId, author_id: UserId) -> Result<u64, EventRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let removed = diesel::delete(
            events::table
                .filter(events::id.eq(id.get()))
                .filter(events::author_id.eq(author_id.get())),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;

        if removed > 0 {
            return Ok(u64::try_from(removed).unwrap_or(u64::MAX));
        }

        let exists: Option<i64> = events::table
            .find(id.get())
            .select(events::id)
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        match exists {
            Some(_) => Ok(0),
            None => Err(EventRepositoryError::not_found(id)),
        }
    }

    async fn stream_all(&self) -> Result<EventSummaryStream, EventRepositoryError> {
        let mut conn = self.pool.get_owned().await.map_err(map_pool_error)?;

        let rows = stream! {
            let opened = events::table
                .select(EventRow::as_select())
                .order(events::id.asc())
                .load_stream::<EventRow>(&mut *conn)
                .await;
            let rows = match opened {
                Ok(rows) => rows,
                Err(err) => {
                    yield Err(map_diesel_error(err));
                    return;
                }
            };
            futures_util::pin_mut!(rows);
            while let Some(row) = rows.next().await {
                yield row.map(EventSummary::from).map_err(map_diesel_error);
            }
        };
        Ok(rows.boxed())
    }
}
