//! PostgreSQL-backed fixture loading adapter.
//!
//! Clears events and users, then inserts the supplied records, all inside
//! one transaction.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};

use crate::domain::ports::{
    FixtureRepository, FixtureRepositoryError, LoadedFixtures, NewEventRecord, NewUserRecord,
};
use crate::domain::{Event, User};

use super::diesel_error_mapping::{DieselFailure, classify_diesel_error};
use super::models::{EventRow, NewEventRow, NewUserRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::{events, users};

/// Diesel-backed implementation of the `FixtureRepository` port.
#[derive(Clone)]
pub struct DieselFixtureRepository {
    pool: DbPool,
}

impl DieselFixtureRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> FixtureRepositoryError {
    FixtureRepositoryError::connection(error.into_message())
}

fn map_diesel_error(error: diesel::result::Error) -> FixtureRepositoryError {
    match classify_diesel_error(error) {
        DieselFailure::Connection(message) => FixtureRepositoryError::connection(message),
        other => FixtureRepositoryError::query(other.into_message()),
    }
}

/// Pair each event with the id of the user at its author position.
fn resolve_authors(
    events: &[NewEventRecord],
    user_ids: &[i64],
) -> Result<Vec<i64>, FixtureRepositoryError> {
    events
        .iter()
        .map(|record| {
            user_ids
                .get(record.author_position)
                .copied()
                .ok_or_else(|| FixtureRepositoryError::unknown_author(record.author_position))
        })
        .collect()
}

/// Transaction body failure: either Diesel or an unresolved author.
enum ReplaceError {
    Diesel(diesel::result::Error),
    Fixture(FixtureRepositoryError),
}

impl From<diesel::result::Error> for ReplaceError {
    fn from(error: diesel::result::Error) -> Self {
        Self::Diesel(error)
    }
}

#[async_trait]
impl FixtureRepository for DieselFixtureRepository {
    async fn replace_all(
        &self,
        user_records: Vec<NewUserRecord>,
        event_records: Vec<NewEventRecord>,
    ) -> Result<LoadedFixtures, FixtureRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let result = conn
            .transaction::<_, ReplaceError, _>(|conn| {
                async move {
                    diesel::delete(events::table).execute(conn).await?;
                    diesel::delete(users::table).execute(conn).await?;
                    if user_records.is_empty() {
                        return resolve_authors(&event_records, &[])
                            .map(|_| (Vec::new(), Vec::new()))
                            .map_err(ReplaceError::Fixture);
                    }

                    let user_rows: Vec<NewUserRow<'_>> = user_records
                        .iter()
                        .map(|record| NewUserRow {
                            display_name: &record.display_name,
                            email: &record.email,
                            password_hash: record.credential.expose(),
                        })
                        .collect();
                    let stored_users: Vec<UserRow> = diesel::insert_into(users::table)
                        .values(&user_rows)
                        .returning(UserRow::as_returning())
                        .get_results(conn)
                        .await?;

                    let user_ids: Vec<i64> = stored_users.iter().map(|user| user.id).collect();
                    let author_ids =
                        resolve_authors(&event_records, &user_ids).map_err(ReplaceError::Fixture)?;
                    let event_rows: Vec<NewEventRow<'_>> = event_records
                        .iter()
                        .zip(author_ids)
                        .map(|(record, author_id)| NewEventRow::from_event(&record.event, author_id))
                        .collect();
                    if event_rows.is_empty() {
                        return Ok((stored_users, Vec::new()));
                    }
                    let stored_events: Vec<EventRow> = diesel::insert_into(events::table)
                        .values(&event_rows)
                        .returning(EventRow::as_returning())
                        .get_results(conn)
                        .await?;

                    Ok((stored_users, stored_events))
                }
                .scope_boxed()
            })
            .await;

        let (stored_users, stored_events) = result.map_err(|err| match err {
            ReplaceError::Diesel(error) => map_diesel_error(error),
            ReplaceError::Fixture(error) => error,
        })?;

        let authors = stored_users.clone();
        let events: Vec<Event> = stored_events
            .into_iter()
            .filter_map(|row| {
                let author = authors.iter().find(|user| user.id == row.author_id)?.clone();
                Some(row.into_event(author))
            })
            .collect();
        let users: Vec<User> = stored_users.into_iter().map(User::from).collect();
        Ok(LoadedFixtures { users, events })
    }
}
