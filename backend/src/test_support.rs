//! Test utilities for the backend crate.
//!
//! Compiled for unit tests and, behind the `test-support` feature, for
//! integration tests under `tests/`.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use futures_util::StreamExt;
use futures_util::stream;

use crate::domain::ports::{
    EventRepository, EventRepositoryError, EventSummaryStream, FixtureRepository,
    FixtureRepositoryError, LoadedFixtures, NewEventRecord, NewUserRecord, UserRepository,
    UserRepositoryError,
};
use crate::domain::{Event, EventId, EventSummary, User, UserAccount, UserDraft, UserId};

#[derive(Debug, Default)]
struct Tables {
    accounts: Vec<UserAccount>,
    events: Vec<Event>,
    next_user_id: i64,
    next_event_id: i64,
}

impl Tables {
    fn user(&self, id: UserId) -> Option<&User> {
        self.accounts
            .iter()
            .map(|account| &account.user)
            .find(|user| user.id() == id)
    }

    fn with_author(&self, event: &Event) -> Event {
        let mut event = event.clone();
        event.author = self.user(event.author_id).cloned();
        event
    }

    fn title_taken(&self, title: &str, except: Option<EventId>) -> bool {
        self.events
            .iter()
            .any(|event| event.title == title && Some(event.id) != except)
    }
}

/// In-memory users and events honouring the same constraints as the
/// PostgreSQL schema: unique titles, existing authors and ascending ids.
///
/// Clones share the same tables.
///
/// # Examples
/// ```
/// use events_backend::test_support::InMemoryEventStore;
///
/// let store = InMemoryEventStore::new();
/// assert_eq!(store.event_count(), 0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryEventStore {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn event_count(&self) -> usize {
        self.lock().events.len()
    }
}

#[async_trait]
impl EventRepository for InMemoryEventStore {
    async fn create(&self, event: &Event) -> Result<Event, EventRepositoryError> {
        let mut tables = self.lock();
        if tables.title_taken(&event.title, None) {
            return Err(EventRepositoryError::duplicate_title(event.title.clone()));
        }
        if tables.user(event.author_id).is_none() {
            return Err(EventRepositoryError::missing_author(event.author_id));
        }
        tables.next_event_id += 1;
        let mut stored = event.clone();
        stored.id = EventId::new(tables.next_event_id);
        stored.author = None;
        tables.events.push(stored.clone());
        Ok(tables.with_author(&stored))
    }

    async fn find_all(&self, limit: u32) -> Result<Vec<Event>, EventRepositoryError> {
        let tables = self.lock();
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        Ok(tables
            .events
            .iter()
            .take(limit)
            .map(|event| tables.with_author(event))
            .collect())
    }

    async fn find_by_id(&self, id: EventId) -> Result<Event, EventRepositoryError> {
        let tables = self.lock();
        tables
            .events
            .iter()
            .find(|event| event.id == id)
            .map(|event| tables.with_author(event))
            .ok_or_else(|| EventRepositoryError::not_found(id))
    }

    async fn update(&self, event: &Event) -> Result<Event, EventRepositoryError> {
        let mut tables = self.lock();
        if tables.title_taken(&event.title, Some(event.id)) {
            return Err(EventRepositoryError::duplicate_title(event.title.clone()));
        }
        let stored = tables
            .events
            .iter_mut()
            .find(|stored| stored.id == event.id)
            .ok_or_else(|| EventRepositoryError::not_found(event.id))?;
        stored.title.clone_from(&event.title);
        stored.content.clone_from(&event.content);
        stored.updated_at = event.updated_at;
        let stored = stored.clone();
        Ok(tables.with_author(&stored))
    }

    async fn delete(&self, id: EventId, author_id: UserId) -> Result<u64, EventRepositoryError> {
        let mut tables = self.lock();
        let Some(position) = tables.events.iter().position(|event| event.id == id) else {
            return Err(EventRepositoryError::not_found(id));
        };
        if tables.events[position].author_id != author_id {
            return Ok(0);
        }
        tables.events.remove(position);
        Ok(1)
    }

    async fn stream_all(&self) -> Result<EventSummaryStream, EventRepositoryError> {
        let rows: Vec<_> = self
            .lock()
            .events
            .iter()
            .cloned()
            .map(|event| Ok(EventSummary::from(event)))
            .collect();
        Ok(stream::iter(rows).boxed())
    }
}

#[async_trait]
impl UserRepository for InMemoryEventStore {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserRepositoryError> {
        Ok(self.lock().user(id).cloned())
    }

    async fn find_account_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserAccount>, UserRepositoryError> {
        Ok(self
            .lock()
            .accounts
            .iter()
            .find(|account| account.user.email() == email)
            .cloned())
    }
}

#[async_trait]
impl FixtureRepository for InMemoryEventStore {
    async fn replace_all(
        &self,
        users: Vec<NewUserRecord>,
        events: Vec<NewEventRecord>,
    ) -> Result<LoadedFixtures, FixtureRepositoryError> {
        let mut tables = self.lock();
        let mut next = Tables {
            next_user_id: tables.next_user_id,
            next_event_id: tables.next_event_id,
            ..Tables::default()
        };

        for record in users {
            next.next_user_id += 1;
            let now = chrono::Utc::now();
            let user = User::new(UserDraft {
                id: UserId::new(next.next_user_id),
                display_name: record.display_name,
                email: record.email,
                created_at: now,
                updated_at: now,
            });
            next.accounts.push(UserAccount {
                user,
                credential: record.credential,
            });
        }

        for record in events {
            let author_id = next
                .accounts
                .get(record.author_position)
                .map(|account| account.user.id())
                .ok_or_else(|| FixtureRepositoryError::unknown_author(record.author_position))?;
            if next.title_taken(&record.event.title, None) {
                return Err(FixtureRepositoryError::query(format!(
                    "duplicate fixture title {}",
                    record.event.title
                )));
            }
            next.next_event_id += 1;
            let mut event = record.event;
            event.id = EventId::new(next.next_event_id);
            event.author_id = author_id;
            event.author = None;
            next.events.push(event);
        }

        let loaded = LoadedFixtures {
            users: next
                .accounts
                .iter()
                .map(|account| account.user.clone())
                .collect(),
            events: next.events.iter().map(|event| next.with_author(event)).collect(),
        };
        *tables = next;
        Ok(loaded)
    }
}
