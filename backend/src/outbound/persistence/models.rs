//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::domain::{CredentialHash, Event, EventId, EventSummary, User, UserAccount, UserDraft, UserId};

use super::schema::{events, users};

/// Public user columns. Never selects the password hash.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: i64,
    pub display_name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User::new(UserDraft {
            id: UserId::new(row.id),
            display_name: row.display_name,
            email: row.email,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// User columns plus the credential hash, for login.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AccountRow {
    #[diesel(embed)]
    pub user: UserRow,
    pub password_hash: String,
}

impl From<AccountRow> for UserAccount {
    fn from(row: AccountRow) -> Self {
        UserAccount {
            user: row.user.into(),
            credential: CredentialHash::new(row.password_hash),
        }
    }
}

/// Insertable user; timestamps take the column defaults.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub display_name: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = events)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct EventRow {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub author_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EventRow {
    /// Domain event carrying `author` as its snapshot.
    pub fn into_event(self, author: UserRow) -> Event {
        Event {
            id: EventId::new(self.id),
            title: self.title,
            content: self.content,
            author_id: UserId::new(self.author_id),
            author: Some(author.into()),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl From<EventRow> for EventSummary {
    fn from(row: EventRow) -> Self {
        EventSummary {
            id: EventId::new(row.id),
            title: row.title,
            content: row.content,
            author_id: UserId::new(row.author_id),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = events)]
pub(crate) struct NewEventRow<'a> {
    pub title: &'a str,
    pub content: &'a str,
    pub author_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> NewEventRow<'a> {
    pub fn from_event(event: &'a Event, author_id: i64) -> Self {
        Self {
            title: &event.title,
            content: &event.content,
            author_id,
            created_at: event.created_at,
            updated_at: event.updated_at,
        }
    }
}

/// Mutable event columns. The author and `created_at` are never rewritten.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = events)]
pub(crate) struct EventChangeset<'a> {
    pub title: &'a str,
    pub content: &'a str,
    pub updated_at: DateTime<Utc>,
}

impl<'a> From<&'a Event> for EventChangeset<'a> {
    fn from(event: &'a Event) -> Self {
        Self {
            title: &event.title,
            content: &event.content,
            updated_at: event.updated_at,
        }
    }
}
