//! Fixture loading for setup contexts.
//!
//! Replaces every stored user and event with a known record set. Used by
//! tests and by the opt-in `seed_fixtures` startup flag; never reachable
//! from a request handler.

use mockable::Clock;
use tracing::info;

use crate::domain::ports::{
    CredentialHasher, FixtureRepository, FixtureRepositoryError, LoadedFixtures, NewEventRecord,
    NewUserRecord,
};
use crate::domain::{Error, Event, EventDraft, UserId};

/// A user to seed, with its plaintext password.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserFixture {
    pub display_name: String,
    pub email: String,
    pub password: String,
}

/// An event to seed. `author` is the zero-based index into
/// [`FixtureSet::users`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventFixture {
    pub title: String,
    pub content: String,
    pub author: usize,
}

/// The complete record set written by [`load_fixtures`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FixtureSet {
    pub users: Vec<UserFixture>,
    pub events: Vec<EventFixture>,
}

impl FixtureSet {
    /// Two users sharing the password `password`, each owning one event.
    #[must_use]
    pub fn standard() -> Self {
        let user = |display_name: &str, email: &str| UserFixture {
            display_name: display_name.to_owned(),
            email: email.to_owned(),
            password: "password".to_owned(),
        };
        let event = |n: usize| EventFixture {
            title: format!("Title {}", n + 1),
            content: format!("Hello world {}", n + 1),
            author: n,
        };
        Self {
            users: vec![
                user("Steven victor", "steven@gmail.com"),
                user("Martin Luther", "luther@gmail.com"),
            ],
            events: vec![event(0), event(1)],
        }
    }
}

fn map_fixture_error(error: FixtureRepositoryError) -> Error {
    match error {
        FixtureRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("fixture store unavailable: {message}"))
        }
        other => Error::internal(other.to_string()),
    }
}

/// Replace all users and events in `store` with `set`.
///
/// Passwords are hashed before anything is written. Events go through the
/// same preparation and validation as API writes; the store resolves each
/// author position to the inserted user's id.
///
/// # Errors
/// An internal error when a fixture is invalid or names a missing author,
/// or the store's failure mapped to a domain error. Nothing is written on
/// failure.
pub async fn load_fixtures(
    store: &dyn FixtureRepository,
    hasher: &dyn CredentialHasher,
    clock: &dyn Clock,
    set: FixtureSet,
) -> Result<LoadedFixtures, Error> {
    let FixtureSet { users, events } = set;
    let now = clock.utc();

    let user_records = users
        .into_iter()
        .map(|fixture| {
            let credential = hasher
                .hash(&fixture.password)
                .map_err(|err| Error::internal(err.to_string()))?;
            Ok(NewUserRecord {
                display_name: fixture.display_name,
                email: fixture.email,
                credential,
            })
        })
        .collect::<Result<Vec<_>, Error>>()?;

    let event_records = events
        .into_iter()
        .map(|fixture| prepare_event(fixture, user_records.len(), now))
        .collect::<Result<Vec<_>, Error>>()?;

    let loaded = store
        .replace_all(user_records, event_records)
        .await
        .map_err(map_fixture_error)?;
    info!(
        users = loaded.users.len(),
        events = loaded.events.len(),
        "fixtures loaded"
    );
    Ok(loaded)
}

fn prepare_event(
    fixture: EventFixture,
    user_count: usize,
    now: chrono::DateTime<chrono::Utc>,
) -> Result<NewEventRecord, Error> {
    if fixture.author >= user_count {
        return Err(map_fixture_error(FixtureRepositoryError::unknown_author(
            fixture.author,
        )));
    }
    // Positional placeholder until the store assigns real ids.
    let placeholder = i64::try_from(fixture.author + 1)
        .map_err(|_| Error::internal("fixture author position out of range"))?;
    let event = Event::candidate(
        EventDraft {
            title: fixture.title,
            content: fixture.content,
            author_id: UserId::new(placeholder),
        },
        now,
    )
    .prepare(now);
    event
        .validate()
        .map_err(|err| Error::internal(format!("invalid fixture event: {err}")))?;
    Ok(NewEventRecord {
        event,
        author_position: fixture.author,
    })
}
