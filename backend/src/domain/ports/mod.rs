//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (`*Repository`, `TokenVerifier`, `CredentialHasher`) are
//! implemented by outbound adapters. Driving ports (`EventCommand`,
//! `EventQuery`, `LoginService`) are implemented by domain services and
//! consumed by inbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod credential_hasher;
mod event_command;
mod event_query;
mod event_repository;
mod fixture_repository;
mod identity;
mod login_service;
mod user_repository;

#[cfg(test)]
pub use credential_hasher::MockCredentialHasher;
pub use credential_hasher::{CredentialError, CredentialHasher};
#[cfg(test)]
pub use event_command::MockEventCommand;
pub use event_command::EventCommand;
#[cfg(test)]
pub use event_query::MockEventQuery;
pub use event_query::{EventFeed, EventQuery, LIST_LIMIT};
#[cfg(test)]
pub use event_repository::MockEventRepository;
pub use event_repository::{EventRepository, EventRepositoryError, EventSummaryStream};
#[cfg(test)]
pub use fixture_repository::MockFixtureRepository;
pub use fixture_repository::{
    FixtureRepository, FixtureRepositoryError, LoadedFixtures, NewEventRecord, NewUserRecord,
};
#[cfg(test)]
pub use identity::{MockTokenIssuer, MockTokenVerifier};
pub use identity::{TokenError, TokenIssuer, TokenVerifier};
#[cfg(test)]
pub use login_service::MockLoginService;
pub use login_service::LoginService;
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserRepository, UserRepositoryError};
