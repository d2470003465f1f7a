//! Domain primitives, services, and ports.
//!
//! Purpose: define the event core independent of HTTP, WebSocket, and SQL.
//! Inbound adapters call the driving ports (`EventCommand`, `EventQuery`,
//! `LoginService`); outbound adapters implement the driven ports.
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failure payload.
//! - Event / EventDraft / EventSummary: the event aggregate and projections.
//! - User / UserId / UserAccount: read-only identities and credentials.
//! - authorize: the ownership guard.
//! - EventService, CredentialLoginService: driving port implementations.
//! - load_fixtures: setup-only record replacement.

pub mod authorization;
pub mod error;
pub mod event;
pub mod event_service;
pub mod fixtures;
pub mod login_service;
pub mod ports;
pub mod trace_id;
pub mod user;

pub use self::authorization::{AuthError, authorize};
pub use self::error::{Error, ErrorCode};
pub use self::event::{
    Event, EventDraft, EventId, EventSummary, EventValidationError, MAX_TEXT_CHARS, escape_html,
};
pub use self::event_service::EventService;
pub use self::fixtures::{EventFixture, FixtureSet, UserFixture, load_fixtures};
pub use self::login_service::CredentialLoginService;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{CredentialHash, User, UserAccount, UserDraft, UserId};
