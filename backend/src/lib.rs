//! Events backend: REST and streaming RPC access to user-authored events.
//!
//! Layout follows ports and adapters: [`domain`] holds entities, services
//! and port traits; [`inbound`] translates HTTP and WebSocket traffic;
//! [`outbound`] implements the ports over PostgreSQL, JWT and Argon2.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
