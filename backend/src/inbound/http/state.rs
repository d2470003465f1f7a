//! Shared HTTP adapter state.
//!
//! Handlers receive this via `actix_web::web::Data` so they depend only on
//! domain ports and stay testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{EventCommand, EventQuery, LoginService, TokenVerifier};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub events: Arc<dyn EventCommand>,
    pub events_query: Arc<dyn EventQuery>,
    pub login: Arc<dyn LoginService>,
    pub tokens: Arc<dyn TokenVerifier>,
}

impl HttpState {
    pub fn new(
        events: Arc<dyn EventCommand>,
        events_query: Arc<dyn EventQuery>,
        login: Arc<dyn LoginService>,
        tokens: Arc<dyn TokenVerifier>,
    ) -> Self {
        Self {
            events,
            events_query,
            login,
            tokens,
        }
    }
}
