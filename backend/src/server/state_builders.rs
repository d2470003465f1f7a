//! Builders wiring adapters into the HTTP and WebSocket state bundles.

use std::io;
use std::sync::Arc;

use mockable::{Clock, DefaultClock};

use events_backend::domain::ports::{
    CredentialHasher, EventCommand, EventQuery, LoginService, TokenIssuer, TokenVerifier,
    UserRepository,
};
use events_backend::domain::{CredentialLoginService, EventService};
use events_backend::inbound::http::state::HttpState;
use events_backend::inbound::ws::state::WsState;
use events_backend::outbound::credentials::Argon2CredentialHasher;
use events_backend::outbound::persistence::{DieselEventRepository, DieselUserRepository};

use super::ServerConfig;

/// Port bundles shared by every worker.
pub(super) struct AppStates {
    pub http: HttpState,
    pub ws: WsState,
}

/// Build the domain services over the Diesel adapters.
///
/// # Errors
/// Returns [`io::Error`] when the pool or token service is missing.
pub(super) fn build_states(config: &ServerConfig) -> io::Result<AppStates> {
    let pool = config
        .db_pool
        .clone()
        .ok_or_else(|| io::Error::other("database pool not configured"))?;
    let tokens = config
        .tokens
        .clone()
        .ok_or_else(|| io::Error::other("token service not configured"))?;

    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let events = Arc::new(EventService::new(
        Arc::new(DieselEventRepository::new(pool.clone())),
        clock,
    ));
    let users: Arc<dyn UserRepository> = Arc::new(DieselUserRepository::new(pool));
    let hasher: Arc<dyn CredentialHasher> = Arc::new(Argon2CredentialHasher);
    let login: Arc<dyn LoginService> = Arc::new(CredentialLoginService::new(
        users,
        hasher,
        tokens.clone() as Arc<dyn TokenIssuer>,
    ));

    let http = HttpState::new(
        events.clone() as Arc<dyn EventCommand>,
        events.clone() as Arc<dyn EventQuery>,
        login,
        tokens as Arc<dyn TokenVerifier>,
    );
    let ws = WsState::new(
        events as Arc<dyn EventQuery>,
        config.allowed_origins.clone(),
    );
    Ok(AppStates { http, ws })
}
