//! HTTP server configuration object.

use std::net::SocketAddr;
use std::sync::Arc;

use events_backend::inbound::ws::state::AllowedOrigins;
use events_backend::outbound::identity::JwtTokenService;
use events_backend::outbound::persistence::DbPool;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) tokens: Option<Arc<JwtTokenService>>,
    pub(crate) allowed_origins: AllowedOrigins,
}

impl ServerConfig {
    #[must_use]
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            db_pool: None,
            tokens: None,
            allowed_origins: AllowedOrigins::default(),
        }
    }

    /// Attach the connection pool backing every repository.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Attach the bearer token issuer and verifier.
    #[must_use]
    pub fn with_token_service(mut self, tokens: Arc<JwtTokenService>) -> Self {
        self.tokens = Some(tokens);
        self
    }

    /// Restrict browser upgrades of the RPC socket to these origins.
    #[must_use]
    pub fn with_allowed_origins(mut self, origins: AllowedOrigins) -> Self {
        self.allowed_origins = origins;
        self
    }

    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
