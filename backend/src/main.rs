//! Backend entry-point: loads settings, migrates, seeds and serves.

mod server;

use std::sync::Arc;

use actix_web::web;
use color_eyre::eyre::{Result, WrapErr, eyre};
use mockable::DefaultClock;
use ortho_config::OrthoConfig;
use rand::RngCore;
use rand::rngs::OsRng;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};
use zeroize::Zeroizing;

use events_backend::domain::{FixtureSet, load_fixtures};
use events_backend::inbound::http::health::HealthState;
use events_backend::inbound::ws::state::AllowedOrigins;
use events_backend::outbound::credentials::Argon2CredentialHasher;
use events_backend::outbound::identity::JwtTokenService;
use events_backend::outbound::persistence::{
    DbPool, DieselFixtureRepository, PoolConfig, run_pending_migrations,
};
use events_backend::settings::AppSettings;
use server::{ServerConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load().map_err(|err| eyre!("failed to load settings: {err}"))?;
    let bind_addr = settings.bind_addr()?;
    let database_url = settings.database_url()?;

    run_pending_migrations(&database_url)
        .await
        .wrap_err("database migrations failed")?;
    let pool = DbPool::new(
        PoolConfig::new(database_url).with_max_size(settings.db_max_connections()),
    )
    .await
    .wrap_err("failed to build database pool")?;

    let secret = signing_secret(&settings)?;
    let tokens = Arc::new(JwtTokenService::new(
        &secret,
        settings.token_ttl(),
        Arc::new(DefaultClock),
    ));

    if settings.seed_fixtures {
        let store = DieselFixtureRepository::new(pool.clone());
        load_fixtures(
            &store,
            &Argon2CredentialHasher,
            &DefaultClock,
            FixtureSet::standard(),
        )
        .await
        .map_err(|err| eyre!("fixture loading failed: {}", err.message()))?;
    }

    let origins = AllowedOrigins::parse(settings.rpc_allowed_origins())
        .wrap_err("invalid RPC allowed origin")?;
    if origins.is_empty() {
        info!("no RPC origins configured; browser upgrades will be rejected");
    }

    let config = ServerConfig::new(bind_addr)
        .with_db_pool(pool)
        .with_token_service(tokens)
        .with_allowed_origins(origins);
    info!(addr = %config.bind_addr(), "starting server");

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), config)?;
    let result = server.await;
    health_state.mark_unhealthy();
    result.wrap_err("server terminated with an error")
}

/// Return the configured signing secret, or an ephemeral one in debug builds.
fn signing_secret(settings: &AppSettings) -> Result<Zeroizing<Vec<u8>>> {
    if let Some(secret) = settings.api_secret() {
        return Ok(Zeroizing::new(secret.as_bytes().to_vec()));
    }
    if cfg!(debug_assertions) {
        warn!("EVENTS_API_SECRET unset; using an ephemeral signing secret (dev only)");
        let mut bytes = Zeroizing::new(vec![0_u8; 32]);
        OsRng.fill_bytes(&mut bytes);
        return Ok(bytes);
    }
    Err(eyre!("EVENTS_API_SECRET must be set"))
}
