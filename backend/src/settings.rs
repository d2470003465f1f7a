//! Process settings loaded via OrthoConfig.
//!
//! Values merge from `EVENTS_*` environment variables, CLI flags and config
//! files. Every field is optional; accessors apply the defaults.

use std::net::SocketAddr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Deserializer};
use thiserror::Error;
use url::Url;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_DB_HOST: &str = "localhost";
const DEFAULT_DB_PORT: u16 = 5432;
const DEFAULT_DB_USER: &str = "postgres";
const DEFAULT_DB_NAME: &str = "events";
const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_TOKEN_TTL_SECS: u64 = 3600;

/// Settings failures surfaced at startup.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("invalid bind address {value:?}: {source}")]
    BindAddr {
        value: String,
        source: std::net::AddrParseError,
    },
    #[error("cannot compose database URL: {message}")]
    DatabaseUrl { message: String },
}

/// Runtime configuration for the events backend.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "EVENTS")]
pub struct AppSettings {
    /// Socket address for the HTTP listener.
    pub bind_addr: Option<String>,
    /// Full PostgreSQL URL. Takes precedence over the `db_*` parts.
    pub database_url: Option<String>,
    pub db_host: Option<String>,
    pub db_port: Option<u16>,
    pub db_user: Option<String>,
    pub db_password: Option<String>,
    pub db_name: Option<String>,
    /// Upper bound on pooled connections.
    pub db_max_connections: Option<u32>,
    /// HS256 signing secret for bearer tokens.
    pub api_secret: Option<String>,
    /// Lifetime of issued bearer tokens, in seconds.
    pub token_ttl_secs: Option<u64>,
    /// Replace all users and events with the standard fixtures on startup.
    #[ortho_config(default = false)]
    pub seed_fixtures: bool,
    /// Browser origins allowed to open the RPC socket.
    ///
    /// `EVENTS_RPC_ALLOWED_ORIGINS` takes a comma-separated list.
    #[serde(default, deserialize_with = "origin_list")]
    pub rpc_allowed_origins: Option<Vec<String>>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OriginList {
    One(String),
    Many(Vec<String>),
}

/// Accept a list, or a single value, which arrives as a plain string when
/// the environment variable holds no comma.
fn origin_list<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<OriginList>::deserialize(deserializer)?;
    Ok(raw.map(|list| match list {
        OriginList::One(value) => value.split(',').map(str::to_owned).collect(),
        OriginList::Many(values) => values,
    }))
}

impl AppSettings {
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|source| SettingsError::BindAddr {
            value: raw.to_owned(),
            source,
        })
    }

    /// Return `database_url`, or compose one from the `db_*` parts.
    pub fn database_url(&self) -> Result<String, SettingsError> {
        if let Some(url) = &self.database_url {
            return Ok(url.clone());
        }

        let fail = |message: &str| SettingsError::DatabaseUrl {
            message: message.to_owned(),
        };
        let mut url = Url::parse("postgres://localhost").map_err(|err| fail(&err.to_string()))?;
        url.set_host(Some(self.db_host.as_deref().unwrap_or(DEFAULT_DB_HOST)))
            .map_err(|err| fail(&err.to_string()))?;
        url.set_port(Some(self.db_port.unwrap_or(DEFAULT_DB_PORT)))
            .map_err(|()| fail("port rejected"))?;
        url.set_username(self.db_user.as_deref().unwrap_or(DEFAULT_DB_USER))
            .map_err(|()| fail("user rejected"))?;
        url.set_password(self.db_password.as_deref().filter(|p| !p.is_empty()))
            .map_err(|()| fail("password rejected"))?;
        url.set_path(self.db_name.as_deref().unwrap_or(DEFAULT_DB_NAME));
        Ok(url.into())
    }

    pub fn db_max_connections(&self) -> u32 {
        self.db_max_connections.unwrap_or(DEFAULT_MAX_CONNECTIONS)
    }

    pub fn api_secret(&self) -> Option<&str> {
        self.api_secret.as_deref().filter(|secret| !secret.is_empty())
    }

    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.token_ttl_secs.unwrap_or(DEFAULT_TOKEN_TTL_SECS))
    }

    /// Trimmed, non-empty origin entries.
    pub fn rpc_allowed_origins(&self) -> Vec<&str> {
        self.rpc_allowed_origins
            .iter()
            .flatten()
            .map(|entry| entry.trim())
            .filter(|entry| !entry.is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for settings parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 12] = [
        "EVENTS_BIND_ADDR",
        "EVENTS_DATABASE_URL",
        "EVENTS_DB_HOST",
        "EVENTS_DB_PORT",
        "EVENTS_DB_USER",
        "EVENTS_DB_PASSWORD",
        "EVENTS_DB_NAME",
        "EVENTS_DB_MAX_CONNECTIONS",
        "EVENTS_API_SECRET",
        "EVENTS_TOKEN_TTL_SECS",
        "EVENTS_SEED_FIXTURES",
        "EVENTS_RPC_ALLOWED_ORIGINS",
    ];

    fn load_with(overrides: &[(&str, &str)]) -> AppSettings {
        let _guard = lock_env(VARS.map(|name| {
            let value = overrides
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value).to_owned());
            (name, value)
        }));
        AppSettings::load_from_iter([OsString::from("events-backend")])
            .expect("config should load")
    }

    #[rstest]
    fn defaults_apply_when_unset() {
        let settings = load_with(&[]);

        assert_eq!(
            settings.bind_addr().expect("bind addr"),
            "0.0.0.0:8080".parse::<SocketAddr>().expect("addr")
        );
        assert_eq!(
            settings.database_url().expect("url"),
            "postgres://postgres@localhost:5432/events"
        );
        assert_eq!(settings.db_max_connections(), 10);
        assert_eq!(settings.token_ttl(), Duration::from_secs(3600));
        assert!(settings.api_secret().is_none());
        assert!(!settings.seed_fixtures);
        assert!(settings.rpc_allowed_origins().is_empty());
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let settings = load_with(&[
            ("EVENTS_BIND_ADDR", "127.0.0.1:9000"),
            ("EVENTS_DB_HOST", "db"),
            ("EVENTS_DB_PORT", "6543"),
            ("EVENTS_DB_USER", "app"),
            ("EVENTS_DB_PASSWORD", "p@ss"),
            ("EVENTS_DB_NAME", "fullstack"),
            ("EVENTS_API_SECRET", "s3cret"),
            ("EVENTS_TOKEN_TTL_SECS", "60"),
            ("EVENTS_SEED_FIXTURES", "true"),
            (
                "EVENTS_RPC_ALLOWED_ORIGINS",
                "http://localhost:3000, https://events.example ,",
            ),
        ]);

        assert_eq!(
            settings.bind_addr().expect("bind addr").to_string(),
            "127.0.0.1:9000"
        );
        assert_eq!(
            settings.database_url().expect("url"),
            "postgres://app:p%40ss@db:6543/fullstack"
        );
        assert_eq!(settings.api_secret(), Some("s3cret"));
        assert_eq!(settings.token_ttl(), Duration::from_secs(60));
        assert!(settings.seed_fixtures);
        assert_eq!(
            settings.rpc_allowed_origins(),
            ["http://localhost:3000", "https://events.example"]
        );
    }

    #[rstest]
    #[case::single("http://localhost:3000", &["http://localhost:3000"])]
    #[case::pair(
        "http://localhost:3000,https://events.example",
        &["http://localhost:3000", "https://events.example"]
    )]
    fn allowed_origins_accept_one_or_many(#[case] raw: &str, #[case] expected: &[&str]) {
        let settings = load_with(&[("EVENTS_RPC_ALLOWED_ORIGINS", raw)]);
        assert_eq!(settings.rpc_allowed_origins(), expected);
    }

    #[rstest]
    fn explicit_database_url_wins() {
        let settings = load_with(&[
            ("EVENTS_DATABASE_URL", "postgres://u:p@h/d"),
            ("EVENTS_DB_HOST", "ignored"),
        ]);
        assert_eq!(settings.database_url().expect("url"), "postgres://u:p@h/d");
    }

    #[rstest]
    fn malformed_bind_addr_is_reported() {
        let settings = load_with(&[("EVENTS_BIND_ADDR", "not-an-addr")]);
        assert!(matches!(
            settings.bind_addr(),
            Err(SettingsError::BindAddr { .. })
        ));
    }
}
