use std::{env, fmt::Display, str::FromStr};

use chrono::Duration;
use log::*;
use rand::{distributions::Alphanumeric, thread_rng, Rng};
use store_common::Secret;

use crate::errors::ServerError;

const DEFAULT_STORE_HOST: &str = "127.0.0.1";
const DEFAULT_STORE_PORT: u16 = 8080;
const DEFAULT_DATABASE_URL: &str = "sqlite://data/store.db";
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 25;
const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;
const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;
const DEFAULT_ROUTER_CONCURRENCY: usize = 8;
const DEFAULT_INBOUND_QUEUE_SIZE: usize = 256;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub db_max_connections: u32,
    pub auth: AuthConfig,
    /// The capacity of every domain event queue, and of the in-process message bus.
    pub event_buffer_size: usize,
    /// The maximum number of inbound bus messages that are applied concurrently.
    pub router_concurrency: usize,
    /// How many inbound messages may wait for the router. The webhook answers 503 when the queue is full.
    pub inbound_queue_size: usize,
    /// The shared secret that bus webhook callers send as a bearer token. The webhook is disabled if it is not set.
    pub bus_webhook_token: Option<Secret<String>>,
    /// If true, the sample products are added to an empty catalog on startup.
    pub seed_sample_data: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_STORE_HOST.into(),
            port: DEFAULT_STORE_PORT,
            database_url: DEFAULT_DATABASE_URL.into(),
            db_max_connections: DEFAULT_DB_MAX_CONNECTIONS,
            auth: AuthConfig::default(),
            event_buffer_size: DEFAULT_EVENT_BUFFER_SIZE,
            router_concurrency: DEFAULT_ROUTER_CONCURRENCY,
            inbound_queue_size: DEFAULT_INBOUND_QUEUE_SIZE,
            bus_webhook_token: None,
            seed_sample_data: false,
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.into(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("STORE_HOST").ok().unwrap_or_else(|| DEFAULT_STORE_HOST.into());
        let port = parse_env("STORE_PORT", DEFAULT_STORE_PORT);
        let database_url = env::var("STORE_DATABASE_URL").ok().unwrap_or_else(|| {
            info!("🪛️ STORE_DATABASE_URL is not set. Using {DEFAULT_DATABASE_URL}");
            DEFAULT_DATABASE_URL.into()
        });
        let db_max_connections = parse_env("STORE_DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS);
        let auth = AuthConfig::try_from_env().unwrap_or_else(|e| {
            warn!("🪛️ Could not load the authentication configuration from the environment. {e}");
            AuthConfig::default()
        });
        let event_buffer_size = parse_env("STORE_EVENT_BUFFER_SIZE", DEFAULT_EVENT_BUFFER_SIZE);
        let router_concurrency = parse_env("STORE_ROUTER_CONCURRENCY", DEFAULT_ROUTER_CONCURRENCY);
        let inbound_queue_size = parse_env("STORE_INBOUND_QUEUE_SIZE", DEFAULT_INBOUND_QUEUE_SIZE);
        let bus_webhook_token = webhook_token_from_env();
        let seed_sample_data =
            env::var("STORE_SEED_SAMPLE_DATA").map(|s| &s == "1" || s.to_lowercase() == "true").unwrap_or(false);
        Self {
            host,
            port,
            database_url,
            db_max_connections,
            auth,
            event_buffer_size,
            router_concurrency,
            inbound_queue_size,
            bus_webhook_token,
            seed_sample_data,
        }
    }
}

fn webhook_token_from_env() -> Option<Secret<String>> {
    match env::var("STORE_BUS_WEBHOOK_TOKEN") {
        Ok(s) if !s.trim().is_empty() => Some(Secret::new(s.trim().to_string())),
        _ => {
            info!("🪛️ STORE_BUS_WEBHOOK_TOKEN is not set. The bus webhook is disabled");
            None
        },
    }
}

/// Reads and parses an environment variable. Missing or unparseable values fall back to `default`.
fn parse_env<T>(name: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    match env::var(name) {
        Ok(s) => s.trim().parse::<T>().unwrap_or_else(|e| {
            warn!("🪛️ Invalid configuration value for {name} ({s}). {e}. Using the default value of {default}");
            default
        }),
        Err(_) => {
            debug!("🪛️ {name} is not set. Using the default value of {default}");
            default
        },
    }
}

//-------------------------------------------------  AuthConfig  -------------------------------------------------------
#[derive(Clone, Debug)]
pub struct AuthConfig {
    /// The HS256 secret used to sign and verify access tokens.
    pub jwt_secret: Secret<String>,
    /// How long an issued access token remains valid.
    pub token_ttl: Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        warn!(
            "🚨️🚨️🚨️ The JWT signing secret has not been set. I'm using a random value for this session. DO NOT \
             operate on production like this since every access token becomes invalid when the server restarts. \
             🚨️🚨️🚨️"
        );
        let secret = thread_rng().sample_iter(&Alphanumeric).take(48).map(char::from).collect::<String>();
        Self { jwt_secret: Secret::new(secret), token_ttl: Duration::hours(DEFAULT_TOKEN_TTL_HOURS) }
    }
}

impl AuthConfig {
    pub fn new<S: Into<String>>(secret: S, token_ttl: Duration) -> Self {
        Self { jwt_secret: Secret::new(secret.into()), token_ttl }
    }

    pub fn try_from_env() -> Result<Self, ServerError> {
        let secret = env::var("STORE_JWT_SECRET")
            .map_err(|e| ServerError::ConfigurationError(format!("{e} [STORE_JWT_SECRET]")))?;
        if secret.trim().is_empty() {
            return Err(ServerError::ConfigurationError("STORE_JWT_SECRET is empty".into()));
        }
        let hours = parse_env("STORE_TOKEN_TTL_HOURS", DEFAULT_TOKEN_TTL_HOURS);
        let token_ttl = if hours > 0 {
            Duration::hours(hours)
        } else {
            warn!("🪛️ STORE_TOKEN_TTL_HOURS must be positive. Using {DEFAULT_TOKEN_TTL_HOURS} hours");
            Duration::hours(DEFAULT_TOKEN_TTL_HOURS)
        };
        Ok(Self::new(secret, token_ttl))
    }
}
