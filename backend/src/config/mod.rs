//! Configuration management for the blog backend
//!
//! Configuration is loaded hierarchically:
//! 1. Default values (in code)
//! 2. TOML config files (config/development.toml or config/production.toml)
//! 3. Environment variables (prefix: BLOG__)
//! 4. `PORT`, which overrides `server.port` when set

use anyhow::{Context, Result};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::env;

/// Default session signing secret, rejected in production
pub const DEVELOPMENT_SESSION_SECRET: &str = "development-session-secret-change-in-production";

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub session: SessionConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub api: ApiConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Which implementation backs a store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Postgres,
    Redis,
    Memory,
}

/// Document database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub backend: StoreBackend,
    pub user: String,
    /// Database password (secret)
    #[serde(skip_serializing, default = "default_database_password")]
    pub password: SecretString,
    pub host: String,
    pub port: u16,
    pub name: String,
    pub max_connections: u32,
}

impl DatabaseConfig {
    /// Assemble the connection string from its parts
    pub fn url(&self) -> SecretString {
        SecretString::from(format!(
            "postgres://{}:{}@{}:{}/{}",
            self.user,
            self.password.expose_secret(),
            self.host,
            self.port,
            self.name
        ))
    }
}

/// Session store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConfig {
    pub backend: StoreBackend,
    pub url: String,
    pub port: u16,
}

impl RedisConfig {
    /// Full connection url including the port
    pub fn connection_url(&self) -> String {
        format!("{}:{}", self.url.trim_end_matches('/'), self.port)
    }
}

/// Session cookie configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Cookie signing secret
    #[serde(skip_serializing, default = "default_session_secret")]
    pub secret: SecretString,
    pub ttl_secs: u64,
    pub cookie_name: String,
    pub secure: bool,
}

// Secrets are never serialized, so the layered loader falls back to these
fn default_database_password() -> SecretString {
    SecretString::from("postgres".to_string())
}

fn default_session_secret() -> SecretString {
    SecretString::from(DEVELOPMENT_SESSION_SECRET.to_string())
}

fn parse_port(value: Option<String>) -> Result<Option<u16>> {
    value
        .map(|v| {
            v.trim()
                .parse::<u16>()
                .with_context(|| format!("Invalid PORT value '{}'", v))
        })
        .transpose()
}

/// Password hashing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub bcrypt_cost: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self { bcrypt_cost: 12 }
    }
}

/// Response shaping configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Flatten every failure to `400 {"status":"failed"}` and report
    /// missing posts as `null`
    pub compat_mode: bool,
    /// Require a live session for post writes
    pub protect_posts: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            compat_mode: true,
            protect_posts: false,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 3000,
            },
            database: DatabaseConfig {
                backend: StoreBackend::Postgres,
                user: "postgres".to_string(),
                password: default_database_password(),
                host: "localhost".to_string(),
                port: 5432,
                name: "blog".to_string(),
                max_connections: 10,
            },
            redis: RedisConfig {
                backend: StoreBackend::Redis,
                url: "redis://localhost".to_string(),
                port: 6379,
            },
            session: SessionConfig {
                secret: default_session_secret(),
                ttl_secs: 30,
                cookie_name: "sid".to_string(),
                secure: false,
            },
            auth: AuthConfig::default(),
            api: ApiConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from files and environment
    ///
    /// Loading order (later sources override earlier):
    /// 1. Default values
    /// 2. Config file based on RUST_ENV (development.toml or production.toml)
    /// 3. Environment variables with BLOG__ prefix
    /// 4. `PORT`
    pub fn load() -> Result<Self> {
        let env = env::var("RUST_ENV").unwrap_or_else(|_| "development".to_string());
        let config_file = format!("config/{}.toml", env);

        let config = config::Config::builder()
            .add_source(config::Config::try_from(&AppConfig::default())?)
            .add_source(config::File::with_name(&config_file).required(false))
            // e.g., BLOG__SESSION__TTL_SECS=3600 sets session.ttl_secs
            .add_source(config::Environment::with_prefix("BLOG").separator("__"))
            .set_override_option("server.port", parse_port(env::var("PORT").ok())?)?
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Check if running in production mode
    pub fn is_production() -> bool {
        env::var("RUST_ENV")
            .map(|v| v == "production")
            .unwrap_or(false)
    }

    /// Configuration backed entirely by in-process stores
    pub fn in_memory() -> Self {
        let mut config = Self::default();
        config.database.backend = StoreBackend::Memory;
        config.redis.backend = StoreBackend::Memory;
        config
    }
}
