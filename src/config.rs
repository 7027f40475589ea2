//! Configuration management for the catalog server

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use sqlx::postgres::PgConnectOptions;
use std::env;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Full connection string; when absent the parts below are used
    pub url: Option<String>,
    /// Only `postgres` is supported
    pub driver: String,
    pub user: String,
    pub password: String,
    pub host: String,
    pub port: u16,
    pub name: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
    /// Insert the demo catalog when the books table is empty
    pub seed_demo_data: bool,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PaginationConfig {
    pub default_size: i64,
    pub max_size: i64,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub pagination: PaginationConfig,
}

impl AppConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let config = Config::builder()
            // Start with default configuration
            .add_source(File::with_name("config/default").required(false))
            // Layer on the environment-specific file
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Environment variables, e.g. CATALOG_SERVER__PORT=9000
            .add_source(
                Environment::with_prefix("CATALOG")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            // Override database URL from DATABASE_URL env var if present
            .set_override_option("database.url", env::var("DATABASE_URL").ok())?
            .build()?;

        config.try_deserialize()
    }
}

impl DatabaseConfig {
    /// Pool connect options. Credentials are passed as-is, never spliced into a URL.
    pub fn connect_options(&self) -> Result<PgConnectOptions, sqlx::Error> {
        match &self.url {
            Some(url) => url.parse(),
            None => Ok(PgConnectOptions::new()
                .host(&self.host)
                .port(self.port)
                .username(&self.user)
                .password(&self.password)
                .database(&self.name)),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            driver: "postgres".to_string(),
            user: "catalog".to_string(),
            password: "catalog".to_string(),
            host: "localhost".to_string(),
            port: 5432,
            name: "catalog".to_string(),
            max_connections: 10,
            min_connections: 2,
            acquire_timeout_secs: 30,
            seed_demo_data: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_size: 50,
            max_size: 100,
        }
    }
}
