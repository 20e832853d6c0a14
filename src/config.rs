//! Database connection configuration
//!
//! Connection parameters come from the environment: `DATABASE_URL` wins,
//! otherwise the URL is assembled from the `DB_*` variables. A missing
//! password is a startup configuration error, never a load-time one.

use std::env;

const DEFAULT_HOST: &str = "localhost";
const DEFAULT_PORT: u16 = 5432;
const DEFAULT_DATABASE: &str = "crypto_db";
const DEFAULT_USER: &str = "postgres";

#[derive(Debug)]
pub enum ConfigError {
    MissingVar(&'static str),
    InvalidPort(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::MissingVar(var) => {
                write!(f, "{} environment variable must be set", var)
            }
            ConfigError::InvalidPort(raw) => write!(f, "DB_PORT is not a valid port: {}", raw),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    password: String,
}

impl DatabaseConfig {
    /// Read connection parameters from `DB_*` variables. Host, port,
    /// database and user have local-development defaults; the password
    /// does not.
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = match env::var("DB_PORT") {
            Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidPort(raw))?,
            Err(_) => DEFAULT_PORT,
        };
        let password = env::var("DB_PASSWORD")
            .ok()
            .filter(|p| !p.is_empty())
            .ok_or(ConfigError::MissingVar("DB_PASSWORD"))?;

        Ok(Self {
            host: env::var("DB_HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string()),
            port,
            database: env::var("DB_NAME").unwrap_or_else(|_| DEFAULT_DATABASE.to_string()),
            user: env::var("DB_USER").unwrap_or_else(|_| DEFAULT_USER.to_string()),
            password,
        })
    }

    pub fn url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.user, self.password, self.host, self.port, self.database
        )
    }
}

/// Resolve the connection string for the binaries.
pub fn database_url_from_env() -> Result<String, ConfigError> {
    if let Ok(url) = env::var("DATABASE_URL") {
        if !url.is_empty() {
            return Ok(url);
        }
    }
    Ok(DatabaseConfig::from_env()?.url())
}
