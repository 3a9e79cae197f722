//! Service configuration
//!
//! [`Config::load`] reads `.env` (if present) and then the process
//! environment. Anything unset falls back to a local-development default.
//!
//! | Variable | Default |
//! |---|---|
//! | `APP_ENV` | `dev` (`prod` selects PostgreSQL) |
//! | `FLEAMARKET_HOST` / `FLEAMARKET_PORT` | `127.0.0.1` / `8080` |
//! | `FLEAMARKET_SHUTDOWN_TIMEOUT` | `30` seconds |
//! | `DATABASE_URL` | `postgresql://localhost/fleamarket` |
//! | `DATABASE_MAX_CONNECTIONS` / `DATABASE_MIN_CONNECTIONS` | `10` / `2` |
//! | `DATABASE_CONNECT_TIMEOUT` | `10` seconds |
//! | `CORS_ALLOWED_ORIGINS` | `http://localhost:3000` (comma-separated, `*` for any) |
//! | `CORS_ALLOW_CREDENTIALS` | `true` |
//! | `IMPORT_FILE_PATH` | `./data/sample_data_100000.csv` |
//! | `IMPORT_POOL_SIZE` | `30` |

use anyhow::{bail, Context, Result};
use serde::Serialize;
use std::fmt::Display;
use std::net::SocketAddr;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::str::FromStr;

use crate::import::DEFAULT_POOL_SIZE;

/// Runtime environment; selects the storage backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// PostgreSQL storage
    Prod,
    /// In-memory storage
    #[default]
    Dev,
}

impl Environment {
    fn from_env_value(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Prod,
            _ => Self::Dev,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Config {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub cors: CorsConfig,
    pub import: ImportConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub shutdown_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            shutdown_timeout_secs: 30,
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", self.host, self.port))
    }
}

/// Only consulted when [`Environment::Prod`] is selected
#[derive(Debug, Clone, Serialize)]
pub struct DatabaseConfig {
    #[serde(skip_serializing)]
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgresql://localhost/fleamarket".to_string(),
            max_connections: 10,
            min_connections: 2,
            connect_timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CorsConfig {
    /// Empty or containing `*` means any origin
    pub allowed_origins: Vec<String>,
    pub allow_credentials: bool,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["http://localhost:3000".to_string()],
            allow_credentials: true,
        }
    }
}

fn split_origins(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Bulk import settings
#[derive(Debug, Clone, Serialize)]
pub struct ImportConfig {
    /// File processed by `POST /api/v1/csv/process`
    pub file_path: PathBuf,
    /// Concurrent import workers; must be positive
    pub pool_size: usize,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            file_path: PathBuf::from("./data/sample_data_100000.csv"),
            pool_size: DEFAULT_POOL_SIZE.get(),
        }
    }
}

impl ImportConfig {
    pub fn pool_size(&self) -> Result<NonZeroUsize> {
        NonZeroUsize::new(self.pool_size)
            .context("IMPORT_POOL_SIZE must be greater than 0")
    }
}

/// Typed view over a key lookup, so parsing can be tested without touching
/// the process environment
struct Vars<F>(F);

impl<F> Vars<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn text(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|value| !value.trim().is_empty())
    }

    fn parse<T>(&self, key: &str, default: T) -> Result<T>
    where
        T: FromStr,
        T::Err: Display,
    {
        match self.text(key) {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|e| anyhow::anyhow!("{}={:?} is invalid: {}", key, raw, e)),
            None => Ok(default),
        }
    }
}

impl Config {
    /// Load from `.env` and the environment, then validate
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars(lookup);
        let defaults = Config::default();

        let config = Config {
            environment: vars
                .text("APP_ENV")
                .map(|value| Environment::from_env_value(&value))
                .unwrap_or_default(),
            server: ServerConfig {
                host: vars.text("FLEAMARKET_HOST").unwrap_or(defaults.server.host),
                port: vars.parse("FLEAMARKET_PORT", defaults.server.port)?,
                shutdown_timeout_secs: vars.parse(
                    "FLEAMARKET_SHUTDOWN_TIMEOUT",
                    defaults.server.shutdown_timeout_secs,
                )?,
            },
            database: DatabaseConfig {
                url: vars.text("DATABASE_URL").unwrap_or(defaults.database.url),
                max_connections: vars
                    .parse("DATABASE_MAX_CONNECTIONS", defaults.database.max_connections)?,
                min_connections: vars
                    .parse("DATABASE_MIN_CONNECTIONS", defaults.database.min_connections)?,
                connect_timeout_secs: vars.parse(
                    "DATABASE_CONNECT_TIMEOUT",
                    defaults.database.connect_timeout_secs,
                )?,
            },
            cors: CorsConfig {
                allowed_origins: vars
                    .text("CORS_ALLOWED_ORIGINS")
                    .map(|value| split_origins(&value))
                    .unwrap_or(defaults.cors.allowed_origins),
                allow_credentials: vars
                    .parse("CORS_ALLOW_CREDENTIALS", defaults.cors.allow_credentials)?,
            },
            import: ImportConfig {
                file_path: vars
                    .text("IMPORT_FILE_PATH")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.import.file_path),
                pool_size: vars.parse("IMPORT_POOL_SIZE", defaults.import.pool_size)?,
            },
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            bail!("FLEAMARKET_PORT must be greater than 0");
        }

        self.import.pool_size()?;

        if self.environment == Environment::Prod {
            let db = &self.database;
            if db.url.is_empty() {
                bail!("DATABASE_URL is required in prod");
            }
            if db.max_connections == 0 {
                bail!("DATABASE_MAX_CONNECTIONS must be greater than 0");
            }
            if db.min_connections > db.max_connections {
                bail!(
                    "DATABASE_MIN_CONNECTIONS ({}) exceeds DATABASE_MAX_CONNECTIONS ({})",
                    db.min_connections,
                    db.max_connections
                );
            }
        }

        if self.cors.allowed_origins.is_empty() {
            tracing::warn!("CORS_ALLOWED_ORIGINS is empty; any origin will be accepted");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_pairs(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_environment_is_empty() {
        let config = from_pairs(&[]).unwrap();

        assert_eq!(config.environment, Environment::Dev);
        assert_eq!(config.server.bind_addr().unwrap().port(), 8080);
        assert_eq!(config.import.pool_size().unwrap(), DEFAULT_POOL_SIZE);
        assert_eq!(config.cors.allowed_origins, vec!["http://localhost:3000"]);
    }

    #[test]
    fn test_overrides_are_applied() {
        let config = from_pairs(&[
            ("APP_ENV", "production"),
            ("FLEAMARKET_PORT", "9090"),
            ("IMPORT_POOL_SIZE", "4"),
            ("IMPORT_FILE_PATH", "/srv/import/customers.csv"),
            ("CORS_ALLOWED_ORIGINS", "https://a.example, https://b.example,"),
            ("DATABASE_URL", "postgresql://db/fleamarket"),
        ])
        .unwrap();

        assert_eq!(config.environment, Environment::Prod);
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.import.pool_size, 4);
        assert_eq!(config.import.file_path, PathBuf::from("/srv/import/customers.csv"));
        assert_eq!(
            config.cors.allowed_origins,
            vec!["https://a.example", "https://b.example"]
        );
    }

    #[test]
    fn test_unparsable_number_is_an_error() {
        let err = from_pairs(&[("IMPORT_POOL_SIZE", "lots")]).unwrap_err();
        assert!(err.to_string().contains("IMPORT_POOL_SIZE"));
    }

    #[test]
    fn test_zero_pool_size_rejected() {
        assert!(from_pairs(&[("IMPORT_POOL_SIZE", "0")]).is_err());
    }

    #[test]
    fn test_database_bounds_checked_in_prod_only() {
        let mut config = Config::default();
        config.database.min_connections = 20;
        assert!(config.validate().is_ok());

        config.environment = Environment::Prod;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_environment_parsing() {
        assert_eq!(Environment::from_env_value(" PROD "), Environment::Prod);
        assert_eq!(Environment::from_env_value("staging"), Environment::Dev);
    }
}
