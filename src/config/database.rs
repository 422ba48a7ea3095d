use std::{ env, str::FromStr, time::Duration };

use thiserror::Error;
use diesel::{ PgConnection, r2d2::{ Pool, ConnectionManager, PoolError as R2D2Error } };
use serde::Deserialize;

use crate::config::validation::ConfigValidator;

pub type PgPool = Pool<ConnectionManager<PgConnection>>;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Environment variable not found: {0}")] MissingEnv(#[from] env::VarError),

    #[error("Configuration error: {0}")] Config(String),

    #[error("Connection pool error: {0}")] Pool(#[from] R2D2Error),
}

/// Which document store backs the report service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Memory,
    Postgres,
}

impl FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(StoreBackend::Memory),
            "postgres" | "postgresql" => Ok(StoreBackend::Postgres),
            other =>
                Err(
                    ConfigError::Config(
                        format!("STORE_BACKEND must be 'memory' or 'postgres', got '{}'", other)
                    )
                ),
        }
    }
}

/*
The r2d2 pool cannot be deserialized, so the database settings are split in two:
      - RawDatabaseConfig holds the values read from the environment
      - DatabaseConfig is the validated form; the pool is only built on demand
*/

#[derive(Debug, Deserialize, Clone)]
pub struct RawDatabaseConfig {
    pub backend: StoreBackend,
    pub database_url: Option<String>,
    pub pool_size: u32,
}

impl RawDatabaseConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pool_size == 0 {
            return Err(ConfigError::Config("DATABASE_POOL_SIZE must be greater than zero".into()));
        }
        if self.backend == StoreBackend::Postgres {
            match self.database_url.as_deref() {
                Some(url) if !url.trim().is_empty() => ConfigValidator::validate_database_url(url)?,
                _ => {
                    return Err(
                        ConfigError::Config(
                            "DATABASE_URL is required when STORE_BACKEND is postgres".into()
                        )
                    );
                }
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub backend: StoreBackend,
    pub database_url: Option<String>,
    pub pool_size: u32,
}

impl DatabaseConfig {
    /// Build from a RawDatabaseConfig (which contains loaded fields).
    pub fn from_raw(raw: RawDatabaseConfig) -> Result<Self, ConfigError> {
        raw.validate()?;

        Ok(Self {
            backend: raw.backend,
            database_url: raw.database_url,
            pool_size: raw.pool_size,
        })
    }

    /// Load from environment variables and build the config.
    pub fn new() -> Result<Self, ConfigError> {
        let backend = match env::var("STORE_BACKEND") {
            Ok(value) => value.parse()?,
            Err(env::VarError::NotPresent) => StoreBackend::Memory,
            Err(e) => {
                return Err(e.into());
            }
        };

        let raw = RawDatabaseConfig {
            backend,
            database_url: env::var("DATABASE_URL").ok(),
            pool_size: match env::var("DATABASE_POOL_SIZE") {
                Ok(value) =>
                    value
                        .parse()
                        .map_err(|e| {
                            ConfigError::Config(
                                format!("Failed to parse DATABASE_POOL_SIZE: {}", e)
                            )
                        })?,
                Err(_) => 15,
            },
        };

        DatabaseConfig::from_raw(raw)
    }

    /// Builds the r2d2 pool for the postgres backend.
    pub fn build_pool(&self) -> Result<PgPool, ConfigError> {
        let url = self.database_url
            .as_deref()
            .ok_or_else(|| ConfigError::Config("DATABASE_URL is not set".into()))?;

        let manager = ConnectionManager::<PgConnection>::new(url);
        let pool = Pool::builder()
            .max_size(self.pool_size)
            .connection_timeout(Duration::from_secs(5))
            .build(manager)?;

        Ok(pool)
    }

    // FOR TESTING PURPOSES
    pub fn in_memory() -> Self {
        Self {
            backend: StoreBackend::Memory,
            database_url: None,
            pool_size: 1,
        }
    }
}
