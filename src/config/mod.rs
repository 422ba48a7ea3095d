pub mod database;
pub mod logging;
pub mod paginator;
pub mod validation;

use std::{ env, net::SocketAddr };

pub use database::{ DatabaseConfig, ConfigError, StoreBackend };
pub use paginator::PaginatorConfig;

use validation::ConfigValidator;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub allowed_origin: Option<String>,
}

impl ServerConfig {
    pub fn new() -> Result<Self, ConfigError> {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = match env::var("PORT") {
            Ok(value) =>
                value
                    .parse()
                    .map_err(|e| ConfigError::Config(format!("Failed to parse PORT: {}", e)))?,
            Err(_) => 8080,
        };
        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());
        let allowed_origin = env::var("CORS_ALLOWED_ORIGIN").ok();

        ConfigValidator::validate_host(&host)?;
        ConfigValidator::validate_port(port)?;

        Ok(Self { host, port, environment, allowed_origin })
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| ConfigError::Config(format!("Invalid bind address: {}", e)))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            environment: "development".to_string(),
            allowed_origin: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub paginator: PaginatorConfig,
    pub server: ServerConfig,
}

impl Config {
    pub fn new() -> Result<Self, ConfigError> {
        Ok(Self {
            database: DatabaseConfig::new()?,
            paginator: PaginatorConfig::from_env()?,
            server: ServerConfig::new()?,
        })
    }

    /// In-memory store, default paginator and server settings.
    pub fn for_testing() -> Self {
        Self {
            database: DatabaseConfig::in_memory(),
            paginator: PaginatorConfig::default(),
            server: ServerConfig::default(),
        }
    }
}
