// Configuration validation utilities

use url::Url;

use crate::config::ConfigError;

pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate database URL format
    pub fn validate_database_url(database_url: &str) -> Result<(), ConfigError> {
        if !database_url.starts_with("postgresql://") && !database_url.starts_with("postgres://") {
            return Err(
                ConfigError::Config(
                    "DATABASE_URL must be a valid PostgreSQL connection string".to_string()
                )
            );
        }

        let parsed = Url::parse(database_url).map_err(|_| {
            ConfigError::Config("DATABASE_URL is not a valid URL".to_string())
        })?;

        if parsed.host_str().is_none() {
            return Err(ConfigError::Config("DATABASE_URL must name a host".to_string()));
        }

        Ok(())
    }

    pub fn validate_port(port: u16) -> Result<(), ConfigError> {
        if port == 0 {
            return Err(ConfigError::Config("PORT must be greater than zero".to_string()));
        }
        Ok(())
    }

    pub fn validate_host(host: &str) -> Result<(), ConfigError> {
        if host.trim().is_empty() || host.contains(' ') {
            return Err(ConfigError::Config("HOST must be a valid address".to_string()));
        }
        Ok(())
    }
}
