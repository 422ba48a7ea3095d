use std::env;

use serde::Deserialize;
use validator::Validate;

use crate::config::ConfigError;

pub const DEFAULT_PAGE: u32 = 0;
pub const DEFAULT_SIZE: u32 = 20;
pub const DEFAULT_MAX_SIZE: u32 = 100;

/// System-wide paging defaults used when a caller omits or mangles `page`/`size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Validate)]
pub struct PaginatorConfig {
    pub default_page: u32,
    #[validate(range(min = 1))]
    pub default_size: u32,
    #[validate(range(min = 1))]
    pub max_size: u32,
}

impl Default for PaginatorConfig {
    fn default() -> Self {
        Self {
            default_page: DEFAULT_PAGE,
            default_size: DEFAULT_SIZE,
            max_size: DEFAULT_MAX_SIZE,
        }
    }
}

impl PaginatorConfig {
    pub fn new(default_page: u32, default_size: u32, max_size: u32) -> Result<Self, ConfigError> {
        let config = Self {
            default_page,
            default_size,
            max_size,
        };
        config.check()?;
        Ok(config)
    }

    /// Reads `PAGINATOR_PAGE`, `PAGINATOR_SIZE` and `PAGINATOR_MAX_SIZE`, falling back to 0/20/100.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::new(
            read_u32("PAGINATOR_PAGE", DEFAULT_PAGE)?,
            read_u32("PAGINATOR_SIZE", DEFAULT_SIZE)?,
            read_u32("PAGINATOR_MAX_SIZE", DEFAULT_MAX_SIZE)?
        )
    }

    pub fn check(&self) -> Result<(), ConfigError> {
        self.validate().map_err(|e| ConfigError::Config(format!("Invalid paginator: {}", e)))?;

        // the default must itself be a size a caller is allowed to ask for
        if self.default_size > self.max_size {
            return Err(
                ConfigError::Config(
                    format!(
                        "PAGINATOR_SIZE ({}) cannot exceed PAGINATOR_MAX_SIZE ({})",
                        self.default_size,
                        self.max_size
                    )
                )
            );
        }

        Ok(())
    }
}

fn read_u32(key: &str, fallback: u32) -> Result<u32, ConfigError> {
    match env::var(key) {
        Ok(value) =>
            value
                .trim()
                .parse()
                .map_err(|e| ConfigError::Config(format!("Failed to parse {}: {}", key, e))),
        Err(_) => Ok(fallback),
    }
}
