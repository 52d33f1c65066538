//! Application settings loading from config.toml
//!
//! Every field has a default, so a missing `config.toml` is not an error.
//! `BIND_ADDRESS` and `DATABASE_URL` in the environment take precedence over the file.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP server settings
    pub server: ServerConfig,
    /// Persistence settings
    pub database: DatabaseConfig,
}

/// HTTP server settings
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address the API listens on
    pub bind_address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
        }
    }
}

/// Persistence settings
#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Connection URL; `DATABASE_URL` overrides it
    pub url: Option<String>,
}

impl AppConfig {
    /// Effective bind address after applying `BIND_ADDRESS`
    #[must_use]
    pub fn bind_address(&self) -> String {
        std::env::var("BIND_ADDRESS").unwrap_or_else(|_| self.server.bind_address.clone())
    }

    /// Effective database URL after applying `DATABASE_URL`
    #[must_use]
    pub fn database_url(&self) -> String {
        super::database::get_database_url(self.database.url.as_deref())
    }
}

/// Loads application configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads configuration from the default location (./config.toml), using
/// defaults when the file does not exist
pub fn load_default_config() -> Result<AppConfig> {
    let path = Path::new("config.toml");
    if path.exists() {
        load_config(path)
    } else {
        tracing::debug!("No config.toml found, using defaults");
        Ok(AppConfig::default())
    }
}
