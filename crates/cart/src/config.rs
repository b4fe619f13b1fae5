//! Cart configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STRIDE_CATALOG_URL` - Base URL of the product/stock catalog
//!
//! ## Optional
//! - `STRIDE_STORAGE_DIR` - Directory for the persisted cart blob (default: ./data)
//! - `STRIDE_HTTP_TIMEOUT_SECS` - Catalog request timeout in seconds (default: 10)

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_STORAGE_DIR: &str = "./data";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Cart application configuration.
#[derive(Debug, Clone)]
pub struct CartConfig {
    /// Base URL of the product/stock catalog
    pub catalog_url: Url,
    /// Directory holding the persisted cart blob
    pub storage_dir: PathBuf,
    /// Timeout for catalog HTTP requests
    pub http_timeout: Duration,
}

impl CartConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from a `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a required variable is missing or a value
    /// fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let raw_url = std::env::var("STRIDE_CATALOG_URL")
            .map_err(|_| ConfigError::MissingEnvVar("STRIDE_CATALOG_URL".to_string()))?;
        let catalog_url = parse_url("STRIDE_CATALOG_URL", &raw_url)?;

        let storage_dir = std::env::var("STRIDE_STORAGE_DIR")
            .unwrap_or_else(|_| DEFAULT_STORAGE_DIR.to_string())
            .into();

        let http_timeout = match std::env::var("STRIDE_HTTP_TIMEOUT_SECS") {
            Ok(raw) => Duration::from_secs(parse_secs("STRIDE_HTTP_TIMEOUT_SECS", &raw)?),
            Err(_) => Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        };

        Ok(Self {
            catalog_url,
            storage_dir,
            http_timeout,
        })
    }
}

/// Parse a URL-valued variable.
fn parse_url(name: &str, raw: &str) -> Result<Url, ConfigError> {
    Url::parse(raw).map_err(|e| ConfigError::InvalidEnvVar(name.to_string(), e.to_string()))
}

/// Parse a seconds-valued variable.
fn parse_secs(name: &str, raw: &str) -> Result<u64, ConfigError> {
    raw.parse()
        .map_err(|e: std::num::ParseIntError| {
            ConfigError::InvalidEnvVar(name.to_string(), e.to_string())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_url_valid() {
        let url = parse_url("TEST_VAR", "http://localhost:3333").expect("parse");
        assert_eq!(url.as_str(), "http://localhost:3333/");
    }

    #[test]
    fn test_parse_url_invalid() {
        let result = parse_url("TEST_VAR", "not a url");
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar(_, _))));
    }

    #[test]
    fn test_parse_secs_valid() {
        assert_eq!(parse_secs("TEST_VAR", "30").expect("parse"), 30);
    }

    #[test]
    fn test_parse_secs_invalid() {
        let result = parse_secs("TEST_VAR", "soon");
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar(_, _))));
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::MissingEnvVar("STRIDE_CATALOG_URL".to_string());
        assert_eq!(
            err.to_string(),
            "Missing environment variable: STRIDE_CATALOG_URL"
        );
    }
}
