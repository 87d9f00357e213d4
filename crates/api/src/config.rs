//! # API Configuration Module
//!
//! Loads the server settings from environment variables, with defaults where
//! a sensible one exists.
//!
//! ## Environment Variables
//!
//! - `API_HOST`: Host address to bind to (default: "0.0.0.0")
//! - `API_PORT`: Port to listen on (default: 3000)
//! - `DATABASE_URL`: PostgreSQL connection string (required)
//! - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 5)
//! - `LOG_LEVEL`: Logging level (default: "info")
//! - `API_CORS_ORIGINS`: Comma-separated list of allowed CORS origins
//! - `API_REQUEST_TIMEOUT_SECONDS`: Per-request timeout (default: 30)

use eyre::{Result, WrapErr, eyre};
use std::env;
use tracing::Level;

/// Configuration for the timetable API server
///
/// # Example
///
/// ```no_run
/// use eyre::Result;
/// use timetable_api::config::ApiConfig;
///
/// fn example() -> Result<()> {
///     let config = ApiConfig::from_env()?;
///     println!("Starting server on {}", config.server_addr());
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host address for the API server (e.g., "127.0.0.1", "0.0.0.0")
    pub host: String,

    pub port: u16,

    /// PostgreSQL database connection string
    pub database_url: String,

    /// Maximum number of pooled database connections
    pub database_max_connections: u32,

    pub log_level: Level,

    /// CORS allowed origins (optional)
    pub cors_origins: Option<Vec<String>>,

    /// Request timeout in seconds
    pub request_timeout: u64,
}

impl ApiConfig {
    /// Creates a new ApiConfig from the process environment
    ///
    /// # Errors
    ///
    /// Fails when `DATABASE_URL` is unset, a numeric setting cannot be parsed,
    /// or the request timeout is zero.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Network settings
        let host = lookup("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = lookup("API_PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse()
            .wrap_err("Invalid API_PORT value")?;

        // Database settings
        let database_url = lookup("DATABASE_URL")
            .ok_or_else(|| eyre!("DATABASE_URL environment variable must be set"))?;
        let database_max_connections = lookup("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|| "5".to_string())
            .parse()
            .wrap_err("Invalid DATABASE_MAX_CONNECTIONS value")?;

        let log_level = parse_log_level(lookup("LOG_LEVEL").as_deref().unwrap_or("info"));

        let cors_origins = lookup("API_CORS_ORIGINS").map(|origins| {
            origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        });

        let request_timeout: u64 = lookup("API_REQUEST_TIMEOUT_SECONDS")
            .unwrap_or_else(|| "30".to_string())
            .parse()
            .wrap_err("Invalid API_REQUEST_TIMEOUT_SECONDS value")?;
        if request_timeout == 0 {
            return Err(eyre!("API_REQUEST_TIMEOUT_SECONDS must be greater than 0"));
        }

        Ok(Self {
            host,
            port,
            database_url,
            database_max_connections,
            log_level,
            cors_origins,
            request_timeout,
        })
    }

    /// Returns the server address as a string (e.g., "127.0.0.1:8080")
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_log_level(value: &str) -> Level {
    match value.to_ascii_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_only_database_url_is_set() {
        let config =
            ApiConfig::from_lookup(lookup_from(&[("DATABASE_URL", "postgres://localhost/tt")]))
                .unwrap();

        assert_eq!(config.server_addr(), "0.0.0.0:3000");
        assert_eq!(config.database_max_connections, 5);
        assert_eq!(config.log_level, Level::INFO);
        assert_eq!(config.cors_origins, None);
        assert_eq!(config.request_timeout, 30);
    }

    #[test]
    fn missing_database_url_is_an_error() {
        let err = ApiConfig::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));
    }

    #[test]
    fn invalid_port_is_an_error() {
        let result = ApiConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/tt"),
            ("API_PORT", "eighty"),
        ]));
        assert!(result.is_err());
    }

    #[test]
    fn invalid_request_timeout_is_an_error() {
        for value in ["soon", "-1", "0"] {
            let result = ApiConfig::from_lookup(lookup_from(&[
                ("DATABASE_URL", "postgres://localhost/tt"),
                ("API_REQUEST_TIMEOUT_SECONDS", value),
            ]));
            let err = result.unwrap_err();
            assert!(
                format!("{:#}", err).contains("API_REQUEST_TIMEOUT_SECONDS"),
                "{} should be rejected",
                value
            );
        }
    }

    #[test]
    fn overrides_are_parsed() {
        let config = ApiConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/tt"),
            ("API_HOST", "127.0.0.1"),
            ("API_PORT", "8080"),
            ("DATABASE_MAX_CONNECTIONS", "20"),
            ("LOG_LEVEL", "DEBUG"),
            ("API_CORS_ORIGINS", "http://a.example, http://b.example,"),
            ("API_REQUEST_TIMEOUT_SECONDS", "5"),
        ]))
        .unwrap();

        assert_eq!(config.server_addr(), "127.0.0.1:8080");
        assert_eq!(config.database_max_connections, 20);
        assert_eq!(config.log_level, Level::DEBUG);
        assert_eq!(
            config.cors_origins,
            Some(vec![
                "http://a.example".to_string(),
                "http://b.example".to_string()
            ])
        );
        assert_eq!(config.request_timeout, 5);
    }
}
