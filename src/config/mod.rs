//! Configuration module for the sync engine.
//!
//! All configuration is loaded from environment variables with sensible defaults.
//! Leaving `FASTEP_DATA_API_KEY` unset runs the engine in memory-only mode.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::errors::AppError;

pub const DEFAULT_DATA_API_URL: &str =
    "https://data.mongodb-api.com/app/data-backend/endpoint/data/v1";
pub const DEFAULT_DATA_SOURCE: &str = "mongodb-atlas";
pub const DEFAULT_DATABASE: &str = "fastep_work";
pub const DEFAULT_ADMIN_EMAIL: &str = "admin@fastep.work";

/// Settings for the remote document store.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// Access credential; `None` disables all network activity
    pub api_key: Option<String>,
    /// Base URL of the Data API endpoint
    pub base_url: String,
    /// Data source (cluster service) name
    pub data_source: String,
    /// Database holding all collections
    pub database: String,
    /// Per-request timeout
    pub request_timeout: Duration,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_DATA_API_URL.to_string(),
            data_source: DEFAULT_DATA_SOURCE.to_string(),
            database: DEFAULT_DATABASE.to_string(),
            request_timeout: Duration::from_secs(10),
        }
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub remote: RemoteConfig,
    /// Path to the SQLite file holding session and language scalars
    pub settings_db_path: PathBuf,
    /// Email identifying the fixed administrator account
    pub admin_email: String,
    /// Address to bind the local API to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let api_key = env::var("FASTEP_DATA_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty());

        let base_url = env::var("FASTEP_DATA_API_URL")
            .unwrap_or_else(|_| DEFAULT_DATA_API_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let data_source =
            env::var("FASTEP_DATA_SOURCE").unwrap_or_else(|_| DEFAULT_DATA_SOURCE.to_string());

        let database = env::var("FASTEP_DATABASE").unwrap_or_else(|_| DEFAULT_DATABASE.to_string());

        let timeout_secs = match env::var("FASTEP_REQUEST_TIMEOUT_SECS") {
            Ok(raw) => raw.parse::<u64>().map_err(|_| {
                AppError::Config(format!("Invalid FASTEP_REQUEST_TIMEOUT_SECS: {}", raw))
            })?,
            Err(_) => 10,
        };

        let settings_db_path = env::var("FASTEP_SETTINGS_DB_PATH")
            .unwrap_or_else(|_| "./data/settings.sqlite".to_string())
            .into();

        let admin_email =
            env::var("FASTEP_ADMIN_EMAIL").unwrap_or_else(|_| DEFAULT_ADMIN_EMAIL.to_string());

        let raw_bind = env::var("FASTEP_BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
        let bind_addr = raw_bind
            .parse()
            .map_err(|_| AppError::Config(format!("Invalid FASTEP_BIND_ADDR: {}", raw_bind)))?;

        let log_level = env::var("FASTEP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            remote: RemoteConfig {
                api_key,
                base_url,
                data_source,
                database,
                request_timeout: Duration::from_secs(timeout_secs.max(1)),
            },
            settings_db_path,
            admin_email,
            bind_addr,
            log_level,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VARS: [&str; 9] = [
        "FASTEP_DATA_API_KEY",
        "FASTEP_DATA_API_URL",
        "FASTEP_DATA_SOURCE",
        "FASTEP_DATABASE",
        "FASTEP_REQUEST_TIMEOUT_SECS",
        "FASTEP_SETTINGS_DB_PATH",
        "FASTEP_ADMIN_EMAIL",
        "FASTEP_BIND_ADDR",
        "FASTEP_LOG_LEVEL",
    ];

    // Both cases live in one test because they mutate process-wide env vars.
    #[test]
    fn test_config_from_env() {
        for var in VARS {
            env::remove_var(var);
        }

        let config = Config::from_env().unwrap();

        assert!(config.remote.api_key.is_none());
        assert_eq!(config.remote.base_url, DEFAULT_DATA_API_URL);
        assert_eq!(config.remote.database, "fastep_work");
        assert_eq!(config.remote.request_timeout, Duration::from_secs(10));
        assert_eq!(config.settings_db_path, PathBuf::from("./data/settings.sqlite"));
        assert_eq!(config.admin_email, DEFAULT_ADMIN_EMAIL);
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:8080");
        assert_eq!(config.log_level, "info");

        env::set_var("FASTEP_DATA_API_KEY", "   ");
        env::set_var("FASTEP_DATA_API_URL", "http://127.0.0.1:9999/v1/");
        env::set_var("FASTEP_REQUEST_TIMEOUT_SECS", "0");
        let config = Config::from_env().unwrap();
        assert!(config.remote.api_key.is_none());
        assert_eq!(config.remote.base_url, "http://127.0.0.1:9999/v1");
        assert_eq!(config.remote.request_timeout, Duration::from_secs(1));

        env::set_var("FASTEP_BIND_ADDR", "not-an-address");
        assert!(matches!(Config::from_env(), Err(AppError::Config(_))));

        for var in VARS {
            env::remove_var(var);
        }
    }
}
