//! Application configuration
//!
//! This module provides centralized configuration management using the `config` crate.
//! Configuration can be loaded from environment variables and config files.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

use crate::models::MAX_ATTACHMENT_BYTES;

/// Main application configuration
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub intake: IntakeConfig,
    #[serde(default)]
    pub payers: PayerCatalogConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub log: LogConfig,
}

/// HTTP server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Number of worker threads
    #[serde(default = "default_workers")]
    pub workers: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    9001
}

fn default_workers() -> usize {
    num_cpus::get()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: default_workers(),
        }
    }
}

/// Database configuration
///
/// Without a URL the service keeps submissions in memory.
#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    #[serde(default)]
    pub url: Option<String>,

    /// Maximum number of connections in the pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Connection acquire timeout in seconds
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,
}

fn default_max_connections() -> u32 {
    10
}

fn default_acquire_timeout() -> u64 {
    30
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: default_max_connections(),
            acquire_timeout_secs: default_acquire_timeout(),
        }
    }
}

/// Attachment storage configuration
#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Directory uploaded files are written to
    #[serde(default = "default_upload_dir")]
    pub upload_dir: String,

    /// Base URL uploaded files are served from
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,

    /// Largest accepted upload in bytes
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: u64,
}

fn default_upload_dir() -> String {
    "./uploads".to_string()
}

fn default_public_base_url() -> String {
    "http://localhost:9001/files".to_string()
}

fn default_max_upload_bytes() -> u64 {
    MAX_ATTACHMENT_BYTES
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_dir: default_upload_dir(),
            public_base_url: default_public_base_url(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

/// Intake workflow configuration
#[derive(Debug, Deserialize, Clone)]
pub struct IntakeConfig {
    /// Records kept by the in-memory store
    #[serde(default = "default_retention_cap")]
    pub retention_cap: usize,

    /// Submissions returned when the caller gives no limit
    #[serde(default = "default_list_limit")]
    pub default_list_limit: usize,

    /// Largest list limit honoured
    #[serde(default = "default_list_limit")]
    pub max_list_limit: usize,
}

fn default_retention_cap() -> usize {
    50
}

fn default_list_limit() -> usize {
    50
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            retention_cap: default_retention_cap(),
            default_list_limit: default_list_limit(),
            max_list_limit: default_list_limit(),
        }
    }
}

impl IntakeConfig {
    /// Effective list limit for an optional caller-supplied value
    pub fn list_limit(&self, requested: Option<i64>) -> usize {
        let max = self.max_list_limit.max(1);
        match requested {
            Some(n) if n < 1 => 1,
            Some(n) => usize::try_from(n).map_or(max, |n| n.min(max)),
            None => self.default_list_limit.clamp(1, max),
        }
    }
}

/// Payer catalog source
#[derive(Debug, Deserialize, Clone, Default)]
pub struct PayerCatalogConfig {
    /// JSON file holding an array of payers; the built-in catalog when unset
    #[serde(default)]
    pub catalog_path: Option<String>,
}

/// Cross-origin policy
#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    /// "*" or a comma-separated list of allowed origins
    #[serde(default = "default_cors_origins")]
    pub origins: String,
}

fn default_cors_origins() -> String {
    "*".to_string()
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            origins: default_cors_origins(),
        }
    }
}

impl CorsConfig {
    /// Whether every origin is accepted
    pub fn allows_any(&self) -> bool {
        self.origins.trim() == "*"
    }

    /// Explicit origins, trimmed, empties dropped
    pub fn origin_list(&self) -> Vec<String> {
        self.origins
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LogConfig {
    /// Default level for the service's own crates
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment and optional config file
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            // Start with default values
            .set_default("server.host", default_host())?
            .set_default("server.port", i64::from(default_port()))?
            .set_default("server.workers", default_workers() as i64)?
            .set_default("database.max_connections", i64::from(default_max_connections()))?
            .set_default("database.acquire_timeout_secs", default_acquire_timeout() as i64)?
            .set_default("storage.upload_dir", default_upload_dir())?
            .set_default("storage.public_base_url", default_public_base_url())?
            .set_default("storage.max_upload_bytes", default_max_upload_bytes() as i64)?
            .set_default("intake.retention_cap", default_retention_cap() as i64)?
            .set_default("intake.default_list_limit", default_list_limit() as i64)?
            .set_default("intake.max_list_limit", default_list_limit() as i64)?
            .set_default("cors.origins", default_cors_origins())?
            .set_default("log.level", default_log_level())?
            .set_default("log.json", false)?
            // Load config file if exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Load from environment variables with PRIORAUTH_ prefix
            .add_source(
                Environment::with_prefix("PRIORAUTH")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut app: AppConfig = config.try_deserialize()?;

        // Conventional variable honoured when the prefixed one is absent
        if app.database.url.is_none() {
            app.database.url = env::var("DATABASE_URL").ok().filter(|u| !u.is_empty());
        }

        Ok(app)
    }

    /// Get the server bind address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 9001);
        assert_eq!(config.storage.max_upload_bytes, 10 * 1024 * 1024);
        assert_eq!(config.intake.retention_cap, 50);
        assert!(config.database.url.is_none());
        assert!(config.cors.allows_any());
        assert_eq!(config.server_addr(), "0.0.0.0:9001");
    }

    #[test]
    fn test_list_limit_clamped() {
        let intake = IntakeConfig::default();
        assert_eq!(intake.list_limit(None), 50);
        assert_eq!(intake.list_limit(Some(10)), 10);
        assert_eq!(intake.list_limit(Some(0)), 1);
        assert_eq!(intake.list_limit(Some(-3)), 1);
        assert_eq!(intake.list_limit(Some(500)), 50);
    }

    #[test]
    fn test_cors_origin_list() {
        let cors = CorsConfig {
            origins: "http://localhost:5173, https://dash.example.com,".to_string(),
        };
        assert!(!cors.allows_any());
        assert_eq!(
            cors.origin_list(),
            vec!["http://localhost:5173", "https://dash.example.com"]
        );
    }
}
