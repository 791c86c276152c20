//! Configuration module
//!
//! `AppConfig` is read from TOML (default `~/.config/foo-service/config.toml`),
//! then environment overrides are applied, then it is validated. A missing
//! file yields the defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::infrastructure::DatabaseConfig;

pub const CONFIG_ENV: &str = "FOO_CONFIG";
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";
pub const MIGRATE_ON_START_ENV: &str = "MIGRATE_ON_START";
pub const ADDR_ENV: &str = "FOO_ADDR";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Default location of the config file.
pub fn default_config_path() -> PathBuf {
    dirs_next::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("foo-service")
        .join("config.toml")
}

// ── Sections ───────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Mount point of the Foo routes
    pub base_path: String,
    /// Seconds to wait for in-flight requests on shutdown
    pub shutdown_timeout: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            base_path: "/api/v1/foo".to_string(),
            shutdown_timeout: 30,
        }
    }
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Sqlite,
    Memory,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    pub backend: StorageBackend,
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    /// Seconds
    pub connect_timeout: u64,
    pub migrate_on_start: bool,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Sqlite,
            url: "sqlite://./foo.db?mode=rwc".to_string(),
            max_connections: 10,
            min_connections: 1,
            connect_timeout: 3,
            migrate_on_start: true,
        }
    }
}

impl DatabaseSettings {
    pub fn pool_config(&self) -> DatabaseConfig {
        DatabaseConfig {
            url: self.url.clone(),
            max_connections: self.max_connections,
            min_connections: self.min_connections,
            connect_timeout: Duration::from_secs(self.connect_timeout),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// `text` or `json`
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListConfig {
    pub default_limit: u64,
    pub max_limit: u64,
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            default_limit: 50,
            max_limit: 200,
        }
    }
}

// ── AppConfig ──────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseSettings,
    pub logging: LoggingConfig,
    pub list: ListConfig,
}

impl AppConfig {
    /// Read `path`, apply process environment overrides and validate.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            Self::from_toml(&raw)?
        } else {
            Self::default()
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    /// Apply `DATABASE_URL`, `MIGRATE_ON_START` and `FOO_ADDR` from `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(DATABASE_URL_ENV).filter(|v| !v.trim().is_empty()) {
            self.database.url = url;
        }

        if let Some(raw) = lookup(MIGRATE_ON_START_ENV) {
            self.database.migrate_on_start = match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                other => {
                    return Err(ConfigError::Invalid(format!(
                        "{} must be a boolean, got {:?}",
                        MIGRATE_ON_START_ENV, other
                    )))
                }
            };
        }

        if let Some(addr) = lookup(ADDR_ENV).filter(|v| !v.trim().is_empty()) {
            let (host, port) = addr.trim().rsplit_once(':').ok_or_else(|| {
                ConfigError::Invalid(format!("{} must be host:port, got {:?}", ADDR_ENV, addr))
            })?;
            let port = port.parse::<u16>().map_err(|_| {
                ConfigError::Invalid(format!("{} has an invalid port: {:?}", ADDR_ENV, port))
            })?;
            if !host.is_empty() {
                self.server.host = host.to_string();
            }
            self.server.port = port;
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let base = &self.server.base_path;
        if !base.starts_with('/') || base.len() < 2 || base.ends_with('/') {
            return Err(ConfigError::Invalid(format!(
                "server.base_path must be an absolute path like /api/v1/foo, got {:?}",
                base
            )));
        }
        if self.list.default_limit == 0 {
            return Err(ConfigError::Invalid(
                "list.default_limit must be greater than 0".to_string(),
            ));
        }
        if self.list.default_limit > self.list.max_limit {
            return Err(ConfigError::Invalid(format!(
                "list.default_limit ({}) exceeds list.max_limit ({})",
                self.list.default_limit, self.list.max_limit
            )));
        }
        if self.database.backend == StorageBackend::Sqlite && self.database.url.trim().is_empty() {
            return Err(ConfigError::Invalid("database.url is required".to_string()));
        }
        Ok(())
    }
}

// ── Build metadata ─────────────────────────────────────────────

/// Build metadata, captured once at compile time.
///
/// `commit` and `date` come from `FOO_BUILD_COMMIT` / `FOO_BUILD_DATE` when
/// set during the build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BuildInfo {
    pub name: String,
    pub version: String,
    pub commit: String,
    pub date: String,
}

impl BuildInfo {
    pub fn current() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            commit: option_env!("FOO_BUILD_COMMIT").unwrap_or("unknown").to_string(),
            date: option_env!("FOO_BUILD_DATE").unwrap_or("unknown").to_string(),
        }
    }
}
