/// Service configuration.
///
/// Loaded from a TOML file (default `surfsup.toml`), then overridden from the
/// environment. `.env` is read first so `DATABASE_URL` can live there the same
/// way it does for the integration tests.
///
/// ```toml
/// [server]
/// bind = "127.0.0.1:5000"
///
/// [database]
/// url = "postgres://surfsup@localhost/hawaii"
/// statement_timeout_secs = 10
/// # fixture = "fixtures/hawaii_sample.toml"   # serve a fixture instead of Postgres
///
/// [logging]
/// level = "info"
/// file = "logs/surfsup.log"
/// console_timestamps = true
/// ```

use crate::logging::LogLevel;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_CONFIG_PATH: &str = "surfsup.toml";
pub const DEFAULT_BIND: &str = "127.0.0.1:5000";
pub const DEFAULT_STATEMENT_TIMEOUT_SECS: u64 = 10;

pub const ENV_DATABASE_URL: &str = "DATABASE_URL";
pub const ENV_BIND: &str = "SURFSUP_BIND";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("no database configured: set DATABASE_URL, database.url, or database.fixture")]
    MissingDatabase,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    /// Applied as the session `statement_timeout`; 0 disables it.
    pub statement_timeout_secs: u64,
    /// Serve this TOML fixture from memory instead of connecting to Postgres.
    pub fixture: Option<PathBuf>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            statement_timeout_secs: DEFAULT_STATEMENT_TIMEOUT_SECS,
            fixture: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: LogLevel,
    pub file: Option<String>,
    pub console_timestamps: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            file: None,
            console_timestamps: true,
        }
    }
}

/// Where the dataset comes from, resolved from `DatabaseConfig`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSourceConfig {
    Postgres { url: String, statement_timeout_secs: u64 },
    Fixture(PathBuf),
}

impl Config {
    /// Loads configuration the way the binary does: `.env`, then the file,
    /// then process environment overrides.
    ///
    /// An explicitly requested file must exist; the default path is optional.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_PATH))?
            }
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    /// Applies environment overrides through `lookup` so tests need not touch
    /// the real process environment.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(ENV_DATABASE_URL).filter(|v| !v.trim().is_empty()) {
            self.database.url = Some(url);
        }
        if let Some(bind) = lookup(ENV_BIND).filter(|v| !v.trim().is_empty()) {
            self.server.bind = bind;
        }
    }

    /// A fixture wins over a URL so a developer can point at sample data
    /// without unsetting `DATABASE_URL`.
    pub fn data_source(&self) -> Result<DataSourceConfig, ConfigError> {
        if let Some(fixture) = &self.database.fixture {
            return Ok(DataSourceConfig::Fixture(fixture.clone()));
        }
        match &self.database.url {
            Some(url) => Ok(DataSourceConfig::Postgres {
                url: url.clone(),
                statement_timeout_secs: self.database.statement_timeout_secs,
            }),
            None => Err(ConfigError::MissingDatabase),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
