//! TOML-based configuration for dbscribe.
//!
//! Supports a config file (dbscribe.toml) with environment variable expansion.
//!
//! Example configuration:
//! ```toml
//! [connections.app]
//! driver = "postgres"
//! connection_string = "${APP_DATABASE_URL}"
//! schema = "public"
//!
//! [connections.events]
//! driver = "mongodb"
//! connection_string = "mongodb://localhost:27017"
//! schema = "events"
//!
//! [worker]
//! path = "./dbscribe-worker"
//! timeout_seconds = 30
//!
//! [worker.pool]
//! max_open_conns = 8
//!
//! [analysis]
//! max_concurrency = 4
//!
//! [analysis.sampling]
//! sample_size = 10
//! array_elements = 5
//! documents = 100
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use super::connection::ConnectionSettings;
use crate::worker::DEFAULT_TIMEOUT_SECS;

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Connection not found: {0}")]
    ConnectionNotFound(String),

    #[error("Unsupported driver: {0}")]
    UnsupportedDriver(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Named database connections.
    pub connections: BTreeMap<String, ConnectionSettings>,

    /// Worker configuration.
    pub worker: WorkerSettings,

    /// Analysis tuning.
    pub analysis: AnalysisSettings,
}

/// Worker configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WorkerSettings {
    /// Path to worker binary.
    pub path: Option<String>,

    /// Per-request timeout.
    pub timeout_seconds: u64,

    /// Connection pool settings.
    pub pool: PoolSettings,
}

impl Default for WorkerSettings {
    fn default() -> Self {
        Self {
            path: None,
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
            pool: PoolSettings::default(),
        }
    }
}

impl WorkerSettings {
    /// Resolve the worker binary: configured path first, then common locations.
    pub fn resolve_path(&self) -> Option<PathBuf> {
        if let Some(path) = &self.path {
            let expanded = expand_env_vars(path).ok()?;
            return Some(PathBuf::from(expanded));
        }

        let candidates = ["dbscribe-worker", "./dbscribe-worker", "./worker/dbscribe-worker"];
        candidates
            .into_iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }
}

/// Connection pool settings passed to the worker.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PoolSettings {
    /// Maximum number of idle connections per pool.
    pub max_idle_conns: u32,

    /// Maximum number of open connections per pool.
    pub max_open_conns: u32,

    /// Maximum connection lifetime (e.g., "5m", "1h").
    pub conn_max_lifetime: String,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_idle_conns: 2,
            max_open_conns: 4,
            conn_max_lifetime: "5m".to_string(),
        }
    }
}

impl PoolSettings {
    /// Convert to worker command-line arguments.
    pub fn to_worker_args(&self) -> Vec<String> {
        vec![
            "-pool".to_string(),
            format!("-pool-max-idle={}", self.max_idle_conns),
            format!("-pool-max-open={}", self.max_open_conns),
            format!("-pool-conn-lifetime={}", self.conn_max_lifetime),
        ]
    }
}

/// Analysis tuning.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AnalysisSettings {
    /// Maximum number of entities analyzed at once.
    pub max_concurrency: usize,

    /// Document sampling bounds.
    pub sampling: SamplingSettings,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            max_concurrency: 4,
            sampling: SamplingSettings::default(),
        }
    }
}

impl AnalysisSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.max_concurrency == 0 {
            return Err(SettingsError::InvalidConfig(
                "analysis.max_concurrency must be at least 1".to_string(),
            ));
        }
        self.sampling.validate()
    }
}

/// Bounds on document sampling queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct SamplingSettings {
    /// Distinct identifier values sampled per field.
    pub sample_size: usize,

    /// Leading elements taken from each array value before sampling.
    pub array_elements: usize,

    /// Documents sampled per collection for field discovery.
    pub documents: usize,
}

impl Default for SamplingSettings {
    fn default() -> Self {
        Self {
            sample_size: 10,
            array_elements: 5,
            documents: 100,
        }
    }
}

impl SamplingSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.sample_size == 0 || self.array_elements == 0 || self.documents == 0 {
            return Err(SettingsError::InvalidConfig(
                "analysis.sampling bounds must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&content)?;
        settings.analysis.validate()?;
        Ok(settings)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `DBSCRIBE_CONFIG`
    /// 2. `./dbscribe.toml`
    /// 3. `~/.config/dbscribe/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        if let Ok(path) = env::var("DBSCRIBE_CONFIG") {
            return Self::from_file(&path);
        }

        let local_config = PathBuf::from("dbscribe.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("dbscribe").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        Ok(Settings::default())
    }

    /// Get a connection by name.
    pub fn get_connection(&self, name: &str) -> Result<&ConnectionSettings, SettingsError> {
        self.connections
            .get(name)
            .ok_or_else(|| SettingsError::ConnectionNotFound(name.to_string()))
    }

    /// Get the default connection ("default" if it exists, else the first by name).
    pub fn default_connection(&self) -> Option<(&str, &ConnectionSettings)> {
        if let Some(conn) = self.connections.get("default") {
            return Some(("default", conn));
        }
        self.connections.iter().next().map(|(k, v)| (k.as_str(), v))
    }
}

/// Expand environment variables in a string.
///
/// Supports `${VAR}` and `$VAR` syntax.
pub fn expand_env_vars(s: &str) -> Result<String, SettingsError> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            result.push(c);
            continue;
        }

        let var_name = if chars.peek() == Some(&'{') {
            chars.next();
            let mut name = String::new();
            for ch in chars.by_ref() {
                if ch == '}' {
                    break;
                }
                name.push(ch);
            }
            name
        } else {
            let mut name = String::new();
            while let Some(&ch) = chars.peek() {
                if !(ch.is_alphanumeric() || ch == '_') {
                    break;
                }
                name.push(ch);
                chars.next();
            }
            if name.is_empty() {
                // Just a lone $, keep it
                result.push('$');
                continue;
            }
            name
        };

        let value =
            env::var(&var_name).map_err(|_| SettingsError::MissingEnvVar(var_name.clone()))?;
        result.push_str(&value);
    }

    Ok(result)
}
