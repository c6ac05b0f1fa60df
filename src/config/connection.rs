//! Database connection configuration.
//!
//! A connection is a driver name plus a driver-specific connection string.
//! Besides the settings file, a connection can come from environment
//! variables:
//! - `DBSCRIBE_DB_DRIVER`: postgres, mysql, mariadb, sqlite, mssql, mongodb
//! - `DBSCRIBE_DB_URL`: connection string
//! - `DBSCRIBE_DB_SCHEMA`: schema or database to introspect (optional)

use std::env;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::settings::{expand_env_vars, SettingsError};
use crate::catalog::Dialect;
use crate::worker::protocol::ConnectionParams;

/// Supported database drivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Driver {
    Postgres,
    MySql,
    MariaDb,
    Sqlite,
    MsSql,
    MongoDb,
}

/// Which analysis pipeline a driver feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseKind {
    Relational,
    Document,
}

impl Driver {
    /// Parse driver from string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Result<Self, SettingsError> {
        match s.to_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(Driver::Postgres),
            "mysql" => Ok(Driver::MySql),
            "mariadb" => Ok(Driver::MariaDb),
            "sqlite" | "sqlite3" => Ok(Driver::Sqlite),
            "mssql" | "sqlserver" | "sql_server" => Ok(Driver::MsSql),
            "mongodb" | "mongo" => Ok(Driver::MongoDb),
            other => Err(SettingsError::UnsupportedDriver(other.to_string())),
        }
    }

    /// Get the driver name for the worker.
    pub fn as_str(&self) -> &'static str {
        match self {
            Driver::Postgres => "postgres",
            Driver::MySql => "mysql",
            Driver::MariaDb => "mariadb",
            Driver::Sqlite => "sqlite",
            Driver::MsSql => "mssql",
            Driver::MongoDb => "mongodb",
        }
    }

    pub fn kind(&self) -> DatabaseKind {
        match self {
            Driver::MongoDb => DatabaseKind::Document,
            _ => DatabaseKind::Relational,
        }
    }

    /// Catalog dialect, for relational drivers.
    pub fn dialect(&self) -> Option<Dialect> {
        match self {
            Driver::Postgres => Some(Dialect::Postgres),
            Driver::MySql => Some(Dialect::MySql),
            Driver::MariaDb => Some(Dialect::MariaDb),
            Driver::Sqlite => Some(Dialect::Sqlite),
            Driver::MsSql => Some(Dialect::MsSql),
            Driver::MongoDb => None,
        }
    }
}

impl fmt::Display for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Connection configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ConnectionSettings {
    /// Database driver name.
    pub driver: String,

    /// Connection string (supports ${ENV_VAR} expansion).
    pub connection_string: String,

    /// Schema (relational) or database (document) to introspect.
    #[serde(default)]
    pub schema: Option<String>,
}

impl ConnectionSettings {
    /// Load a connection from `DBSCRIBE_DB_*` environment variables.
    pub fn from_env() -> Result<Self, SettingsError> {
        let driver = env::var("DBSCRIBE_DB_DRIVER")
            .map_err(|_| SettingsError::MissingEnvVar("DBSCRIBE_DB_DRIVER".to_string()))?;
        let connection_string = env::var("DBSCRIBE_DB_URL")
            .map_err(|_| SettingsError::MissingEnvVar("DBSCRIBE_DB_URL".to_string()))?;
        let schema = env::var("DBSCRIBE_DB_SCHEMA").ok();

        let settings = Self {
            driver,
            connection_string,
            schema,
        };
        settings.driver_type()?;
        Ok(settings)
    }

    /// Get the driver type.
    pub fn driver_type(&self) -> Result<Driver, SettingsError> {
        Driver::from_str(&self.driver)
    }

    /// Get the connection string with environment variables expanded.
    pub fn resolved_connection_string(&self) -> Result<String, SettingsError> {
        expand_env_vars(&self.connection_string)
    }

    /// Build the parameters sent with every worker request.
    pub fn to_params(&self) -> Result<ConnectionParams, SettingsError> {
        Ok(ConnectionParams {
            driver: self.driver_type()?.as_str().to_string(),
            connection_string: self.resolved_connection_string()?,
            schema: self.schema.clone(),
        })
    }
}
