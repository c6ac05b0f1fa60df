//! Configuration module for dbscribe.
//!
//! Handles the settings file, named connections and environment variables.
//! Settings are passed explicitly into every analyzer; nothing here is global.

mod connection;
mod settings;

pub use connection::{ConnectionSettings, DatabaseKind, Driver};
pub use settings::{
    expand_env_vars, AnalysisSettings, PoolSettings, SamplingSettings, Settings, SettingsError,
    WorkerSettings,
};
