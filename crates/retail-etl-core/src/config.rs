//! Runtime configuration for the ETL job.
//!
//! Nothing in the crate reads the environment on its own; the binary builds an
//! [`EtlConfig`] once (from a TOML file or from environment variables) and hands
//! it to the components that need it.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{EtlError, Result};

pub const DEFAULT_CSV_PATH: &str = "in_store_sales.csv";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5001";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_acquire_timeout_secs")]
    pub acquire_timeout_secs: u64,
}

impl DatabaseConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            acquire_timeout_secs: DEFAULT_ACQUIRE_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EtlConfig {
    /// Database holding the `online_sales` table.
    pub source: DatabaseConfig,
    /// Database holding the `aggregated_sales` table.
    pub warehouse: DatabaseConfig,
    #[serde(default = "default_csv_path")]
    pub csv_path: PathBuf,
    #[serde(default = "default_bind_addr")]
    pub bind_addr: SocketAddr,
}

impl EtlConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|err| {
            EtlError::Config(format!("failed to read {}: {err}", path.display()))
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|err| EtlError::Config(err.to_string()))
    }

    /// Reads configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from an arbitrary key lookup.
    ///
    /// Recognised keys: `SOURCE_DATABASE_URL` (or `RETAIL_ETL_SOURCE_DATABASE_URL`),
    /// `WAREHOUSE_DATABASE_URL` (or `RETAIL_ETL_WAREHOUSE_DATABASE_URL`),
    /// `SALES_CSV_PATH`, `ETL_BIND_ADDR` and `ETL_MAX_CONNECTIONS`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |primary: &str, fallback: &str| {
            lookup(primary).or_else(|| lookup(fallback)).ok_or_else(|| {
                EtlError::Config(format!("{primary} (or {fallback}) must be set"))
            })
        };

        let max_connections = match lookup("ETL_MAX_CONNECTIONS") {
            Some(value) => value.parse::<u32>().map_err(|err| {
                EtlError::Config(format!("ETL_MAX_CONNECTIONS '{value}' is invalid: {err}"))
            })?,
            None => DEFAULT_MAX_CONNECTIONS,
        };

        let bind_addr = match lookup("ETL_BIND_ADDR") {
            Some(value) => value.parse::<SocketAddr>().map_err(|err| {
                EtlError::Config(format!("ETL_BIND_ADDR '{value}' is invalid: {err}"))
            })?,
            None => default_bind_addr(),
        };

        let database = |url: String| DatabaseConfig {
            max_connections,
            ..DatabaseConfig::new(url)
        };

        Ok(Self {
            source: database(required(
                "SOURCE_DATABASE_URL",
                "RETAIL_ETL_SOURCE_DATABASE_URL",
            )?),
            warehouse: database(required(
                "WAREHOUSE_DATABASE_URL",
                "RETAIL_ETL_WAREHOUSE_DATABASE_URL",
            )?),
            csv_path: lookup("SALES_CSV_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(default_csv_path),
            bind_addr,
        })
    }
}

fn default_max_connections() -> u32 {
    DEFAULT_MAX_CONNECTIONS
}

fn default_acquire_timeout_secs() -> u64 {
    DEFAULT_ACQUIRE_TIMEOUT_SECS
}

fn default_csv_path() -> PathBuf {
    PathBuf::from(DEFAULT_CSV_PATH)
}

fn default_bind_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 5001))
}
