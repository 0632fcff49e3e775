//! Service configuration from environment variables.
//!
//! Both services and the converter read their settings from the environment
//! (with a `.env` file honored via dotenvy in each binary's `main`).

use anyhow::{Context, Result};
use std::path::PathBuf;

/// Default location of the partitioned Parquet store, relative to the
/// working directory.
pub const DEFAULT_DATA_ROOT: &str = "data/parquet";

/// Query Service settings.
///
/// | Env Var | Default | Purpose |
/// |---------|---------|---------|
/// | `DATA_ROOT` | `data/parquet` | Root of the Parquet partition tree |
/// | `PORT` | `8000` | HTTP listen port |
#[derive(Debug, Clone)]
pub struct QueryApiConfig {
    pub data_root: PathBuf,
    pub port: u16,
}

impl QueryApiConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            data_root: data_root_from_env(),
            port: port_from_env("PORT", 8000)?,
        })
    }
}

/// Proxy/frontend settings.
///
/// | Env Var | Default | Purpose |
/// |---------|---------|---------|
/// | `DATA_API_URL` | `http://127.0.0.1:8000` | Query Service base URL |
/// | `PORT` | `8001` | HTTP listen port |
#[derive(Debug, Clone)]
pub struct FrontendConfig {
    pub data_api_url: String,
    pub port: u16,
}

impl FrontendConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            data_api_url: std::env::var("DATA_API_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:8000".to_string()),
            port: port_from_env("PORT", 8001)?,
        })
    }
}

/// Converter settings.
///
/// | Env Var | Default | Purpose |
/// |---------|---------|---------|
/// | `SOURCE_DIR` | (required) | Directory holding `*_minute.csv` files |
/// | `DATA_ROOT` | `data/parquet` | Output root for Parquet partitions |
#[derive(Debug, Clone)]
pub struct ConverterConfig {
    pub source_dir: PathBuf,
    pub data_root: PathBuf,
}

impl ConverterConfig {
    pub fn from_env() -> Result<Self> {
        let source_dir = std::env::var("SOURCE_DIR")
            .context("SOURCE_DIR must point at the directory of *_minute.csv files")?;
        Ok(Self {
            source_dir: PathBuf::from(source_dir),
            data_root: data_root_from_env(),
        })
    }
}

fn data_root_from_env() -> PathBuf {
    std::env::var("DATA_ROOT").map_or_else(|_| PathBuf::from(DEFAULT_DATA_ROOT), PathBuf::from)
}

fn port_from_env(var: &str, default: u16) -> Result<u16> {
    match std::env::var(var) {
        Ok(raw) => raw
            .parse::<u16>()
            .with_context(|| format!("{var} must be a port number, got {raw:?}")),
        Err(_) => Ok(default),
    }
}
