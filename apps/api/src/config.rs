use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::autosave::DEFAULT_DEBOUNCE;
use crate::resume::history::DEFAULT_HISTORY_LIMIT;

pub const DEFAULT_STORAGE_KEY: &str = "resume-storage";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// One JSON file per slot under `storage_dir`.
    File,
    /// Process memory only; nothing survives a restart.
    Memory,
}

impl StorageBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageBackend::File => "file",
            StorageBackend::Memory => "memory",
        }
    }
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "file" => Ok(StorageBackend::File),
            "memory" => Ok(StorageBackend::Memory),
            other => bail!("unknown storage backend '{other}' (expected 'file' or 'memory')"),
        }
    }
}

/// Application configuration loaded from environment variables.
/// Every setting has a default; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub storage_backend: StorageBackend,
    pub storage_dir: PathBuf,
    pub storage_key: String,
    pub autosave_debounce: Duration,
    pub autosave_notify_success: bool,
    pub history_limit: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let debounce_ms = match var("AUTOSAVE_DEBOUNCE_MS") {
            Some(v) => v
                .parse::<u64>()
                .context("AUTOSAVE_DEBOUNCE_MS must be a number of milliseconds")?,
            None => u64::try_from(DEFAULT_DEBOUNCE.as_millis()).unwrap_or(1500),
        };

        Ok(Config {
            port: var("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: var("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            storage_backend: var("STORAGE_BACKEND")
                .unwrap_or_else(|| "file".to_string())
                .parse()?,
            storage_dir: PathBuf::from(var("STORAGE_DIR").unwrap_or_else(|| "./data".to_string())),
            storage_key: var("STORAGE_KEY").unwrap_or_else(|| DEFAULT_STORAGE_KEY.to_string()),
            autosave_debounce: Duration::from_millis(debounce_ms),
            autosave_notify_success: var("AUTOSAVE_NOTIFY_SUCCESS")
                .unwrap_or_else(|| "true".to_string())
                .parse::<bool>()
                .context("AUTOSAVE_NOTIFY_SUCCESS must be 'true' or 'false'")?,
            history_limit: match var("HISTORY_LIMIT") {
                Some(v) => v
                    .parse::<usize>()
                    .context("HISTORY_LIMIT must be a positive integer")?,
                None => DEFAULT_HISTORY_LIMIT,
            },
        })
    }
}
