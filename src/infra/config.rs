//! Centralized configuration (environment variables + defaults).

use anyhow::{anyhow, Context, Result};
use std::str::FromStr;
use std::time::Duration;

/// Which repository implementation the server runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StorageBackend::Postgres),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(anyhow!(
                "unknown STORAGE_BACKEND '{}' (expected postgres or memory)",
                other
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub storage_backend: StorageBackend,
    /// Required for the Postgres backend only.
    pub database_url: Option<String>,
    pub bind_addr: String,
    pub db_max_connections: u32,
    /// Deadline for each item use case.
    pub item_timeout: Duration,
    /// Deadline for each inventory use case, hydration included.
    pub inventory_timeout: Duration,
    pub cascade_item_delete: bool,
}

impl Config {
    /// Reads the configuration from the process environment (after `.env`).
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let storage_backend = match lookup("STORAGE_BACKEND") {
            Some(v) => v.parse()?,
            None => StorageBackend::Postgres,
        };
        let database_url = lookup("DATABASE_URL").filter(|v| !v.trim().is_empty());
        if storage_backend == StorageBackend::Postgres && database_url.is_none() {
            return Err(anyhow!("DATABASE_URL must be set"));
        }

        Ok(Self {
            storage_backend,
            database_url,
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string()),
            db_max_connections: parse_or::<u32>(&lookup, "DB_MAX_CONNECTIONS", 5)?.max(1),
            item_timeout: Duration::from_millis(parse_or(&lookup, "ITEM_TIMEOUT_MS", 1_000)?),
            inventory_timeout: Duration::from_millis(parse_or(
                &lookup,
                "INVENTORY_TIMEOUT_MS",
                300_000,
            )?),
            cascade_item_delete: parse_or(&lookup, "CASCADE_ITEM_DELETE", true)?,
        })
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{} must be a valid {}", key, std::any::type_name::<T>())),
        None => Ok(default),
    }
}
