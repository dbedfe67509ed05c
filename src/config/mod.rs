//! Typed configuration from environment variables.
//!
//! Loads once at startup. Every variable has a default, so a bare
//! checkout runs against a local SQLite file. The connection string is
//! wrapped in secrecy::SecretString to keep credentials out of logs.

pub mod secrets;

use crate::error::{Error, Result};
use self::secrets::SecretString;
use std::net::SocketAddr;

/// Store used when `DATABASE_URL` is unset.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://telex_tracker.db?mode=rwc";

pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:8080";

#[derive(Debug)]
pub struct Config {
    pub database_url: SecretString,
    pub bind_address: SocketAddr,
    pub otel_endpoint: Option<String>,
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// In local dev, call `dotenvy::dotenv().ok()` before this.
    pub fn from_env() -> Result<Self> {
        let database_url = optional_var("DATABASE_URL")
            .map(|url| normalize_database_url(&url))
            .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let bind = optional_var("BIND_ADDRESS").unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());
        let bind_address = bind
            .parse()
            .map_err(|e| Error::Config(format!("BIND_ADDRESS {bind:?} is not a socket address: {e}")))?;

        Ok(Self {
            database_url: SecretString::from(database_url),
            bind_address,
            otel_endpoint: optional_var("OTEL_ENDPOINT"),
            log_level: optional_var("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        })
    }
}

/// Rewrite the legacy `postgres://` scheme some hosting providers hand out
/// to the standard `postgresql://` token. Other URLs pass through untouched.
pub fn normalize_database_url(url: &str) -> String {
    match url.strip_prefix("postgres://") {
        Some(rest) => format!("postgresql://{rest}"),
        None => url.to_string(),
    }
}

/// Unset and empty are treated the same.
fn optional_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
