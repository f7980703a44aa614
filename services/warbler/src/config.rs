//! Application configuration
//!
//! Settings are layered with the `config` crate: built-in defaults first,
//! then the process environment (`SECRET_KEY`, `BIND_ADDRESS`,
//! `SESSION_TTL_SECS`). Database settings live in
//! [`common::database::DatabaseConfig`].

use anyhow::Result;
use config::{Config, Environment};
use serde::Deserialize;

/// Fallback signing key, only suitable for local development
pub const DEFAULT_SECRET_KEY: &str = "def_not_a_secret_key";

/// Web application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Key used to sign the session cookie
    pub secret_key: String,
    /// Address the HTTP server binds to
    pub bind_address: String,
    /// Lifetime of a session cookie in seconds
    pub session_ttl_secs: u64,
}

impl AppConfig {
    /// Load settings from defaults overridden by environment variables
    pub fn load() -> Result<Self> {
        let settings = Config::builder()
            .set_default("secret_key", DEFAULT_SECRET_KEY)?
            .set_default("bind_address", "0.0.0.0:5000")?
            .set_default("session_ttl_secs", 2_592_000_i64)?
            .add_source(Environment::default().try_parsing(true))
            .build()?;

        let config: AppConfig = settings.try_deserialize()?;

        if config.secret_key.is_empty() {
            anyhow::bail!("SECRET_KEY must not be empty");
        }

        Ok(config)
    }

    /// Whether the development fallback key is in use
    pub fn uses_default_secret(&self) -> bool {
        self.secret_key == DEFAULT_SECRET_KEY
    }
}
