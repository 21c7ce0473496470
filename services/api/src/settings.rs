//! Service configuration loaded from the environment

use config::{Config, ConfigError, Environment};
use serde::Deserialize;
use session_core::service::DEFAULT_REGISTRATION_ATTEMPTS;

/// Where sessions and users are persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// PostgreSQL via `DATABASE_URL`
    Postgres,
    /// Process-local maps; data is lost on restart
    Memory,
}

/// API service settings
///
/// # Environment Variables
/// - `APP_HOST`: bind address (default: "0.0.0.0")
/// - `APP_PORT`: bind port (default: 3001)
/// - `APP_STORAGE`: `postgres` or `memory` (default: "postgres")
/// - `APP_REGISTRATION_ATTEMPTS`: conditional-append attempts per registration (default: 3)
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub storage: StorageBackend,
    pub registration_attempts: u32,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("host", "0.0.0.0")?
            .set_default("port", 3001)?
            .set_default("storage", "postgres")?
            .set_default(
                "registration_attempts",
                i64::from(DEFAULT_REGISTRATION_ATTEMPTS),
            )?
            .add_source(Environment::with_prefix("APP").try_parsing(true))
            .build()?
            .try_deserialize()
    }

    /// Socket address to bind, e.g. "0.0.0.0:3001"
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
