//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use gakbbul_core::ui::AdminLockPolicy;
use std::net::SocketAddr;
use tracing::Level;

/// Application password used when `APP_PASSWORD` is not set.
pub const DEFAULT_APP_PASSWORD: &str = "gakbbul";
/// Admin password used when `ADMIN_PASSWORD` is not set.
pub const DEFAULT_ADMIN_PASSWORD: &str = "gakbbul-admin";

/// Gemini's OpenAI-compatible endpoint.
pub const DEFAULT_DESCRIPTION_API_BASE: &str =
    "https://generativelanguage.googleapis.com/v1beta/openai";

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    /// `None` selects the in-process store.
    pub database_url: Option<String>,
    pub log_level: Level,
    pub app_password: String,
    pub admin_password: String,
    pub admin_lock_policy: AdminLockPolicy,
    pub description_api_key: Option<String>,
    pub description_api_base: String,
    pub description_model: String,
    pub cors_origin: String,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        // --- Load Server and Store Settings ---
        let bind_address_str =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty());

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Load Secrets ---
        let app_password =
            std::env::var("APP_PASSWORD").unwrap_or_else(|_| DEFAULT_APP_PASSWORD.to_string());
        let admin_password = std::env::var("ADMIN_PASSWORD")
            .unwrap_or_else(|_| DEFAULT_ADMIN_PASSWORD.to_string());
        let admin_lock_policy = match std::env::var("ADMIN_LOCK_POLICY") {
            Ok(value) => parse_lock_policy(&value)?,
            Err(_) => AdminLockPolicy::default(),
        };

        // --- Load Description Generation Settings ---
        let description_api_key = std::env::var("GEMINI_API_KEY")
            .or_else(|_| std::env::var("OPENAI_API_KEY"))
            .ok();
        let description_api_base = std::env::var("DESCRIPTION_API_BASE")
            .unwrap_or_else(|_| DEFAULT_DESCRIPTION_API_BASE.to_string());
        let description_model = std::env::var("DESCRIPTION_MODEL")
            .unwrap_or_else(|_| "gemini-2.5-flash".to_string());

        let cors_origin = std::env::var("CORS_ORIGIN")
            .unwrap_or_else(|_| "http://localhost:3000".to_string());

        Ok(Self {
            bind_address,
            database_url,
            log_level,
            app_password,
            admin_password,
            admin_lock_policy,
            description_api_key,
            description_api_base,
            description_model,
            cors_origin,
        })
    }
}

fn parse_lock_policy(value: &str) -> Result<AdminLockPolicy, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "session" => Ok(AdminLockPolicy::KeepForSession),
        "close" => Ok(AdminLockPolicy::RelockOnClose),
        other => Err(ConfigError::InvalidValue(
            "ADMIN_LOCK_POLICY".to_string(),
            format!("'{}' is not one of 'session' or 'close'", other),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lock_policy_values() {
        assert_eq!(parse_lock_policy("session").unwrap(), AdminLockPolicy::KeepForSession);
        assert_eq!(parse_lock_policy(" Close ").unwrap(), AdminLockPolicy::RelockOnClose);
        assert!(matches!(
            parse_lock_policy("never"),
            Err(ConfigError::InvalidValue(var, _)) if var == "ADMIN_LOCK_POLICY"
        ));
    }
}
