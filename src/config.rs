//! Application configuration loaded from environment variables.
//!
//! Secrets are injected as environment variables by the deployment, so
//! everything is read once at startup.

use crate::time_utils::offset_from_minutes;
use chrono::{FixedOffset, Offset, Utc};
use std::env;
use std::str::FromStr;

/// Which record store backs the gym directory and check-in log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Firestore,
    /// Process-local store, optionally seeded from a gyms JSON file
    Memory,
}

impl FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "firestore" => Ok(StoreBackend::Firestore),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(ConfigError::Invalid {
                var: "STORE_BACKEND",
                reason: format!("unknown backend '{}'", other),
            }),
        }
    }
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Environment Variables (non-sensitive) ---
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    /// GCP project ID
    pub gcp_project_id: String,
    /// Server port
    pub port: u16,
    pub store_backend: StoreBackend,
    /// Gyms JSON loaded into the memory backend at startup
    pub gym_seed_file: Option<String>,
    /// Offset of the local day boundary used for check-ins and streaks
    pub utc_offset: FixedOffset,

    // --- Secrets ---
    /// JWT signing key for session tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
}

impl Config {
    /// Config for tests only.
    pub fn test_default() -> Self {
        Self {
            frontend_url: "http://localhost:5173".to_string(),
            gcp_project_id: "test-project".to_string(),
            port: 8080,
            store_backend: StoreBackend::Memory,
            gym_seed_file: None,
            utc_offset: Utc.fix(),
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// A `.env` file is read first if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let utc_offset = match env::var("CHECKIN_UTC_OFFSET_MINUTES") {
            Ok(raw) => parse_offset(&raw)?,
            Err(_) => Utc.fix(),
        };

        let store_backend = match env::var("STORE_BACKEND") {
            Ok(raw) => raw.parse()?,
            Err(_) => StoreBackend::Firestore,
        };

        Ok(Self {
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            store_backend,
            gym_seed_file: env::var("GYM_SEED_FILE").ok().filter(|p| !p.is_empty()),
            utc_offset,

            jwt_signing_key: env::var("JWT_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?
                .into_bytes(),
        })
    }
}

fn parse_offset(raw: &str) -> Result<FixedOffset, ConfigError> {
    let invalid = |reason: &str| ConfigError::Invalid {
        var: "CHECKIN_UTC_OFFSET_MINUTES",
        reason: reason.to_string(),
    };

    let minutes: i32 = raw
        .trim()
        .parse()
        .map_err(|_| invalid("expected whole minutes east of UTC"))?;
    offset_from_minutes(minutes).ok_or_else(|| invalid("must be within ±14 hours"))
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env() {
        // Set required env vars for test
        env::set_var("JWT_SIGNING_KEY", "test_jwt_key_32_bytes_minimum!!");
        env::set_var("CHECKIN_UTC_OFFSET_MINUTES", "-480");
        env::set_var("STORE_BACKEND", "memory");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.jwt_signing_key, b"test_jwt_key_32_bytes_minimum!!");
        assert_eq!(config.utc_offset.local_minus_utc(), -480 * 60);
        assert_eq!(config.store_backend, StoreBackend::Memory);
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_parse_offset_rejects_out_of_range() {
        assert!(parse_offset("60").is_ok());
        assert!(parse_offset("900").is_err());
        assert!(parse_offset("UTC+1").is_err());
    }

    #[test]
    fn test_store_backend_parse() {
        assert_eq!("Firestore".parse::<StoreBackend>().unwrap(), StoreBackend::Firestore);
        assert!("postgres".parse::<StoreBackend>().is_err());
    }
}
