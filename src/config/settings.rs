//! Application settings loaded from `config.toml` and the environment.
//!
//! The TOML file is optional; every field has a default. Values that must not
//! live in a file (the token signing secret) are read from the environment
//! only, and a handful of deploy-time knobs can be overridden from it too.

use crate::core::token::TokenConfig;
use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

const DEFAULT_CONFIG_PATH: &str = "config.toml";
const MIN_BCRYPT_COST: u32 = 4;
const MAX_BCRYPT_COST: u32 = 31;

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// HTTP listener settings
    pub server: ServerSettings,
    /// Password hashing and token lifetime settings
    pub auth: AuthSettings,
}

/// `[server]` table
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ServerSettings {
    /// Socket address the HTTP server binds to
    pub bind_addr: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
        }
    }
}

/// `[auth]` table
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct AuthSettings {
    /// Lifetime of a "remember me" token in days
    pub remember_me_days: i64,
    /// bcrypt work factor for new password hashes
    pub bcrypt_cost: u32,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            remember_me_days: 30,
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }
}

impl Settings {
    /// Applies `BIND_ADDR` and `JWT_EXPIRY_DAYS` overrides read through `lookup`.
    pub fn apply_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(bind_addr) = lookup("BIND_ADDR") {
            self.server.bind_addr = bind_addr;
        }
        if let Some(days) = lookup("JWT_EXPIRY_DAYS") {
            self.auth.remember_me_days = days.trim().parse().map_err(|e| Error::Config {
                message: format!("JWT_EXPIRY_DAYS must be an integer: {e}"),
            })?;
        }
        Ok(self)
    }

    /// Rejects values that would make the server unusable.
    pub fn validate(&self) -> Result<()> {
        let max_days = TokenConfig::MAX_REMEMBER_ME_DAYS;
        if !(1..=max_days).contains(&self.auth.remember_me_days) {
            return Err(Error::Config {
                message: format!("auth.remember_me_days must be between 1 and {max_days}"),
            });
        }
        if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&self.auth.bcrypt_cost) {
            return Err(Error::Config {
                message: format!(
                    "auth.bcrypt_cost must be between {MIN_BCRYPT_COST} and {MAX_BCRYPT_COST}"
                ),
            });
        }
        if self.server.bind_addr.trim().is_empty() {
            return Err(Error::Config {
                message: "server.bind_addr cannot be empty".to_string(),
            });
        }
        Ok(())
    }
}

/// Loads settings from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads settings from `HOMEBASE_CONFIG` (or `./config.toml`), falling back to
/// defaults when the file does not exist.
pub fn load_default_settings() -> Result<Settings> {
    let path = std::env::var("HOMEBASE_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());
    if Path::new(&path).exists() {
        debug!("Loading settings from {}", path);
        load_settings(&path)
    } else {
        info!("No config file at {}, using defaults", path);
        Ok(Settings::default())
    }
}

/// Everything the server needs at startup, resolved once.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Connection string for the `SeaORM` database
    pub database_url: String,
    /// File + environment settings
    pub settings: Settings,
    /// Immutable signing configuration for the token issuer
    pub token: TokenConfig,
}

/// Resolves the full application configuration from files and environment.
///
/// `JWT_SECRET` is required and must be at least 32 bytes.
pub fn load_app_configuration() -> Result<AppConfig> {
    let settings = load_default_settings()?.apply_overrides(|key| std::env::var(key).ok())?;
    settings.validate()?;

    let secret = std::env::var("JWT_SECRET").map_err(|_| Error::Config {
        message: "JWT_SECRET must be set".to_string(),
    })?;
    let token = TokenConfig::new(secret, settings.auth.remember_me_days)?;

    Ok(AppConfig {
        database_url: super::database::get_database_url(),
        settings,
        token,
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_parse_full_settings() {
        let toml_str = r#"
            [server]
            bind_addr = "127.0.0.1:9000"

            [auth]
            remember_me_days = 14
            bcrypt_cost = 10
        "#;

        let settings: Settings = toml::from_str(toml_str).unwrap();
        assert_eq!(settings.server.bind_addr, "127.0.0.1:9000");
        assert_eq!(settings.auth.remember_me_days, 14);
        assert_eq!(settings.auth.bcrypt_cost, 10);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_missing_tables_use_defaults() {
        let settings: Settings = toml::from_str("").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.auth.remember_me_days, 30);
        assert_eq!(settings.server.bind_addr, "0.0.0.0:8080");
    }

    #[test]
    fn test_partial_table_keeps_other_defaults() {
        let settings: Settings = toml::from_str("[auth]\nremember_me_days = 7\n").unwrap();
        assert_eq!(settings.auth.remember_me_days, 7);
        assert_eq!(settings.auth.bcrypt_cost, bcrypt::DEFAULT_COST);
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> =
            HashMap::from([("BIND_ADDR", "127.0.0.1:3000"), ("JWT_EXPIRY_DAYS", "60")]);
        let settings = Settings::default()
            .apply_overrides(|k| env.get(k).map(|v| (*v).to_string()))
            .unwrap();
        assert_eq!(settings.server.bind_addr, "127.0.0.1:3000");
        assert_eq!(settings.auth.remember_me_days, 60);
    }

    #[test]
    fn test_bad_expiry_override_is_config_error() {
        let result = Settings::default().apply_overrides(|k| {
            (k == "JWT_EXPIRY_DAYS").then(|| "thirty".to_string())
        });
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn test_validate_rejects_out_of_range_values() {
        let mut settings = Settings::default();
        settings.auth.remember_me_days = 0;
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.auth.bcrypt_cost = 2;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_huge_expiry_override_fails_validation() {
        let settings = Settings::default()
            .apply_overrides(|k| (k == "JWT_EXPIRY_DAYS").then(|| "9223372036854775807".to_string()))
            .unwrap();
        assert!(matches!(settings.validate(), Err(Error::Config { .. })));

        let settings = Settings::default()
            .apply_overrides(|k| (k == "JWT_EXPIRY_DAYS").then(|| "3650".to_string()))
            .unwrap();
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_load_settings_missing_file() {
        let result = load_settings("definitely/not/here.toml");
        assert!(matches!(result, Err(Error::Config { .. })));
    }
}
