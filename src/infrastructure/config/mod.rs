use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::domain::error::{AppError, Result};

pub const ENV_PREFIX: &str = "USER_IMPORT_";
pub const CONFIG_PATH_ENV: &str = "USER_IMPORT_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "user_import.toml";

/// Service configuration.
///
/// Layered lowest to highest: built-in defaults, the TOML config file, then
/// `USER_IMPORT_*` environment variables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_path: PathBuf,
    pub max_upload_bytes: usize,
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3001,
            database_path: PathBuf::from("data").join("users.db"),
            max_upload_bytes: 10 * 1024 * 1024, // 10MB
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load from `.env`, the config file and the environment.
    pub fn load() -> Result<Self> {
        // A missing .env is fine
        let _ = dotenvy::dotenv();

        let config_path = std::env::var(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE));

        Self::from_figment(Self::figment(&config_path))
    }

    pub fn figment(config_path: &Path) -> Figment {
        Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(config_path))
            .merge(Env::prefixed(ENV_PREFIX))
    }

    pub fn from_figment(figment: Figment) -> Result<Self> {
        let config: AppConfig = figment
            .extract()
            .map_err(|e| AppError::ConfigError(format!("Failed to load configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(AppError::ConfigError("host must not be empty".to_string()));
        }
        if self.port == 0 {
            return Err(AppError::ConfigError("port must be non-zero".to_string()));
        }
        if self.max_upload_bytes == 0 {
            return Err(AppError::ConfigError(
                "max_upload_bytes must be greater than zero".to_string(),
            ));
        }
        if self.database_path.as_os_str().is_empty() {
            return Err(AppError::ConfigError(
                "database_path must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
