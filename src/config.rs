//! Configuration module for fileshelf.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::file::{DEFAULT_ALLOWED_FILE_TYPES, DEFAULT_MAX_FILE_SIZE};
use crate::{Result, ShelfError};

/// Name of the per-user application data directory.
const APP_DIR_NAME: &str = "fileshelf";

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// CORS allowed origins.
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: vec![],
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    ///
    /// Resolved under the application data directory when unset.
    #[serde(default)]
    pub path: Option<String>,
}

impl DatabaseConfig {
    /// Resolve the database file path.
    pub fn resolve_path(&self) -> PathBuf {
        match self.path.as_deref() {
            Some(path) if !path.trim().is_empty() => PathBuf::from(path),
            _ => app_data_dir().join("service.db"),
        }
    }
}

/// File intake configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct FilesConfig {
    /// Storage root directory (resolved under the application data directory when unset).
    #[serde(default)]
    pub storage_path: Option<String>,
    /// Maximum upload size in bytes.
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
    /// Comma-separated content-type substrings accepted for upload.
    #[serde(default = "default_allowed_file_types")]
    pub allowed_file_types: String,
}

fn default_max_file_size() -> u64 {
    DEFAULT_MAX_FILE_SIZE
}

fn default_allowed_file_types() -> String {
    DEFAULT_ALLOWED_FILE_TYPES.to_string()
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            storage_path: None,
            max_file_size: default_max_file_size(),
            allowed_file_types: default_allowed_file_types(),
        }
    }
}

/// Token issuance and verification configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret for signing tokens (must be set).
    #[serde(default)]
    pub jwt_secret: String,
    /// Token issuer, also used as the audience (must be set).
    #[serde(default)]
    pub jwt_issuer: String,
    /// Access token lifetime in seconds.
    #[serde(default = "default_token_expiry")]
    pub token_expiry_secs: u64,
}

fn default_token_expiry() -> u64 {
    7200 // 120 minutes
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            jwt_issuer: String::new(),
            token_expiry_secs: default_token_expiry(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file. Empty means console only.
    #[serde(default)]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: String::new(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// File intake configuration.
    #[serde(default)]
    pub files: FilesConfig,
    /// Token configuration.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ShelfError::Io)?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| ShelfError::Configuration(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `FILESHELF_JWT_SECRET`
    /// - `FILESHELF_JWT_ISSUER`
    /// - `FILESHELF_MAX_FILE_SIZE`
    /// - `FILESHELF_ALLOWED_FILE_TYPES`
    /// - `FILESHELF_STORAGE_PATH`
    ///
    /// Empty values are ignored.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Some(secret) = non_empty_env("FILESHELF_JWT_SECRET") {
            self.auth.jwt_secret = secret;
        }

        if let Some(issuer) = non_empty_env("FILESHELF_JWT_ISSUER") {
            self.auth.jwt_issuer = issuer;
        }

        if let Some(max) = non_empty_env("FILESHELF_MAX_FILE_SIZE") {
            self.files.max_file_size = max.trim().parse().map_err(|_| {
                ShelfError::Configuration(format!("FILESHELF_MAX_FILE_SIZE is not a number: {max}"))
            })?;
        }

        if let Some(types) = non_empty_env("FILESHELF_ALLOWED_FILE_TYPES") {
            self.files.allowed_file_types = types;
        }

        if let Some(path) = non_empty_env("FILESHELF_STORAGE_PATH") {
            self.files.storage_path = Some(path);
        }

        Ok(())
    }

    /// Validate the configuration.
    ///
    /// Returns an error if the JWT secret or issuer is not set. Upload policy
    /// is checked separately when the file service is built.
    pub fn validate(&self) -> Result<()> {
        if self.auth.jwt_secret.trim().is_empty() || self.auth.jwt_issuer.trim().is_empty() {
            return Err(ShelfError::Configuration(
                "jwt_secret and jwt_issuer must be set in config.toml \
                 or via FILESHELF_JWT_SECRET / FILESHELF_JWT_ISSUER"
                    .to_string(),
            ));
        }
        Ok(())
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Per-user application data directory.
///
/// Falls back to `./data` when the platform has no local data directory.
pub fn app_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join(APP_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from("data"))
}
