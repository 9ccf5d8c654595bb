//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::client::ClientConfig;
use crate::repository::FallbackPolicy;
use crate::sandbox::SandboxConfig;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub fallback: FallbackConfig,

    #[serde(default)]
    pub sandbox: SandboxSection,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Records backend connection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Base URL that stored attachment paths are joined onto
    #[serde(default = "default_uploads_url")]
    pub uploads_url: String,

    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_base_url() -> String {
    "http://localhost:8000/api".to_string()
}

fn default_uploads_url() -> String {
    "http://localhost:8000/uploads/blotter/".to_string()
}

fn default_timeout_ms() -> u64 {
    5000
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            uploads_url: default_uploads_url(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

/// Local store location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

fn default_data_dir() -> String {
    dirs::data_local_dir()
        .map(|p| p.join("barangay-records").to_string_lossy().to_string())
        .unwrap_or_else(|| "./records_data".to_string())
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Which store the resident screens read from and write to
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FallbackConfig {
    #[serde(default)]
    pub reads: FallbackPolicy,

    #[serde(default)]
    pub writes: FallbackPolicy,
}

/// Sandbox server binding
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SandboxSection {
    #[serde(default = "default_sandbox_host")]
    pub host: String,

    #[serde(default = "default_sandbox_port")]
    pub port: u16,
}

fn default_sandbox_host() -> String {
    "127.0.0.1".to_string()
}

fn default_sandbox_port() -> u16 {
    8000
}

impl Default for SandboxSection {
    fn default() -> Self {
        Self {
            host: default_sandbox_host(),
            port: default_sandbox_port(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// `pretty` or `json`
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("barangay-records").join("config.toml")),
            Some(PathBuf::from("/etc/barangay-records/config.toml")),
            Some(PathBuf::from("./records.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        tracing::debug!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply `RECORDS_*` environment variables to an existing config
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        // API overrides
        if let Some(url) = lookup("RECORDS_API_URL") {
            self.api.base_url = url;
        }
        if let Some(url) = lookup("RECORDS_UPLOADS_URL") {
            self.api.uploads_url = url;
        }
        if let Some(timeout) = lookup("RECORDS_TIMEOUT_MS") {
            match timeout.parse() {
                Ok(ms) => self.api.timeout_ms = ms,
                Err(_) => tracing::warn!("Ignoring invalid RECORDS_TIMEOUT_MS: {}", timeout),
            }
        }

        // Storage overrides
        if let Some(dir) = lookup("RECORDS_DATA_DIR") {
            self.storage.data_dir = dir;
        }

        // Sandbox overrides
        if let Some(host) = lookup("RECORDS_SANDBOX_HOST") {
            self.sandbox.host = host;
        }
        if let Some(port) = lookup("RECORDS_SANDBOX_PORT") {
            if let Ok(p) = port.parse() {
                self.sandbox.port = p;
            }
        }

        // Logging overrides
        if let Some(level) = lookup("RECORDS_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("RECORDS_LOG_FORMAT") {
            self.logging.format = format;
        }
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.api.base_url.clone(),
            timeout_ms: self.api.timeout_ms,
        }
    }

    pub fn sandbox_config(&self) -> SandboxConfig {
        SandboxConfig::new(self.sandbox.host.clone(), self.sandbox.port)
    }

    /// Local store directory with a leading `~` expanded
    pub fn data_dir(&self) -> PathBuf {
        expand_home(&self.storage.data_dir)
    }
}

fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| PathBuf::from(path)),
        None => PathBuf::from(path),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Barangay Records Configuration
#
# Environment variables override these settings:
# - RECORDS_API_URL
# - RECORDS_UPLOADS_URL
# - RECORDS_TIMEOUT_MS
# - RECORDS_DATA_DIR
# - RECORDS_SANDBOX_HOST
# - RECORDS_SANDBOX_PORT
# - RECORDS_LOG_LEVEL
# - RECORDS_LOG_FORMAT

[api]
# Records backend base URL
base_url = "http://localhost:8000/api"

# Where stored attachment files are served from
uploads_url = "http://localhost:8000/uploads/blotter/"

# Request timeout (ms); requests are never retried
timeout_ms = 5000

[storage]
# Directory for the local store (one JSON file per collection)
data_dir = "~/.local/share/barangay-records"

[fallback]
# Resident screens only. Staff screens always talk to the backend.
# One of: remote_only, local_only, prefer_remote
reads = "prefer_remote"
writes = "prefer_remote"

[sandbox]
# Bind address of the in-memory sandbox backend
host = "127.0.0.1"
port = 8000

[logging]
# Log level: trace, debug, info, warn, error
level = "warn"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}
