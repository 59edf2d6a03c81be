//! Configuration loading and validation.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// AI backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    /// Backend type: "ollama", "groq", or "none"
    #[serde(default = "default_backend")]
    pub backend: String,

    /// Base URL for the AI service (Ollama only)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model to use
    #[serde(default = "default_model")]
    pub model: String,

    /// Timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Max retries
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Minimum spacing between AI calls in seconds
    #[serde(default = "default_min_call_interval")]
    pub min_call_interval_secs: u64,
}

fn default_backend() -> String {
    "ollama".to_string()
}

fn default_base_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_model() -> String {
    "llama3.2".to_string()
}

fn default_timeout() -> u64 {
    120
}

fn default_max_retries() -> u32 {
    3
}

fn default_min_call_interval() -> u64 {
    3
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            base_url: default_base_url(),
            model: default_model(),
            timeout_seconds: default_timeout(),
            max_retries: default_max_retries(),
            min_call_interval_secs: default_min_call_interval(),
        }
    }
}

/// Match database configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite match database
    #[serde(default = "default_db_path")]
    pub path: PathBuf,

    /// How long queries wait on a locked database before failing
    #[serde(default = "default_busy_timeout")]
    pub busy_timeout_ms: u64,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./scouting.db")
}

fn default_busy_timeout() -> u64 {
    5_000
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            busy_timeout_ms: default_busy_timeout(),
        }
    }
}

/// Scouting analysis configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoutingConfig {
    /// Series analyzed when the caller does not say otherwise
    #[serde(default = "default_matches")]
    pub default_matches: u32,

    /// Upper bound on the analysis window
    #[serde(default = "default_max_matches")]
    pub max_matches: u32,
}

fn default_matches() -> u32 {
    10
}

fn default_max_matches() -> u32 {
    20
}

impl Default for ScoutingConfig {
    fn default() -> Self {
        Self {
            default_matches: default_matches(),
            max_matches: default_max_matches(),
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_cors_origin() -> String {
    "*".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub ai: AiConfig,

    #[serde(default)]
    pub scouting: ScoutingConfig,

    #[serde(default)]
    pub server: ServerConfig,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            log_level: default_log_level(),
            ai: AiConfig::default(),
            scouting: ScoutingConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &PathBuf) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults when
    /// the file does not exist.
    pub fn load(path: &PathBuf) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !matches!(self.ai.backend.as_str(), "ollama" | "groq" | "none") {
            return Err(ConfigError::ValidationError(format!(
                "Unknown AI backend '{}' (expected ollama, groq, or none)",
                self.ai.backend
            )));
        }

        if self.ai.timeout_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "AI timeout must be greater than 0".to_string(),
            ));
        }

        if self.scouting.default_matches == 0 {
            return Err(ConfigError::ValidationError(
                "default_matches must be at least 1".to_string(),
            ));
        }

        if self.scouting.default_matches > self.scouting.max_matches {
            return Err(ConfigError::ValidationError(format!(
                "default_matches ({}) cannot exceed max_matches ({})",
                self.scouting.default_matches, self.scouting.max_matches
            )));
        }

        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "Server port must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}
