//! Configuration management for khata
//!
//! This module handles loading, validation, and management of
//! khata configuration from YAML files, with environment overrides
//! for the remote table store credentials.

pub mod error;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub use error::{ConfigError, ConfigResult};

/// Environment variable holding the remote table store URL
pub const ENV_REMOTE_URL: &str = "KHATA_REMOTE_URL";
/// Environment variable holding the remote table store API key
pub const ENV_REMOTE_API_KEY: &str = "KHATA_REMOTE_API_KEY";

// ==================== Configuration Types ====================

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,
    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the local JSON documents
    #[serde(default = "default_local_path")]
    pub local_path: PathBuf,
    /// Populate empty collections with the default records on startup
    #[serde(default = "default_true")]
    pub seed_on_empty: bool,
    /// Remote table store (optional)
    #[serde(default)]
    pub remote: Option<RemoteConfig>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            local_path: default_local_path(),
            seed_on_empty: true,
            remote: None,
        }
    }
}

impl StorageConfig {
    /// Remote settings, only when both URL and key are present
    pub fn active_remote(&self) -> Option<&RemoteConfig> {
        self.remote.as_ref().filter(|r| r.is_configured())
    }
}

fn default_local_path() -> PathBuf {
    PathBuf::from("./data")
}

fn default_true() -> bool {
    true
}

/// Remote table store configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RemoteConfig {
    /// Base URL of the table API (e.g. "https://project.example.co")
    #[serde(default)]
    pub url: String,
    /// API key sent with every request
    #[serde(default, skip_serializing)]
    pub api_key: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl RemoteConfig {
    /// Check if both URL and key are set
    pub fn is_configured(&self) -> bool {
        !self.url.trim().is_empty() && !self.api_key.trim().is_empty()
    }
}

fn default_timeout_secs() -> u64 {
    10
}

/// Currency and number formatting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrencyConfig {
    /// Currency code
    #[serde(default = "default_currency")]
    pub code: String,
    /// Symbol printed before amounts
    #[serde(default = "default_symbol")]
    pub symbol: String,
    /// Number of decimal places
    #[serde(default = "default_decimal_places")]
    pub decimal_places: u32,
}

impl Default for CurrencyConfig {
    fn default() -> Self {
        Self {
            code: default_currency(),
            symbol: default_symbol(),
            decimal_places: default_decimal_places(),
        }
    }
}

fn default_currency() -> String {
    "INR".to_string()
}

fn default_symbol() -> String {
    "₹".to_string()
}

fn default_decimal_places() -> u32 {
    2
}

/// Time range configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TimeRangeConfig {
    /// Range applied when a request names none
    #[serde(default)]
    pub default_range: TimeRange,
}

/// Time range presets for summaries and listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeRange {
    /// Current month
    Month,
    /// Current quarter
    Quarter,
    /// Current year
    Year,
    /// All time
    All,
}

impl Default for TimeRange {
    fn default() -> Self {
        TimeRange::All
    }
}

impl std::str::FromStr for TimeRange {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "month" => Ok(TimeRange::Month),
            "quarter" => Ok(TimeRange::Quarter),
            "year" => Ok(TimeRange::Year),
            "all" => Ok(TimeRange::All),
            _ => Err(format!("Invalid time range: {}", s)),
        }
    }
}

impl std::fmt::Display for TimeRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimeRange::Month => write!(f, "month"),
            TimeRange::Quarter => write!(f, "quarter"),
            TimeRange::Year => write!(f, "year"),
            TimeRange::All => write!(f, "all"),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Storage settings
    #[serde(default)]
    pub storage: StorageConfig,
    /// Currency settings
    #[serde(default)]
    pub currency: CurrencyConfig,
    /// Time range settings
    #[serde(default)]
    pub time_range: TimeRangeConfig,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a YAML file and apply environment overrides
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                });
            }
            Err(e) => {
                return Err(ConfigError::IoError {
                    path: path.display().to_string(),
                    message: e.to_string(),
                });
            }
        };

        let mut config = Self::from_yaml_str(&content)?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    /// Parse configuration from YAML text
    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(content).map_err(|e| ConfigError::InvalidYaml {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Override remote credentials from the environment.
    ///
    /// Takes a lookup function so tests do not touch the process environment.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = lookup(ENV_REMOTE_URL).filter(|v| !v.is_empty());
        let key = lookup(ENV_REMOTE_API_KEY).filter(|v| !v.is_empty());
        if url.is_none() && key.is_none() {
            return;
        }

        let remote = self.storage.remote.get_or_insert_with(|| RemoteConfig {
            timeout_secs: default_timeout_secs(),
            ..RemoteConfig::default()
        });
        if let Some(url) = url {
            remote.url = url;
        }
        if let Some(key) = key {
            remote.api_key = key;
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> ConfigResult<()> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                reason: "Port must be greater than 0".to_string(),
            });
        }

        if self.storage.local_path.as_os_str().is_empty() {
            return Err(ConfigError::MissingField {
                field: "storage.local_path".to_string(),
            });
        }

        if let Some(remote) = &self.storage.remote {
            let url = remote.url.trim();
            if !url.is_empty() && !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::InvalidValue {
                    field: "storage.remote.url".to_string(),
                    reason: "URL must start with http:// or https://".to_string(),
                });
            }
            if remote.timeout_secs == 0 {
                return Err(ConfigError::InvalidValue {
                    field: "storage.remote.timeout_secs".to_string(),
                    reason: "Timeout must be greater than 0".to_string(),
                });
            }
        }

        if self.currency.decimal_places > 6 {
            return Err(ConfigError::InvalidValue {
                field: "currency.decimal_places".to_string(),
                reason: "Decimal places must be between 0 and 6".to_string(),
            });
        }

        Ok(())
    }

    /// Bundled default configuration file
    pub fn generate_default() -> &'static str {
        include_str!("../templates/default_config.yaml")
    }

    /// Server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
