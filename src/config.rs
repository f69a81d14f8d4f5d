use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::connection_string::ConnectionString;
use crate::error::Error;

/// Environment variable holding the connection string.
pub const CONNECTION_STRING_ENV: &str = "DOCSYNC_CONNECTION_STRING";
/// Environment variable holding the request timeout in seconds.
pub const TIMEOUT_ENV: &str = "DOCSYNC_TIMEOUT_SECS";

/// Source of a configuration value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigSource {
    Default,
    File,
    Environment,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::Default => write!(f, "default"),
            ConfigSource::File => write!(f, "file"),
            ConfigSource::Environment => write!(f, "environment"),
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }
}

/// Client configuration with source tracking
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    /// Connection string (`ys://...` or `yss://...`)
    #[serde(skip_serializing)]
    pub connection_string: ConfigValue<Option<String>>,
    /// Per-request timeout; `None` leaves it to the HTTP client
    pub timeout: ConfigValue<Option<Duration>>,
    /// Config file path used (if any)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_file: Option<PathBuf>,
}

/// Internal struct for deserializing config file
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ConfigFile {
    connection_string: Option<String>,
    timeout_secs: Option<u64>,
}

impl Config {
    /// Load configuration with priority: env vars > config file > defaults
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let mut connection_string = ConfigValue::new(None, ConfigSource::Default);
        let mut timeout = ConfigValue::new(None, ConfigSource::Default);
        let mut config_file = None;

        let path = config_path.unwrap_or_else(Self::default_config_path);
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::ReadError(path.clone(), e))?;
            let file_config: ConfigFile = serde_yaml::from_str(&contents)
                .map_err(|e| ConfigError::ParseError(path.clone(), e))?;

            config_file = Some(path.clone());

            if let Some(value) = file_config.connection_string {
                connection_string = ConfigValue::new(Some(value), ConfigSource::File);
            }
            if let Some(secs) = file_config.timeout_secs {
                timeout = ConfigValue::new(Some(Duration::from_secs(secs)), ConfigSource::File);
            }
        }

        if let Ok(value) = std::env::var(CONNECTION_STRING_ENV) {
            connection_string = ConfigValue::new(Some(value), ConfigSource::Environment);
        }
        if let Ok(value) = std::env::var(TIMEOUT_ENV) {
            let secs: u64 = value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue(TIMEOUT_ENV, value.clone()))?;
            timeout = ConfigValue::new(Some(Duration::from_secs(secs)), ConfigSource::Environment);
        }

        Ok(Self {
            connection_string,
            timeout,
            config_file,
        })
    }

    /// Parses the configured connection string.
    ///
    /// Fails with [`Error::Config`] when none is configured.
    pub fn connection_string(&self) -> Result<ConnectionString, Error> {
        let raw = self.connection_string.value.as_deref().ok_or_else(|| {
            Error::Config(format!(
                "no connection string configured. Set {} or connection_string in config.",
                CONNECTION_STRING_ENV
            ))
        })?;
        ConnectionString::parse(raw)
    }

    /// Default config directory (platform-specific):
    /// - Linux: ~/.config/docsync/
    /// - macOS: ~/Library/Application Support/docsync/
    /// - Windows: %APPDATA%/docsync/
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("docsync")
    }

    /// Default config file path (platform-specific config dir + config.yaml)
    pub fn default_config_path() -> PathBuf {
        Self::default_config_dir().join("config.yaml")
    }
}

#[derive(Debug)]
pub enum ConfigError {
    ReadError(PathBuf, std::io::Error),
    ParseError(PathBuf, serde_yaml::Error),
    InvalidValue(&'static str, String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError(path, e) => {
                write!(f, "Failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::ParseError(path, e) => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), e)
            }
            ConfigError::InvalidValue(name, value) => {
                write!(f, "Invalid value for {}: '{}'", name, value)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e.to_string())
    }
}
