//! TOML Configuration File Support
//!
//! Configuration is read once at startup from `~/.config/lolgpt/config.toml`,
//! the environment and the command line.
//!
//! # Configuration Priority
//!
//! Values are resolved with the following priority (highest first):
//! 1. CLI arguments ([`ConfigOverrides`])
//! 2. Environment variables (`LOLGPT_*`)
//! 3. TOML configuration file
//! 4. Default values
//!
//! The source of every value is tracked so a misconfiguration can be traced
//! back to where it came from.
//!
//! # XDG Base Directory Compliance
//!
//! The file lives at `$XDG_CONFIG_HOME/lolgpt/config.toml` (typically
//! `~/.config/lolgpt/config.toml`). `LOLGPT_CONFIG` points somewhere else.
//!
//! # Example Configuration
//!
//! ```toml
//! [api]
//! url = "https://lolgpt.example.com"
//! timeout_secs = 60
//!
//! [chat]
//! reveal_interval_ms = 15
//! max_input_bytes = 102400
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::input::DEFAULT_MAX_INPUT_BYTES;

/// Default answer service location
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Default reveal delay in milliseconds
pub const DEFAULT_REVEAL_INTERVAL_MS: u64 = 15;

/// Default request timeout in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

/// Environment variable naming an alternative config file
pub const CONFIG_PATH_ENV: &str = "LOLGPT_CONFIG";

const API_URL_ENV: &str = "LOLGPT_API_URL";
const REVEAL_INTERVAL_ENV: &str = "LOLGPT_REVEAL_INTERVAL_MS";
const REQUEST_TIMEOUT_ENV: &str = "LOLGPT_REQUEST_TIMEOUT_SECS";
const MAX_INPUT_BYTES_ENV: &str = "LOLGPT_MAX_INPUT_BYTES";

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file at {path}: {source}")]
    Read {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        /// The file being parsed
        path: PathBuf,
        /// The underlying TOML error
        source: toml::de::Error,
    },

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    Validation(String),
}

// =============================================================================
// Configuration Source Tracking
// =============================================================================

/// Tracks where a configuration value came from
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Value from command-line argument
    Cli,
    /// Value from environment variable
    Env,
    /// Value from TOML configuration file
    File,
    /// Default value
    #[default]
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cli => write!(f, "CLI"),
            Self::Env => write!(f, "environment"),
            Self::File => write!(f, "config file"),
            Self::Default => write!(f, "default"),
        }
    }
}

/// Source of each configuration value
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ConfigSources {
    /// Source of `api_url`
    pub api_url: ConfigSource,
    /// Source of `reveal_interval_ms`
    pub reveal_interval_ms: ConfigSource,
    /// Source of `request_timeout_secs`
    pub request_timeout_secs: ConfigSource,
    /// Source of `max_input_bytes`
    pub max_input_bytes: ConfigSource,
}

// =============================================================================
// TOML Configuration Structures
// =============================================================================

/// `[api]` section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiToml {
    /// Base URL of the answer service
    pub url: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: Option<u64>,
}

/// `[chat]` section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatToml {
    /// Delay between revealed characters in milliseconds
    pub reveal_interval_ms: Option<u64>,

    /// Maximum question size in bytes
    pub max_input_bytes: Option<usize>,
}

/// Top-level TOML configuration structure
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigToml {
    /// Answer service section
    pub api: ApiToml,

    /// Chat behaviour section
    pub chat: ChatToml,
}

// =============================================================================
// Main Configuration Struct
// =============================================================================

/// Resolved client configuration
///
/// Use [`load_config`] to build one with proper priority handling.
#[derive(Clone, Debug)]
pub struct ChatConfig {
    /// Base URL of the answer service, without trailing slash
    pub api_url: String,

    /// Delay between revealed characters in milliseconds
    pub reveal_interval_ms: u64,

    /// Request timeout in seconds
    pub request_timeout_secs: u64,

    /// Maximum question size in bytes
    pub max_input_bytes: usize,

    /// Path to the config file that was loaded (if any)
    pub config_file_path: Option<PathBuf>,

    /// Where each value came from
    sources: ConfigSources,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            reveal_interval_ms: DEFAULT_REVEAL_INTERVAL_MS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            max_input_bytes: DEFAULT_MAX_INPUT_BYTES,
            config_file_path: None,
            sources: ConfigSources::default(),
        }
    }
}

impl ChatConfig {
    /// Create a new configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Where each value came from
    #[must_use]
    pub fn sources(&self) -> &ConfigSources {
        &self.sources
    }

    /// Delay between revealed characters
    #[must_use]
    pub fn reveal_interval(&self) -> Duration {
        Duration::from_millis(self.reveal_interval_ms)
    }

    /// Request timeout
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Strip trailing slashes and check every value
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] for an empty URL, a URL without an
    /// `http://` or `https://` scheme, or a zero timeout.
    pub fn validate(&mut self) -> Result<(), ConfigError> {
        self.api_url = self.api_url.trim().trim_end_matches('/').to_string();

        if self.api_url.is_empty() {
            return Err(ConfigError::Validation(format!(
                "api_url is empty (from {})",
                self.sources.api_url
            )));
        }

        if !self.api_url.starts_with("http://") && !self.api_url.starts_with("https://") {
            return Err(ConfigError::Validation(format!(
                "api_url must start with http:// or https://, got '{}' (from {})",
                self.api_url, self.sources.api_url
            )));
        }

        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Validation(format!(
                "request_timeout_secs must be greater than zero (from {})",
                self.sources.request_timeout_secs
            )));
        }

        Ok(())
    }
}

// =============================================================================
// Configuration Loading
// =============================================================================

/// Get the default configuration file path
///
/// Returns `$XDG_CONFIG_HOME/lolgpt/config.toml` or
/// `~/.config/lolgpt/config.toml` if `XDG_CONFIG_HOME` is not set.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("lolgpt").join("config.toml"))
}

/// Load configuration from all sources with proper priority
///
/// The file is taken from `overrides.config_path`, then `LOLGPT_CONFIG`, then
/// [`default_config_path`].
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be read or parsed,
/// or if the resolved values fail validation. A missing config file is not
/// an error (defaults are used).
pub fn load_config(overrides: &ConfigOverrides) -> Result<ChatConfig, ConfigError> {
    let env = |key: &str| std::env::var(key).ok();

    let path = overrides
        .config_path
        .clone()
        .or_else(|| env(CONFIG_PATH_ENV).map(PathBuf::from))
        .or_else(default_config_path);

    load_config_with(path.as_deref(), env, overrides)
}

/// Load configuration from an explicit file and environment lookup
///
/// # Errors
///
/// Same as [`load_config`].
pub fn load_config_with<E>(
    path: Option<&Path>,
    env: E,
    overrides: &ConfigOverrides,
) -> Result<ChatConfig, ConfigError>
where
    E: Fn(&str) -> Option<String>,
{
    // Start with defaults
    let mut config = ChatConfig::default();

    if let Some(config_path) = path {
        if config_path.exists() {
            let toml_content =
                std::fs::read_to_string(config_path).map_err(|e| ConfigError::Read {
                    path: config_path.to_path_buf(),
                    source: e,
                })?;

            let toml_config: ConfigToml =
                toml::from_str(&toml_content).map_err(|e| ConfigError::Parse {
                    path: config_path.to_path_buf(),
                    source: e,
                })?;
            apply_toml_config(&mut config, &toml_config);
            config.config_file_path = Some(config_path.to_path_buf());

            tracing::info!(
                path = %config_path.display(),
                "Loaded configuration from file"
            );
        } else {
            tracing::debug!(
                path = %config_path.display(),
                "Config file not found, using defaults"
            );
        }
    }

    apply_env_config(&mut config, env);
    overrides.apply(&mut config);
    config.validate()?;

    tracing::debug!(
        api_url = %config.api_url,
        api_url_source = %config.sources.api_url,
        reveal_interval_ms = config.reveal_interval_ms,
        request_timeout_secs = config.request_timeout_secs,
        "Configuration resolved"
    );

    Ok(config)
}

/// Apply TOML configuration values to the config struct
fn apply_toml_config(config: &mut ChatConfig, toml: &ConfigToml) {
    if let Some(ref url) = toml.api.url {
        config.api_url = url.clone();
        config.sources.api_url = ConfigSource::File;
    }
    if let Some(timeout) = toml.api.timeout_secs {
        config.request_timeout_secs = timeout;
        config.sources.request_timeout_secs = ConfigSource::File;
    }
    if let Some(interval) = toml.chat.reveal_interval_ms {
        config.reveal_interval_ms = interval;
        config.sources.reveal_interval_ms = ConfigSource::File;
    }
    if let Some(max) = toml.chat.max_input_bytes {
        config.max_input_bytes = max;
        config.sources.max_input_bytes = ConfigSource::File;
    }
}

/// Parse a numeric environment value, ignoring garbage with a warning
fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Option<T> {
    match value.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!(key, value, "Ignoring unparsable environment variable");
            None
        }
    }
}

/// Apply environment variable overrides to the config
fn apply_env_config<E>(config: &mut ChatConfig, env: E)
where
    E: Fn(&str) -> Option<String>,
{
    if let Some(url) = env(API_URL_ENV) {
        config.api_url = url;
        config.sources.api_url = ConfigSource::Env;
    }
    if let Some(interval) = env(REVEAL_INTERVAL_ENV).and_then(|v| parse_env(REVEAL_INTERVAL_ENV, &v)) {
        config.reveal_interval_ms = interval;
        config.sources.reveal_interval_ms = ConfigSource::Env;
    }
    if let Some(timeout) = env(REQUEST_TIMEOUT_ENV).and_then(|v| parse_env(REQUEST_TIMEOUT_ENV, &v)) {
        config.request_timeout_secs = timeout;
        config.sources.request_timeout_secs = ConfigSource::Env;
    }
    if let Some(max) = env(MAX_INPUT_BYTES_ENV).and_then(|v| parse_env(MAX_INPUT_BYTES_ENV, &v)) {
        config.max_input_bytes = max;
        config.sources.max_input_bytes = ConfigSource::Env;
    }
}

// =============================================================================
// CLI Override Support
// =============================================================================

/// Command-line overrides, applied on top of file and environment
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    /// Config file to read instead of the default
    pub config_path: Option<PathBuf>,

    /// Answer service URL override
    pub api_url: Option<String>,

    /// Reveal delay override (milliseconds)
    pub reveal_interval_ms: Option<u64>,

    /// Request timeout override (seconds)
    pub request_timeout_secs: Option<u64>,

    /// Max input size override
    pub max_input_bytes: Option<usize>,
}

impl ConfigOverrides {
    /// Create a new empty set of overrides
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set config file path
    #[must_use]
    pub fn with_config_path(mut self, path: PathBuf) -> Self {
        self.config_path = Some(path);
        self
    }

    /// Set answer service URL override
    #[must_use]
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = Some(url.into());
        self
    }

    /// Set reveal delay override
    #[must_use]
    pub fn with_reveal_interval_ms(mut self, ms: u64) -> Self {
        self.reveal_interval_ms = Some(ms);
        self
    }

    /// Set request timeout override
    #[must_use]
    pub fn with_request_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout_secs = Some(secs);
        self
    }

    /// Set max input size override
    #[must_use]
    pub fn with_max_input_bytes(mut self, bytes: usize) -> Self {
        self.max_input_bytes = Some(bytes);
        self
    }

    /// Apply overrides to a configuration
    pub fn apply(&self, config: &mut ChatConfig) {
        if let Some(ref url) = self.api_url {
            config.api_url = url.clone();
            config.sources.api_url = ConfigSource::Cli;
        }
        if let Some(interval) = self.reveal_interval_ms {
            config.reveal_interval_ms = interval;
            config.sources.reveal_interval_ms = ConfigSource::Cli;
        }
        if let Some(timeout) = self.request_timeout_secs {
            config.request_timeout_secs = timeout;
            config.sources.request_timeout_secs = ConfigSource::Cli;
        }
        if let Some(max) = self.max_input_bytes {
            config.max_input_bytes = max;
            config.sources.max_input_bytes = ConfigSource::Cli;
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
