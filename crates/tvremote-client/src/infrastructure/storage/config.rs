//! TOML-based configuration for the tvremote client.
//!
//! Reads `ClientConfig` from the platform-appropriate config file:
//! - Windows:  `%APPDATA%\TvRemote\config.toml`
//! - Linux:    `$XDG_CONFIG_HOME/tvremote/config.toml` (or `~/.config/...`)
//! - macOS:    `~/Library/Application Support/TvRemote/config.toml`
//!
//! Every field has a default, so a missing file, an empty file, or a file
//! written by an older version all load cleanly:
//!
//! ```toml
//! log_level = "debug"
//!
//! [gateway]
//! url = "http://192.168.1.20:7503/"
//!
//! [polling]
//! fast_interval_ms = 250
//! ```
//!
//! Durations are stored as integer milliseconds (or seconds where the name
//! says so) because TOML has no duration type.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::application::config::SessionConfig;

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// A value parsed but cannot be used, e.g. a zero poll interval.
    #[error("invalid config value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: &'static str },
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level client configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClientConfig {
    /// `tracing` filter used when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub gateway: GatewaySection,
    #[serde(default)]
    pub polling: PollingSection,
    #[serde(default)]
    pub events: EventsSection,
    #[serde(default)]
    pub input: InputSection,
}

/// Where the gateway lives and how long to wait for it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GatewaySection {
    /// Base URL; may carry a path prefix such as `http://host:7503/remote/`.
    #[serde(default = "default_gateway_url")]
    pub url: String,
    /// Timeout for ordinary requests.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Client-side cap on one event long-poll.  Should exceed the gateway's
    /// own hold time so the gateway, not the client, ends idle polls.
    #[serde(default = "default_long_poll_timeout_secs")]
    pub long_poll_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PollingSection {
    #[serde(default = "default_base_interval_ms")]
    pub base_interval_ms: u64,
    #[serde(default = "default_fast_interval_ms")]
    pub fast_interval_ms: u64,
    #[serde(default = "default_fast_phase_limit_secs")]
    pub fast_phase_limit_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EventsSection {
    #[serde(default = "default_error_backoff_ms")]
    pub error_backoff_ms: u64,
    #[serde(default = "default_background_backoff_ms")]
    pub background_backoff_ms: u64,
    #[serde(default = "default_park_interval_ms")]
    pub park_interval_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InputSection {
    /// Delay before re-muting after a home command.
    #[serde(default = "default_compensation_delay_ms")]
    pub compensation_delay_ms: u64,
    #[serde(default = "default_min_pairing_code_len")]
    pub min_pairing_code_len: usize,
    #[serde(default = "default_notice_lifetime_ms")]
    pub notice_lifetime_ms: u64,
    /// Ring the terminal bell after each key sent.
    #[serde(default)]
    pub feedback_bell: bool,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_log_level() -> String {
    "info".to_string()
}
fn default_gateway_url() -> String {
    "http://127.0.0.1:7503/".to_string()
}
fn default_request_timeout_secs() -> u64 {
    10
}
fn default_long_poll_timeout_secs() -> u64 {
    35
}
fn default_base_interval_ms() -> u64 {
    2_000
}
fn default_fast_interval_ms() -> u64 {
    500
}
fn default_fast_phase_limit_secs() -> u64 {
    130
}
fn default_error_backoff_ms() -> u64 {
    2_000
}
fn default_background_backoff_ms() -> u64 {
    10_000
}
fn default_park_interval_ms() -> u64 {
    1_000
}
fn default_compensation_delay_ms() -> u64 {
    500
}
fn default_min_pairing_code_len() -> usize {
    4
}
fn default_notice_lifetime_ms() -> u64 {
    3_000
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            gateway: GatewaySection::default(),
            polling: PollingSection::default(),
            events: EventsSection::default(),
            input: InputSection::default(),
        }
    }
}

impl Default for GatewaySection {
    fn default() -> Self {
        Self {
            url: default_gateway_url(),
            request_timeout_secs: default_request_timeout_secs(),
            long_poll_timeout_secs: default_long_poll_timeout_secs(),
        }
    }
}

impl Default for PollingSection {
    fn default() -> Self {
        Self {
            base_interval_ms: default_base_interval_ms(),
            fast_interval_ms: default_fast_interval_ms(),
            fast_phase_limit_secs: default_fast_phase_limit_secs(),
        }
    }
}

impl Default for EventsSection {
    fn default() -> Self {
        Self {
            error_backoff_ms: default_error_backoff_ms(),
            background_backoff_ms: default_background_backoff_ms(),
            park_interval_ms: default_park_interval_ms(),
        }
    }
}

impl Default for InputSection {
    fn default() -> Self {
        Self {
            compensation_delay_ms: default_compensation_delay_ms(),
            min_pairing_code_len: default_min_pairing_code_len(),
            notice_lifetime_ms: default_notice_lifetime_ms(),
            feedback_bell: false,
        }
    }
}

impl ClientConfig {
    /// Timing knobs for the session core.
    pub fn to_session_config(&self) -> SessionConfig {
        SessionConfig {
            base_poll_interval: Duration::from_millis(self.polling.base_interval_ms),
            fast_poll_interval: Duration::from_millis(self.polling.fast_interval_ms),
            fast_phase_limit: Duration::from_secs(self.polling.fast_phase_limit_secs),
            event_error_backoff: Duration::from_millis(self.events.error_backoff_ms),
            event_background_backoff: Duration::from_millis(self.events.background_backoff_ms),
            event_park_interval: Duration::from_millis(self.events.park_interval_ms),
            mute_compensation_delay: Duration::from_millis(self.input.compensation_delay_ms),
            min_pairing_code_len: self.input.min_pairing_code_len,
            notice_lifetime: Duration::from_millis(self.input.notice_lifetime_ms),
        }
    }

    /// Rejects values that would make a loop spin or every request time out.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first zero interval or timeout.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let must_be_positive = [
            ("gateway.request_timeout_secs", self.gateway.request_timeout_secs),
            ("gateway.long_poll_timeout_secs", self.gateway.long_poll_timeout_secs),
            ("polling.base_interval_ms", self.polling.base_interval_ms),
            ("polling.fast_interval_ms", self.polling.fast_interval_ms),
            ("events.error_backoff_ms", self.events.error_backoff_ms),
            ("events.background_backoff_ms", self.events.background_backoff_ms),
            ("events.park_interval_ms", self.events.park_interval_ms),
        ];
        match must_be_positive.into_iter().find(|(_, value)| *value == 0) {
            Some((field, _)) => Err(ConfigError::Invalid {
                field,
                reason: "must be greater than zero",
            }),
            None => Ok(()),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.gateway.request_timeout_secs)
    }

    pub fn long_poll_timeout(&self) -> Duration {
        Duration::from_secs(self.gateway.long_poll_timeout_secs)
    }
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Determines the platform-appropriate directory for the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] when the platform config base
/// directory cannot be determined from the environment.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    platform_config_dir().ok_or(ConfigError::NoPlatformConfigDir)
}

pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join("config.toml"))
}

/// Loads the config from the platform path, or defaults if the file is absent.
pub fn load_config() -> Result<ClientConfig, ConfigError> {
    load_config_from(&config_file_path()?)
}

/// Loads the config from `path`, or defaults if the file does not exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// [`ConfigError::Parse`] if the TOML is malformed, and
/// [`ConfigError::Invalid`] if a value fails [`ClientConfig::validate`].
pub fn load_config_from(path: &Path) -> Result<ClientConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => {
            let config: ClientConfig = toml::from_str(&content)?;
            config.validate()?;
            Ok(config)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ClientConfig::default()),
        Err(source) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Writes `config` to `path`, creating parent directories as needed.
pub fn save_config_to(config: &ClientConfig, path: &Path) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes `config` to the platform path.
pub fn save_config(config: &ClientConfig) -> Result<(), ConfigError> {
    save_config_to(config, &config_file_path()?)
}

fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("TvRemote"))
    }

    #[cfg(target_os = "linux")]
    {
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("tvremote"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME")
            .map(|h| PathBuf::from(h).join("Library").join("Application Support").join("TvRemote"))
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
