//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.
//!
//! Every section and field is optional; omitted values take the defaults
//! below, so an empty file is a valid configuration.

use serde::de::Error;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::{GroundLinkError, Result};

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub transport: TransportConfig,
    #[serde(default)]
    pub commands: CommandConfig,
    #[serde(default)]
    pub map: MapConfig,
    #[serde(default)]
    pub recording: RecordingConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Telemetry stream transport configuration
#[derive(Debug, Deserialize, Clone)]
pub struct TransportConfig {
    #[serde(default = "default_transport_url")]
    pub url: String,

    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    #[serde(default = "default_reconnect_interval_ms")]
    pub reconnect_interval_ms: u64,
}

/// Command uplink configuration
#[derive(Debug, Deserialize, Clone)]
pub struct CommandConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_mode_path")]
    pub mode_path: String,

    #[serde(default = "default_arm_path")]
    pub arm_path: String,

    #[serde(default = "default_command_timeout_ms")]
    pub timeout_ms: u64,
}

/// Map view configuration
#[derive(Debug, Deserialize, Clone)]
pub struct MapConfig {
    #[serde(default = "default_home_lat")]
    pub home_lat: f64,

    #[serde(default = "default_home_lon")]
    pub home_lon: f64,

    #[serde(default = "default_zoom")]
    pub zoom: u8,

    #[serde(default = "default_goto_zoom")]
    pub goto_zoom: u8,
}

/// Telemetry recording configuration
#[derive(Debug, Deserialize, Clone)]
pub struct RecordingConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_log_dir")]
    pub log_dir: String,

    #[serde(default = "default_max_records_per_file")]
    pub max_records_per_file: usize,

    #[serde(default = "default_max_files_to_keep")]
    pub max_files_to_keep: usize,

    #[serde(default = "default_log_format")]
    pub format: String,
}

/// Diagnostic logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Directory for daily rolling log files; empty logs to stdout only
    #[serde(default)]
    pub directory: String,
}

// Default value functions
fn default_transport_url() -> String { "ws://127.0.0.1:5000/socket.io/?EIO=4&transport=websocket".to_string() }
fn default_connect_timeout_ms() -> u64 { 5000 }
fn default_reconnect_interval_ms() -> u64 { 1000 }

fn default_base_url() -> String { "http://127.0.0.1:5000".to_string() }
fn default_mode_path() -> String { "/api/command/mode".to_string() }
fn default_arm_path() -> String { "/api/command/arm".to_string() }
fn default_command_timeout_ms() -> u64 { 5000 }

fn default_home_lat() -> f64 { 19.4326 }
fn default_home_lon() -> f64 { -99.1332 }
fn default_zoom() -> u8 { 15 }
fn default_goto_zoom() -> u8 { 17 }

fn default_log_dir() -> String { "./logs".to_string() }
fn default_max_records_per_file() -> usize { 10000 }
fn default_max_files_to_keep() -> usize { 10 }
fn default_log_format() -> String { "jsonl".to_string() }

fn default_log_level() -> String { "info".to_string() }

/// Highest tile zoom level the map renderer supports
pub const MAX_ZOOM: u8 = 19;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            url: default_transport_url(),
            connect_timeout_ms: default_connect_timeout_ms(),
            reconnect_interval_ms: default_reconnect_interval_ms(),
        }
    }
}

impl Default for CommandConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            mode_path: default_mode_path(),
            arm_path: default_arm_path(),
            timeout_ms: default_command_timeout_ms(),
        }
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            home_lat: default_home_lat(),
            home_lon: default_home_lon(),
            zoom: default_zoom(),
            goto_zoom: default_goto_zoom(),
        }
    }
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            log_dir: default_log_dir(),
            max_records_per_file: default_max_records_per_file(),
            max_files_to_keep: default_max_files_to_keep(),
            format: default_log_format(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            directory: String::new(),
        }
    }
}

fn invalid(msg: impl std::fmt::Display) -> GroundLinkError {
    GroundLinkError::Config(toml::de::Error::custom(msg))
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    ///
    /// * `Result<Config>` - Loaded and validated configuration
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use groundlink::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    pub fn validate(&self) -> Result<()> {
        // Transport
        if !(self.transport.url.starts_with("ws://") || self.transport.url.starts_with("wss://")) {
            return Err(invalid("transport url must start with ws:// or wss://"));
        }

        if self.transport.connect_timeout_ms == 0 || self.transport.connect_timeout_ms > 60000 {
            return Err(invalid("connect_timeout_ms must be between 1 and 60000"));
        }

        if self.transport.reconnect_interval_ms == 0 || self.transport.reconnect_interval_ms > 60000 {
            return Err(invalid("reconnect_interval_ms must be between 1 and 60000"));
        }

        // Commands
        if !(self.commands.base_url.starts_with("http://") || self.commands.base_url.starts_with("https://")) {
            return Err(invalid("commands base_url must start with http:// or https://"));
        }

        for (name, path) in [
            ("mode_path", &self.commands.mode_path),
            ("arm_path", &self.commands.arm_path),
        ] {
            if !path.starts_with('/') {
                return Err(invalid(format!("{} must start with '/'", name)));
            }
        }

        if self.commands.timeout_ms == 0 || self.commands.timeout_ms > 60000 {
            return Err(invalid("command timeout_ms must be between 1 and 60000"));
        }

        // Map
        if !self.map.home_lat.is_finite() || !(-90.0..=90.0).contains(&self.map.home_lat) {
            return Err(invalid("home_lat must be between -90 and 90"));
        }

        if !self.map.home_lon.is_finite() || !(-180.0..=180.0).contains(&self.map.home_lon) {
            return Err(invalid("home_lon must be between -180 and 180"));
        }

        for (name, zoom) in [("zoom", self.map.zoom), ("goto_zoom", self.map.goto_zoom)] {
            if zoom > MAX_ZOOM {
                return Err(invalid(format!("{} must be between 0 and {}", name, MAX_ZOOM)));
            }
        }

        // Recording
        if self.recording.enabled && self.recording.log_dir.is_empty() {
            return Err(invalid("recording log_dir cannot be empty when enabled"));
        }

        if self.recording.max_records_per_file == 0 {
            return Err(invalid("max_records_per_file must be greater than 0"));
        }

        if self.recording.max_files_to_keep == 0 {
            return Err(invalid("max_files_to_keep must be greater than 0"));
        }

        if self.recording.format != "jsonl" {
            return Err(invalid("recording format must be 'jsonl' (only supported format)"));
        }

        // Logging
        if !LOG_LEVELS.contains(&self.logging.level.as_str()) {
            return Err(invalid(format!("log level must be one of: {}", LOG_LEVELS.join(", "))));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.transport.url, default_transport_url());
        assert_eq!(config.commands.mode_path, "/api/command/mode");
        assert_eq!(config.commands.arm_path, "/api/command/arm");
        assert!(!config.recording.enabled);
    }

    #[test]
    fn test_load_config_from_file() {
        use std::io::Write;
        use tempfile::NamedTempFile;

        let toml_content = r#"
[transport]
url = "ws://10.0.0.2:5000/socket.io/?EIO=4&transport=websocket"

[commands]
base_url = "http://10.0.0.2:5000"

[map]
home_lat = 37.7749
home_lon = -122.4194

[recording]
enabled = true

[logging]
level = "debug"
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = Config::load(temp_file.path()).unwrap();
        assert_eq!(config.commands.base_url, "http://10.0.0.2:5000");
        assert_eq!(config.map.home_lat, 37.7749);
        assert_eq!(config.map.zoom, 15);
        assert!(config.recording.enabled);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_load_missing_file() {
        let result = Config::load("/nonexistent/groundlink.toml");
        assert!(matches!(result, Err(GroundLinkError::Io(_))));
    }

    #[test]
    fn test_malformed_toml() {
        let result = Config::from_toml("[transport\nurl = ");
        assert!(matches!(result, Err(GroundLinkError::Config(_))));
    }

    #[test]
    fn test_invalid_transport_scheme() {
        let mut config = Config::default();
        config.transport.url = "http://127.0.0.1:5000".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_connect_timeout_zero() {
        let mut config = Config::default();
        config.transport.connect_timeout_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_reconnect_interval_too_high() {
        let mut config = Config::default();
        config.transport.reconnect_interval_ms = 60001;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_base_url() {
        let mut config = Config::default();
        config.commands.base_url = "127.0.0.1:5000".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_command_path_without_slash() {
        let mut config = Config::default();
        config.commands.arm_path = "api/command/arm".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_command_timeout_zero() {
        let mut config = Config::default();
        config.commands.timeout_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_home_out_of_range() {
        let mut config = Config::default();
        config.map.home_lat = 91.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.map.home_lon = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zoom_too_high() {
        let mut config = Config::default();
        config.map.goto_zoom = 20;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_log_dir_when_enabled() {
        let mut config = Config::default();
        config.recording.enabled = true;
        config.recording.log_dir = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_log_dir_when_disabled() {
        let mut config = Config::default();
        config.recording.enabled = false;
        config.recording.log_dir = String::new();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_max_records_per_file_zero() {
        let mut config = Config::default();
        config.recording.max_records_per_file = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_max_files_to_keep_zero() {
        let mut config = Config::default();
        config.recording.max_files_to_keep = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_log_format() {
        let mut config = Config::default();
        config.recording.format = "csv".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_log_level() {
        let mut config = Config::default();
        config.logging.level = "verbose".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_default_functions() {
        assert_eq!(default_connect_timeout_ms(), 5000);
        assert_eq!(default_reconnect_interval_ms(), 1000);
        assert_eq!(default_base_url(), "http://127.0.0.1:5000");
        assert_eq!(default_command_timeout_ms(), 5000);
        assert_eq!(default_home_lat(), 19.4326);
        assert_eq!(default_home_lon(), -99.1332);
        assert_eq!(default_zoom(), 15);
        assert_eq!(default_goto_zoom(), 17);
        assert_eq!(default_log_dir(), "./logs");
        assert_eq!(default_max_records_per_file(), 10000);
        assert_eq!(default_max_files_to_keep(), 10);
        assert_eq!(default_log_format(), "jsonl");
        assert_eq!(default_log_level(), "info");
    }
}
