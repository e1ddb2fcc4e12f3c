//! Server and application configuration.
//!
//! [`ServerConfig`] is what the [`Server`](crate::Server) runs with and is
//! built in code. [`AppConfig`] is what the binary loads: an optional TOML or
//! JSON file, then `MERIDIAN_*` environment overrides, then validation.
//!
//! # Example
//!
//! ```rust
//! use meridian_server::ServerConfig;
//! use std::time::Duration;
//!
//! let config = ServerConfig::builder()
//!     .http_addr("127.0.0.1:3000")
//!     .request_timeout(Duration::from_secs(5))
//!     .build();
//!
//! assert_eq!(config.http_addr(), "127.0.0.1:3000");
//! ```

use std::fmt;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use meridian_core::DEFAULT_NOT_FOUND_THRESHOLD;
use meridian_telemetry::{LogConfig, LogFormat};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default HTTP bind address.
pub const DEFAULT_HTTP_ADDR: &str = "0.0.0.0:8080";

/// Default shutdown timeout in seconds.
pub const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 30;

/// Default request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default maximum request body size (1 MiB).
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Read {
        /// File that was requested.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The file content could not be parsed.
    #[error("failed to parse config file: {0}")]
    Parse(String),

    /// The file extension is neither `toml` nor `json`.
    #[error("unsupported config format: {0}")]
    UnsupportedFormat(String),

    /// A setting or override is invalid.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Server configuration.
///
/// Use [`ServerConfig::builder()`] to construct instances.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    http_addr: String,
    shutdown_timeout: Duration,
    request_timeout: Duration,
    max_body_bytes: usize,
    not_found_threshold: f64,
}

impl ServerConfig {
    /// Creates a new server configuration builder.
    #[must_use]
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder::default()
    }

    /// Returns the HTTP bind address.
    #[must_use]
    pub fn http_addr(&self) -> &str {
        &self.http_addr
    }

    /// Parses and returns the HTTP address as a `SocketAddr`.
    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        self.http_addr.parse()
    }

    /// Returns how long shutdown waits for open connections.
    #[must_use]
    pub fn shutdown_timeout(&self) -> Duration {
        self.shutdown_timeout
    }

    /// Returns how long a request body may take to arrive.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Returns the largest accepted request body.
    #[must_use]
    pub fn max_body_bytes(&self) -> usize {
        self.max_body_bytes
    }

    /// Returns the probability with which the stub directory reports a
    /// caller as unknown.
    #[must_use]
    pub fn not_found_threshold(&self) -> f64 {
        self.not_found_threshold
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Builder for [`ServerConfig`].
#[derive(Debug, Clone)]
pub struct ServerConfigBuilder {
    http_addr: String,
    shutdown_timeout: Duration,
    request_timeout: Duration,
    max_body_bytes: usize,
    not_found_threshold: f64,
}

impl ServerConfigBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            http_addr: DEFAULT_HTTP_ADDR.to_string(),
            shutdown_timeout: Duration::from_secs(DEFAULT_SHUTDOWN_TIMEOUT_SECS),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            not_found_threshold: DEFAULT_NOT_FOUND_THRESHOLD,
        }
    }

    /// Sets the HTTP bind address (e.g. `0.0.0.0:8080`).
    #[must_use]
    pub fn http_addr(mut self, addr: impl Into<String>) -> Self {
        self.http_addr = addr.into();
        self
    }

    /// Sets the graceful shutdown timeout.
    #[must_use]
    pub fn shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    /// Sets the request body timeout.
    #[must_use]
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Sets the maximum request body size in bytes.
    #[must_use]
    pub fn max_body_bytes(mut self, max: usize) -> Self {
        self.max_body_bytes = max;
        self
    }

    /// Sets the stub directory's not-found probability.
    #[must_use]
    pub fn not_found_threshold(mut self, threshold: f64) -> Self {
        self.not_found_threshold = threshold;
        self
    }

    /// Builds the [`ServerConfig`].
    #[must_use]
    pub fn build(self) -> ServerConfig {
        ServerConfig {
            http_addr: self.http_addr,
            shutdown_timeout: self.shutdown_timeout,
            request_timeout: self.request_timeout,
            max_body_bytes: self.max_body_bytes,
            not_found_threshold: self.not_found_threshold,
        }
    }
}

impl Default for ServerConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Application configuration as loaded by the binary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP server settings.
    pub server: ServerSettings,
    /// Logging settings.
    pub logging: LoggingSettings,
    /// User directory settings.
    pub directory: DirectorySettings,
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Bind address.
    pub http_addr: String,
    /// Graceful shutdown timeout in seconds.
    pub shutdown_timeout_secs: u64,
    /// Request body timeout in seconds.
    pub request_timeout_secs: u64,
    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            http_addr: DEFAULT_HTTP_ADDR.to_string(),
            shutdown_timeout_secs: DEFAULT_SHUTDOWN_TIMEOUT_SECS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Filter directive.
    pub level: String,
    /// Output format.
    pub format: LogFormat,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Json,
        }
    }
}

/// User directory settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectorySettings {
    /// Probability in `[0, 1]` of reporting a caller as unknown.
    pub not_found_threshold: f64,
}

impl Default for DirectorySettings {
    fn default() -> Self {
        Self {
            not_found_threshold: DEFAULT_NOT_FOUND_THRESHOLD,
        }
    }
}

impl AppConfig {
    /// Loads configuration from a `.toml` or `.json` file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let extension = path.extension().and_then(|s| s.to_str()).unwrap_or("");
        match extension {
            "toml" => toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string())),
            "json" => {
                serde_json::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
            }
            other => Err(ConfigError::UnsupportedFormat(other.to_string())),
        }
    }

    /// Applies `MERIDIAN_*` environment variable overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first variable whose value
    /// does not parse.
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides from an arbitrary lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when a value does not parse.
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(addr) = lookup("MERIDIAN_HTTP_ADDR") {
            self.server.http_addr = addr;
        }

        if let Some(port) = lookup("MERIDIAN_PORT") {
            let port: u16 = port
                .parse()
                .map_err(|e| invalid_override("MERIDIAN_PORT", &port, e))?;
            let host = self
                .server
                .http_addr
                .rsplit_once(':')
                .map_or("0.0.0.0", |(host, _)| host);
            self.server.http_addr = format!("{host}:{port}");
        }

        if let Some(level) = lookup("MERIDIAN_LOG_LEVEL") {
            self.logging.level = level;
        }

        if let Some(format) = lookup("MERIDIAN_LOG_FORMAT") {
            self.logging.format = format
                .parse()
                .map_err(|e| invalid_override("MERIDIAN_LOG_FORMAT", &format, e))?;
        }

        if let Some(threshold) = lookup("MERIDIAN_NOT_FOUND_THRESHOLD") {
            self.directory.not_found_threshold = threshold
                .parse()
                .map_err(|e| invalid_override("MERIDIAN_NOT_FOUND_THRESHOLD", &threshold, e))?;
        }

        Ok(self)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server
            .http_addr
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::Invalid(format!("http_addr '{}': {e}", self.server.http_addr)))?;

        let threshold = self.directory.not_found_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(ConfigError::Invalid(format!(
                "not_found_threshold must be within [0, 1], got {threshold}"
            )));
        }

        if self.server.max_body_bytes == 0 {
            return Err(ConfigError::Invalid(
                "max_body_bytes must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Builds the server configuration.
    #[must_use]
    pub fn server_config(&self) -> ServerConfig {
        ServerConfig::builder()
            .http_addr(self.server.http_addr.clone())
            .shutdown_timeout(Duration::from_secs(self.server.shutdown_timeout_secs))
            .request_timeout(Duration::from_secs(self.server.request_timeout_secs))
            .max_body_bytes(self.server.max_body_bytes)
            .not_found_threshold(self.directory.not_found_threshold)
            .build()
    }

    /// Builds the logging configuration.
    #[must_use]
    pub fn log_config(&self) -> LogConfig {
        LogConfig::production()
            .with_level(self.logging.level.clone())
            .with_format(self.logging.format)
    }
}

fn invalid_override(key: &str, value: &str, error: impl fmt::Display) -> ConfigError {
    ConfigError::Invalid(format!("{key}={value:?}: {error}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_server_config() {
        let config = ServerConfig::default();

        assert_eq!(config.http_addr(), DEFAULT_HTTP_ADDR);
        assert_eq!(
            config.shutdown_timeout(),
            Duration::from_secs(DEFAULT_SHUTDOWN_TIMEOUT_SECS)
        );
        assert_eq!(config.max_body_bytes(), DEFAULT_MAX_BODY_BYTES);
        assert!((config.not_found_threshold() - 0.3).abs() < f64::EPSILON);
    }

    #[test]
    fn test_builder_chaining() {
        let config = ServerConfig::builder()
            .http_addr("0.0.0.0:9090")
            .shutdown_timeout(Duration::from_secs(45))
            .request_timeout(Duration::from_secs(5))
            .max_body_bytes(512)
            .not_found_threshold(0.0)
            .build();

        assert_eq!(config.http_addr(), "0.0.0.0:9090");
        assert_eq!(config.shutdown_timeout(), Duration::from_secs(45));
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
        assert_eq!(config.max_body_bytes(), 512);
        assert!(config.not_found_threshold().abs() < f64::EPSILON);
    }

    #[test]
    fn test_socket_addr_parsing() {
        let config = ServerConfig::builder().http_addr("127.0.0.1:8080").build();
        let addr = config.socket_addr().unwrap();
        assert_eq!(addr.port(), 8080);
        assert!(addr.ip().is_loopback());

        let bad = ServerConfig::builder().http_addr("not-an-address").build();
        assert!(bad.socket_addr().is_err());
    }

    #[test]
    fn test_toml_config() {
        let toml = r#"
[server]
http_addr = "127.0.0.1:3000"
request_timeout_secs = 10

[logging]
level = "debug"
format = "pretty"

[directory]
not_found_threshold = 0.5
"#;
        let config: AppConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.server.http_addr, "127.0.0.1:3000");
        assert_eq!(config.server.request_timeout_secs, 10);
        assert_eq!(config.server.shutdown_timeout_secs, DEFAULT_SHUTDOWN_TIMEOUT_SECS);
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert!((config.directory.not_found_threshold - 0.5).abs() < f64::EPSILON);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_file_toml() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[server]\nhttp_addr = \"127.0.0.1:4000\"").unwrap();

        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.server.http_addr, "127.0.0.1:4000");
    }

    #[test]
    fn test_from_file_json() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"logging": {{"level": "warn"}}}}"#).unwrap();

        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.server.http_addr, DEFAULT_HTTP_ADDR);
    }

    #[test]
    fn test_from_file_errors() {
        assert!(matches!(
            AppConfig::from_file("/definitely/not/here.toml"),
            Err(ConfigError::Read { .. })
        ));

        let file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        assert!(matches!(
            AppConfig::from_file(file.path()),
            Err(ConfigError::UnsupportedFormat(ext)) if ext == "yaml"
        ));

        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[server").unwrap();
        assert!(matches!(
            AppConfig::from_file(file.path()),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_env_overrides() {
        let config = AppConfig::default()
            .with_overrides(lookup(&[
                ("MERIDIAN_PORT", "9999"),
                ("MERIDIAN_LOG_LEVEL", "debug"),
                ("MERIDIAN_LOG_FORMAT", "pretty"),
                ("MERIDIAN_NOT_FOUND_THRESHOLD", "0.0"),
            ]))
            .unwrap();

        assert_eq!(config.server.http_addr, "0.0.0.0:9999");
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert!(config.directory.not_found_threshold.abs() < f64::EPSILON);
    }

    #[test]
    fn test_addr_override_then_port() {
        let config = AppConfig::default()
            .with_overrides(lookup(&[
                ("MERIDIAN_HTTP_ADDR", "127.0.0.1:1234"),
                ("MERIDIAN_PORT", "5678"),
            ]))
            .unwrap();
        assert_eq!(config.server.http_addr, "127.0.0.1:5678");
    }

    #[test]
    fn test_unparsable_port_is_an_error() {
        let err = AppConfig::default()
            .with_overrides(lookup(&[("MERIDIAN_PORT", "abc")]))
            .unwrap_err();

        assert!(matches!(&err, ConfigError::Invalid(msg) if msg.contains("MERIDIAN_PORT")));
    }

    #[test]
    fn test_each_bad_override_is_reported() {
        for (key, value) in [
            ("MERIDIAN_PORT", "70000"),
            ("MERIDIAN_LOG_FORMAT", "xml"),
            ("MERIDIAN_NOT_FOUND_THRESHOLD", "often"),
        ] {
            let result = AppConfig::default().with_overrides(lookup(&[(key, value)]));
            assert!(
                matches!(&result, Err(ConfigError::Invalid(msg)) if msg.contains(key)),
                "{key}={value} should be rejected"
            );
        }
    }

    #[test]
    fn test_validation() {
        assert!(AppConfig::default().validate().is_ok());

        let mut config = AppConfig::default();
        config.directory.not_found_threshold = 1.5;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = AppConfig::default();
        config.server.http_addr = "localhost".to_string();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.server.max_body_bytes = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_derived_configs() {
        let mut config = AppConfig::default();
        config.server.request_timeout_secs = 3;
        config.logging.format = LogFormat::Pretty;
        config.directory.not_found_threshold = 1.0;

        let server = config.server_config();
        assert_eq!(server.request_timeout(), Duration::from_secs(3));
        assert!((server.not_found_threshold() - 1.0).abs() < f64::EPSILON);

        let log = config.log_config();
        assert_eq!(log.format, LogFormat::Pretty);
        assert_eq!(log.level, "info");
    }
}
