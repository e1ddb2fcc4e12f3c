//! Logging setup for the Meridian service.
//!
//! Meridian logs through `tracing`. This crate owns the one-time subscriber
//! installation: an env filter plus a JSON (production) or pretty
//! (development) formatter.
//!
//! # Example
//!
//! ```rust,ignore
//! use meridian_telemetry::{init_logging, LogConfig, LogFormat};
//!
//! let config = LogConfig::production().with_format(LogFormat::Pretty);
//! init_logging(&config)?;
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod logging;

pub use error::TelemetryError;
pub use logging::{init_logging, LogConfig, LogFormat};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
