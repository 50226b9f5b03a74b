//! Tracing subscriber setup.
//!
//! The library itself only emits `tracing` events (targets under
//! `apibind::`); installing a subscriber is left to the application. These
//! helpers cover the common cases:
//!
//! ```rust,no_run
//! use apibind::telemetry::{init_subscriber, OutputFormat, SubscriberConfig};
//!
//! # fn main() -> apibind::error::Result<()> {
//! let config = SubscriberConfig::builder()
//!     .log_level(tracing::Level::DEBUG)
//!     .output_format(OutputFormat::Json)
//!     .build();
//! init_subscriber(config)?;
//! # Ok(())
//! # }
//! ```

use crate::error::{BindError, Result};

pub const LOG_LEVEL_ENV: &str = "APIBIND_LOG_LEVEL";
pub const LOG_FORMAT_ENV: &str = "APIBIND_LOG_FORMAT";

/// Output format for tracing logs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text format
    #[default]
    Text,
    /// JSON format
    Json,
    /// Compact JSON format
    JsonCompact,
}

impl std::str::FromStr for OutputFormat {
    type Err = BindError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            "json-compact" => Ok(Self::JsonCompact),
            _ => Err(BindError::ConfigurationError(format!(
                "Invalid log format: {s}. Valid options: text, json, json-compact"
            ))),
        }
    }
}

/// Configuration for the tracing subscriber
#[derive(Debug, Clone)]
pub struct SubscriberConfig {
    pub log_level: tracing::Level,
    pub output_format: OutputFormat,
}

impl Default for SubscriberConfig {
    fn default() -> Self {
        Self {
            log_level: tracing::Level::INFO,
            output_format: OutputFormat::Text,
        }
    }
}

impl SubscriberConfig {
    pub fn builder() -> SubscriberConfigBuilder {
        SubscriberConfigBuilder::default()
    }

    /// Debug-level text output.
    pub fn debug() -> Self {
        Self {
            log_level: tracing::Level::DEBUG,
            output_format: OutputFormat::Text,
        }
    }

    /// `EnvFilter` directive for this configuration.
    pub fn filter_directive(&self) -> String {
        format!("apibind={}", level_name(self.log_level))
    }
}

/// Builder for `SubscriberConfig`
#[derive(Debug, Default)]
pub struct SubscriberConfigBuilder {
    log_level: Option<tracing::Level>,
    output_format: Option<OutputFormat>,
}

impl SubscriberConfigBuilder {
    pub fn log_level(mut self, level: tracing::Level) -> Self {
        self.log_level = Some(level);
        self
    }

    /// Set the log level from a string
    pub fn log_level_str(mut self, level: &str) -> Result<Self> {
        let parsed = match level.trim().to_lowercase().as_str() {
            "trace" => tracing::Level::TRACE,
            "debug" => tracing::Level::DEBUG,
            "info" => tracing::Level::INFO,
            "warn" => tracing::Level::WARN,
            "error" => tracing::Level::ERROR,
            _ => {
                return Err(BindError::ConfigurationError(format!(
                    "Invalid log level: {level}. Valid options: trace, debug, info, warn, error"
                )));
            }
        };
        self.log_level = Some(parsed);
        Ok(self)
    }

    pub fn output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = Some(format);
        self
    }

    pub fn build(self) -> SubscriberConfig {
        SubscriberConfig {
            log_level: self.log_level.unwrap_or(tracing::Level::INFO),
            output_format: self.output_format.unwrap_or_default(),
        }
    }
}

fn level_name(level: tracing::Level) -> &'static str {
    match level {
        tracing::Level::TRACE => "trace",
        tracing::Level::DEBUG => "debug",
        tracing::Level::INFO => "info",
        tracing::Level::WARN => "warn",
        tracing::Level::ERROR => "error",
    }
}

/// Install a global `tracing` subscriber.
///
/// An already installed global subscriber is not an error; the existing one
/// is kept.
pub fn init_subscriber(config: SubscriberConfig) -> Result<()> {
    let filter = config.filter_directive();

    let init_result = match config.output_format {
        OutputFormat::Json => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(true)
            .with_thread_names(true)
            .json()
            .try_init(),
        OutputFormat::JsonCompact => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .json()
            .flatten_event(true)
            .try_init(),
        OutputFormat::Text => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .try_init(),
    };

    match init_result {
        Ok(()) => Ok(()),
        Err(_) if tracing::dispatcher::has_been_set() => Ok(()),
        Err(e) => Err(BindError::ConfigurationError(format!(
            "Failed to initialize tracing: {e}"
        ))),
    }
}

pub fn init_default() -> Result<()> {
    init_subscriber(SubscriberConfig::default())
}

pub fn init_debug() -> Result<()> {
    init_subscriber(SubscriberConfig::debug())
}

/// Build a configuration from `APIBIND_LOG_LEVEL` (trace, debug, info, warn,
/// error) and `APIBIND_LOG_FORMAT` (text, json, json-compact).
pub fn config_from_env() -> Result<SubscriberConfig> {
    let mut builder = SubscriberConfig::builder();
    if let Ok(level) = std::env::var(LOG_LEVEL_ENV) {
        builder = builder.log_level_str(&level)?;
    }
    if let Ok(format) = std::env::var(LOG_FORMAT_ENV) {
        builder = builder.output_format(format.parse()?);
    }
    Ok(builder.build())
}

/// Initialize tracing subscriber from environment variables
pub fn init_from_env() -> Result<()> {
    init_subscriber(config_from_env()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_parses_levels() {
        let config = SubscriberConfig::builder()
            .log_level_str("WARN")
            .unwrap()
            .build();
        assert_eq!(config.log_level, tracing::Level::WARN);
        assert_eq!(config.filter_directive(), "apibind=warn");
        assert!(SubscriberConfig::builder().log_level_str("loud").is_err());
    }

    #[test]
    fn output_format_from_str() {
        assert_eq!("json-compact".parse::<OutputFormat>().unwrap(), OutputFormat::JsonCompact);
        assert_eq!(" Text ".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert!(matches!(
            "xml".parse::<OutputFormat>(),
            Err(BindError::ConfigurationError(_))
        ));
    }
}
