//! Logging setup for weave
//!
//! Every weave crate logs through `tracing`. This crate owns the one place
//! where a subscriber gets installed, so the binary and the integration tests
//! configure output the same way.
//!
//! # Features
//!
//! - **JSONL Output**: Structured JSON lines on the console (default)
//! - **Pretty Output**: Human-readable console output for interactive runs
//! - **File Output**: JSONL copy of every event, optionally rotated daily/hourly
//! - **RUST_LOG**: Overrides the configured default level
//!
//! # Quick Start
//!
//! ```ignore
//! use weave_logging::{LogConfig, WeaveSubscriberBuilder};
//!
//! // JSONL to console
//! let _guard = WeaveSubscriberBuilder::new().try_init()?;
//!
//! // Pretty output while iterating on a config
//! let _guard = WeaveSubscriberBuilder::new()
//!     .with_config(LogConfig::development())
//!     .try_init()?;
//! ```

pub mod config;

pub use config::{ConsoleConfig, FileConfig, JsonlConfig, LogConfig, RotationStrategy};

use std::fs::{self, File};

use thiserror::Error;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Errors raised while installing the subscriber
#[derive(Debug, Error)]
pub enum LogError {
    #[error("failed to open log file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to install subscriber: {0}")]
    Init(#[from] TryInitError),
}

/// Builder for configuring and initializing the weave logging subscriber
///
/// By default, console output uses JSONL format. Use `LogConfig::development()`
/// for human-readable pretty output.
pub struct WeaveSubscriberBuilder {
    config: LogConfig,
}

impl WeaveSubscriberBuilder {
    /// Create a new subscriber builder with default configuration
    pub fn new() -> Self {
        Self {
            config: LogConfig::default(),
        }
    }

    /// Use a specific configuration
    pub fn with_config(mut self, config: LogConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the default log level
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.config.default_level = level.into();
        self
    }

    /// Switch the console between pretty and JSONL output
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.config.console.pretty = pretty;
        self.config.console.ansi = pretty;
        self
    }

    /// Enable or disable console output
    pub fn with_console(mut self, enabled: bool) -> Self {
        self.config.console.enabled = enabled;
        self
    }

    /// Configure file output
    pub fn with_file_output(mut self, config: FileConfig) -> Self {
        self.config.file = Some(config);
        self
    }

    /// Install the subscriber as the global default.
    ///
    /// The returned guard flushes file output on drop and must be kept alive
    /// for the duration of the program.
    pub fn try_init(self) -> Result<Option<WorkerGuard>, LogError> {
        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&self.config.default_level));
        let registry = Registry::default().with(env_filter);
        let jsonl = &self.config.jsonl;

        let file = match &self.config.file {
            Some(file_config) => Some(create_file_writer(file_config)?),
            None => None,
        };

        // Separate arms per layer combination keep the layer types concrete
        match (self.config.console.enabled, self.config.console.pretty, file) {
            (true, true, Some((writer, guard))) => {
                let console_layer = tracing_subscriber::fmt::layer()
                    .with_ansi(self.config.console.ansi)
                    .with_target(true);
                let file_layer = tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(jsonl.include_spans)
                    .flatten_event(jsonl.flatten_events)
                    .with_file(jsonl.include_location)
                    .with_line_number(jsonl.include_location)
                    .with_writer(writer);
                registry.with(console_layer).with(file_layer).try_init()?;
                Ok(Some(guard))
            }

            (true, false, Some((writer, guard))) => {
                let console_layer = tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(jsonl.include_spans)
                    .flatten_event(jsonl.flatten_events)
                    .with_file(jsonl.include_location)
                    .with_line_number(jsonl.include_location);
                let file_layer = tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(jsonl.include_spans)
                    .flatten_event(jsonl.flatten_events)
                    .with_file(jsonl.include_location)
                    .with_line_number(jsonl.include_location)
                    .with_writer(writer);
                registry.with(console_layer).with(file_layer).try_init()?;
                Ok(Some(guard))
            }

            (false, _, Some((writer, guard))) => {
                let file_layer = tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(jsonl.include_spans)
                    .flatten_event(jsonl.flatten_events)
                    .with_file(jsonl.include_location)
                    .with_line_number(jsonl.include_location)
                    .with_writer(writer);
                registry.with(file_layer).try_init()?;
                Ok(Some(guard))
            }

            (true, true, None) => {
                let console_layer = tracing_subscriber::fmt::layer()
                    .with_ansi(self.config.console.ansi)
                    .with_target(true);
                registry.with(console_layer).try_init()?;
                Ok(None)
            }

            // JSONL console only (DEFAULT)
            (true, false, None) => {
                let console_layer = tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(jsonl.include_spans)
                    .flatten_event(jsonl.flatten_events)
                    .with_file(jsonl.include_location)
                    .with_line_number(jsonl.include_location);
                registry.with(console_layer).try_init()?;
                Ok(None)
            }

            (false, _, None) => {
                registry.try_init()?;
                Ok(None)
            }
        }
    }
}

impl Default for WeaveSubscriberBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Create the file writer; truncates for `Never`, appends for rotating files
fn create_file_writer(file_config: &FileConfig) -> Result<(NonBlocking, WorkerGuard), LogError> {
    fs::create_dir_all(&file_config.directory)?;
    let pair = match file_config.rotation {
        RotationStrategy::Never => {
            let file_path = file_config
                .directory
                .join(format!("{}.log", file_config.prefix));
            tracing_appender::non_blocking(File::create(file_path)?)
        }
        RotationStrategy::Daily => tracing_appender::non_blocking(RollingFileAppender::new(
            Rotation::DAILY,
            &file_config.directory,
            &file_config.prefix,
        )),
        RotationStrategy::Hourly => tracing_appender::non_blocking(RollingFileAppender::new(
            Rotation::HOURLY,
            &file_config.directory,
            &file_config.prefix,
        )),
    };
    Ok(pair)
}

/// Initialize logging for testing (minimal output).
///
/// Safe to call from many tests; only the first call installs a subscriber.
pub fn init_testing() {
    let _ = WeaveSubscriberBuilder::new()
        .with_config(LogConfig::testing())
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_creation() {
        let builder = WeaveSubscriberBuilder::new();
        assert_eq!(builder.config.default_level, "info");
    }

    #[test]
    fn test_default_is_jsonl() {
        let builder = WeaveSubscriberBuilder::new();
        assert!(!builder.config.console.pretty);
    }

    #[test]
    fn test_builder_with_pretty() {
        let builder = WeaveSubscriberBuilder::new().with_pretty(true);
        assert!(builder.config.console.pretty);
        assert!(builder.config.console.ansi);
    }

    #[test]
    fn test_builder_with_level() {
        let builder = WeaveSubscriberBuilder::new().with_level("trace");
        assert_eq!(builder.config.default_level, "trace");
    }

    #[test]
    fn test_builder_with_file_output() {
        let builder = WeaveSubscriberBuilder::new()
            .with_console(false)
            .with_file_output(FileConfig::default());
        assert!(!builder.config.console.enabled);
        assert_eq!(builder.config.file.unwrap().prefix, "weave");
    }

    #[test]
    fn test_init_testing_is_repeatable() {
        init_testing();
        init_testing();
    }
}
