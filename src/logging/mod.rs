//! Structured logging for alignment runs.
//!
//! Console output goes through a `fmt` layer; when a log directory is
//! configured, a daily-rolling JSON file layer is added. Every solve and
//! sweep carries a correlation id so file logs can be grouped per run.

pub mod config;
pub mod spans;

use crate::AlignError;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};
use uuid::Uuid;

pub use config::LoggingConfig;
pub use spans::{AlignmentSpan, SweepSpan};

/// Install the global subscriber.
///
/// `RUST_LOG` takes precedence over `config.level`. The returned guard must be
/// held for as long as file output should be flushed.
pub fn init_logging(config: &LoggingConfig) -> crate::Result<Option<WorkerGuard>> {
    config.validate().map_err(AlignError::InvalidConfig)?;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME").replace('-', "_"), config.level))
    });

    let mut layers = Vec::new();
    let mut guard = None;

    if config.console_output {
        let console_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_line_number(config.include_file_location)
            .with_file(config.include_file_location);
        layers.push(console_layer.boxed());
    }

    if let Some(ref log_dir) = config.log_directory {
        std::fs::create_dir_all(log_dir)?;
        let file_appender = tracing_appender::rolling::daily(log_dir, &config.file_prefix);
        let (non_blocking, file_guard) = tracing_appender::non_blocking(file_appender);
        guard = Some(file_guard);

        let file_layer = fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .json();
        layers.push(file_layer.boxed());
    }

    tracing_subscriber::registry()
        .with(env_filter)
        .with(layers)
        .try_init()
        .map_err(|e| AlignError::InvalidConfig(format!("logging already initialised: {e}")))?;

    tracing::debug!(?config, "Logging initialised");
    Ok(guard)
}

/// Fresh id tying together every log line of one solve or sweep.
pub fn new_correlation_id() -> Uuid {
    Uuid::new_v4()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_correlation_ids_are_unique() {
        let a = new_correlation_id();
        let b = new_correlation_id();
        assert_ne!(a, b);
        assert_eq!(a.get_version_num(), 4);
    }

    #[test]
    fn test_invalid_config_is_rejected_before_install() {
        let config = LoggingConfig {
            level: "chatty".to_string(),
            ..Default::default()
        };
        assert!(matches!(init_logging(&config), Err(AlignError::InvalidConfig(_))));
    }

    #[test]
    fn test_file_logging_returns_guard() {
        let temp_dir = TempDir::new().unwrap();
        let config = LoggingConfig {
            console_output: false,
            log_directory: Some(temp_dir.path().join("logs")),
            ..Default::default()
        };

        // Only this test installs a subscriber in the unit test binary.
        let guard = init_logging(&config).unwrap();
        assert!(guard.is_some());
        assert!(temp_dir.path().join("logs").is_dir());
    }
}
