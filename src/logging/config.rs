//! Logging configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const VALID_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level for this crate (trace, debug, info, warn, error)
    pub level: String,

    /// Enable console output (stderr)
    pub console_output: bool,

    /// Directory for daily-rolling JSON log files (None = no file logging)
    pub log_directory: Option<PathBuf>,

    /// File name prefix inside `log_directory`
    pub file_prefix: String,

    /// Include source file and line in console output
    pub include_file_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            console_output: true,
            log_directory: None,
            file_prefix: "ringalign.log".to_string(),
            include_file_location: false,
        }
    }
}

impl LoggingConfig {
    /// Verbose console plus JSON files under `logs/`.
    pub fn development() -> Self {
        Self {
            level: "debug".to_string(),
            log_directory: Some(PathBuf::from("logs")),
            include_file_location: true,
            ..Default::default()
        }
    }

    /// Warnings and errors only, no files.
    pub fn quiet() -> Self {
        Self {
            level: "warn".to_string(),
            ..Default::default()
        }
    }

    /// Map a `-v` count onto a level: 0 keeps the configured one.
    pub fn with_verbosity(mut self, verbose: u8) -> Self {
        match verbose {
            0 => {}
            1 => self.level = "debug".to_string(),
            _ => self.level = "trace".to_string(),
        }
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if !VALID_LEVELS.contains(&self.level.as_str()) {
            return Err(format!(
                "Invalid log level: {}. Must be one of: {:?}",
                self.level, VALID_LEVELS
            ));
        }

        if self.file_prefix.trim().is_empty() {
            return Err("file_prefix must not be empty".to_string());
        }

        if let Some(ref log_dir) = self.log_directory {
            if let Some(parent) = log_dir.parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    return Err(format!("Log directory parent does not exist: {:?}", parent));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, "info");
        assert!(config.console_output);
        assert!(config.log_directory.is_none());

        let dev = LoggingConfig::development();
        assert_eq!(dev.level, "debug");
        assert!(dev.include_file_location);
        assert!(dev.log_directory.is_some());

        assert_eq!(LoggingConfig::quiet().level, "warn");
    }

    #[test]
    fn test_verbosity() {
        assert_eq!(LoggingConfig::quiet().with_verbosity(0).level, "warn");
        assert_eq!(LoggingConfig::default().with_verbosity(1).level, "debug");
        assert_eq!(LoggingConfig::default().with_verbosity(4).level, "trace");
    }

    #[test]
    fn test_validation() {
        let mut config = LoggingConfig::default();
        assert!(config.validate().is_ok());

        config.level = "loud".to_string();
        assert!(config.validate().is_err());

        config.level = "debug".to_string();
        config.log_directory = Some(PathBuf::from("/definitely/not/here/logs"));
        assert!(config.validate().is_err());
    }
}
