//! Structured logging for the service.
//!
//! Events go to stdout and, when `logging.file` is set, are appended to that
//! file as well. `RUST_LOG` directives are honoured on top of the configured
//! level.

use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Arc;

use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;
use crate::{Result, ShelfError};

/// Map a configured level name to a tracing level. Unknown names mean `info`.
fn parse_level(level: &str) -> Level {
    match level.trim().to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" | "warning" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

fn level_filter(level: &str) -> EnvFilter {
    EnvFilter::from_default_env().add_directive(parse_level(level).into())
}

/// Install the global subscriber for `config`.
///
/// Fails if the log file cannot be opened or a subscriber is already set.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let log_path = config.file.trim();
    if log_path.is_empty() {
        init_console_only(&config.level);
        return Ok(());
    }

    if let Some(dir) = Path::new(log_path).parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir)?;
        }
    }

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)?;
    let writer = std::io::stdout.and(Arc::new(log_file));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false),
        )
        .with(level_filter(&config.level))
        .try_init()
        .map_err(|e| ShelfError::Configuration(format!("logging already initialised: {e}")))
}

/// Install a stdout-only subscriber. A no-op if one is already installed.
pub fn init_console_only(level: &str) {
    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stdout))
        .with(level_filter(level))
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level_known() {
        assert_eq!(parse_level("trace"), Level::TRACE);
        assert_eq!(parse_level("DEBUG"), Level::DEBUG);
        assert_eq!(parse_level(" info "), Level::INFO);
        assert_eq!(parse_level("warning"), Level::WARN);
        assert_eq!(parse_level("Error"), Level::ERROR);
    }

    #[test]
    fn test_parse_level_default() {
        assert_eq!(parse_level("verbose"), Level::INFO);
        assert_eq!(parse_level(""), Level::INFO);
    }

    #[test]
    fn test_init_unwritable_log_file_fails() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let config = LoggingConfig {
            level: "info".to_string(),
            // A directory cannot be opened for appending
            file: temp_dir.path().to_string_lossy().into_owned(),
        };

        assert!(matches!(init(&config), Err(ShelfError::Io(_))));
    }
}
