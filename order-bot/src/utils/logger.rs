//! Logging Infrastructure
//!
//! Structured logging setup: human-readable lines for local runs, JSON lines
//! for production, optionally written to a daily rolling file.

use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

const LOG_FILE_PREFIX: &str = "order-bot";

/// Initialize the logger with optional file output
///
/// `RUST_LOG` overrides `log_level` when set.
pub fn init_logger_with_file(log_level: Option<&str>, json: bool, log_dir: Option<&str>) {
    let level = log_level.unwrap_or("info");
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(false);

    let log_path = log_dir.and_then(|dir| match prepare_log_dir(dir) {
        Ok(path) => Some(path),
        Err(e) => {
            eprintln!("Cannot use log directory {dir}: {e}, logging to stdout");
            None
        }
    });

    match (log_path, json) {
        (Some(path), true) => {
            let file_appender = tracing_appender::rolling::daily(path, LOG_FILE_PREFIX);
            subscriber.json().with_writer(file_appender).init();
        }
        (Some(path), false) => {
            let file_appender = tracing_appender::rolling::daily(path, LOG_FILE_PREFIX);
            subscriber.with_ansi(false).with_writer(file_appender).init();
        }
        (None, true) => subscriber.json().init(),
        (None, false) => subscriber.init(),
    }
}

/// Create the log directory if needed
fn prepare_log_dir(dir: &str) -> std::io::Result<PathBuf> {
    let path = Path::new(dir);
    std::fs::create_dir_all(path)?;
    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prepare_log_dir_creates_nested_directories() {
        let tmp = tempfile::tempdir().unwrap();
        let nested = tmp.path().join("logs").join("bot");

        let path = prepare_log_dir(nested.to_str().unwrap()).unwrap();

        assert!(path.is_dir());
        assert_eq!(path, nested);
    }

    #[test]
    fn test_prepare_log_dir_accepts_existing_directory() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(prepare_log_dir(tmp.path().to_str().unwrap()).is_ok());
    }
}
