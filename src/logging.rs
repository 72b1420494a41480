//! Tracing subscriber setup.
//!
//! Log lines go to stderr and, unless disabled, are appended to a plain-text
//! log file as well. Both outputs share the same `RUST_LOG` filter (default
//! `info`) and RFC 3339 UTC timestamps.

use std::error::Error;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global subscriber.
///
/// The returned guard flushes the file writer on drop and must be held for
/// as long as the process logs.
pub fn init(log_file: Option<&str>) -> Result<Option<WorkerGuard>, Box<dyn Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let console = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(UtcTime::rfc_3339());

    let (file, guard) = match log_file {
        Some(path) => {
            let (dir, name) = split_log_path(path);
            let appender = RollingFileAppender::builder()
                .rotation(Rotation::NEVER)
                .filename_prefix(name)
                .build(dir)?;
            let (writer, guard) = non_blocking(appender);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true)
                .with_timer(UtcTime::rfc_3339());
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file)
        .try_init()?;
    Ok(guard)
}

/// Directory and file name of `path`; a bare name lives in the working directory.
fn split_log_path(path: &str) -> (PathBuf, String) {
    let path = Path::new(path);
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."))
        .to_path_buf();
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "scraper.log".to_string());
    (dir, name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_name_uses_working_directory() {
        assert_eq!(
            split_log_path("scraper.log"),
            (PathBuf::from("."), "scraper.log".to_string())
        );
    }

    #[test]
    fn test_nested_path_is_split() {
        assert_eq!(
            split_log_path("logs/daily/scraper.log"),
            (PathBuf::from("logs/daily"), "scraper.log".to_string())
        );
    }

    #[test]
    fn test_directory_only_path_gets_default_name() {
        let (_, name) = split_log_path("logs/..");
        assert_eq!(name, "scraper.log");
    }
}
