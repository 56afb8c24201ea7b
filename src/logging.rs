//! Tracing subscriber setup for the binary.
//!
//! Logs go to stderr, or to an append-only file when `log_path` is
//! configured, so stdout only ever carries the JSON report.

use std::io;
use std::sync::Mutex;

use camino::Utf8Path;
use cap_std::fs::OpenOptions;
use cap_std::{ambient_authority, fs_utf8::Dir};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "vdiskctl=info";

/// Errors raised while installing the subscriber.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// Raised when the log file cannot be opened.
    #[error("failed to open log file {path}: {message}")]
    Open {
        /// Path that failed to open.
        path: String,
        /// Error message from the filesystem.
        message: String,
    },
    /// Raised when a global subscriber is already installed.
    #[error("failed to install log subscriber: {0}")]
    Install(String),
}

/// Opens `path` for appending, creating it when missing.
///
/// # Errors
///
/// Returns [`LoggingError::Open`] when the parent directory or the file
/// cannot be opened.
pub fn open_log_file(path: &Utf8Path) -> Result<std::fs::File, LoggingError> {
    let open_error = |err: io::Error| LoggingError::Open {
        path: path.to_string(),
        message: err.to_string(),
    };
    let parent = path
        .parent()
        .filter(|parent| !parent.as_str().is_empty())
        .unwrap_or_else(|| Utf8Path::new("."));
    let file_name = path.file_name().ok_or_else(|| LoggingError::Open {
        path: path.to_string(),
        message: String::from("log path is missing a file name"),
    })?;

    let dir = Dir::open_ambient_dir(parent, ambient_authority()).map_err(open_error)?;
    let mut options = OpenOptions::new();
    options.create(true).append(true);
    dir.open_with(file_name, &options)
        .map(cap_std::fs_utf8::File::into_std)
        .map_err(open_error)
}

/// Installs the global subscriber, honouring `RUST_LOG`.
///
/// # Errors
///
/// Returns [`LoggingError`] when the log file cannot be opened or a
/// subscriber is already installed.
pub fn init(log_path: Option<&str>) -> Result<(), LoggingError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);
    let installed = match log_path.map(str::trim).filter(|path| !path.is_empty()) {
        Some(path) => {
            let file = open_log_file(Utf8Path::new(path))?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        None => builder.with_writer(io::stderr).try_init(),
    };
    installed.map_err(|err| LoggingError::Install(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use std::io::Write;

    #[test]
    fn log_file_is_created_and_appended() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = Utf8PathBuf::from_path_buf(temp.path().join("vdiskctl.log"))
            .expect("utf8 temp path");

        let mut first = open_log_file(&path).expect("create log file");
        writeln!(first, "one").expect("write");
        let mut second = open_log_file(&path).expect("reopen log file");
        writeln!(second, "two").expect("write");

        let contents = std::fs::read_to_string(&path).expect("read log");
        assert_eq!(contents, "one\ntwo\n");
    }

    #[test]
    fn missing_parent_directory_is_reported() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = Utf8PathBuf::from_path_buf(temp.path().join("missing").join("vdiskctl.log"))
            .expect("utf8 temp path");
        let err = open_log_file(&path).expect_err("missing parent fails");
        assert!(matches!(err, LoggingError::Open { .. }), "{err}");
    }
}
