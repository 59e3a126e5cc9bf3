//! Process logging bootstrap.
//!
//! # Responsibility
//! - Start the `flexi_logger` backend behind the `log` facade exactly once.
//! - Capture panics as sanitized log events.
//!
//! # Invariants
//! - Initialization is idempotent for an identical [`LoggingConfig`].
//! - Re-initialization with a different level or destination is rejected.
//! - Initialization never panics.
//!
//! Core modules log `event=<name> module=<module> status=<status>` followed by
//! `key=value` pairs, so lines stay grep-able in both file and stderr output.

use crate::config::LoggingConfig;
use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::{error, info};
use once_cell::sync::OnceCell;
use std::path::{Path, PathBuf};
use thiserror::Error;

const LOG_FILE_BASENAME: &str = "employee_store";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;
const MAX_LOG_FILES: usize = 5;
const MAX_PANIC_PAYLOAD_CHARS: usize = 160;

static LOGGING_STATE: OnceCell<LoggingState> = OnceCell::new();
static PANIC_HOOK_INSTALLED: OnceCell<()> = OnceCell::new();

/// Logging bootstrap failure.
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("unsupported log level `{0}`; expected trace|debug|info|warn|error")]
    UnsupportedLevel(String),
    #[error("log_dir must be an absolute path, got `{}`", .0.display())]
    RelativeLogDir(PathBuf),
    #[error("failed to create log directory `{}`: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to start logger: {0}")]
    Backend(#[from] flexi_logger::FlexiLoggerError),
    #[error("logging already initialized with {active}; refusing to switch to {requested}")]
    Conflict { active: String, requested: String },
}

struct LoggingState {
    level: &'static str,
    log_dir: Option<PathBuf>,
    _logger: LoggerHandle,
}

impl LoggingState {
    fn describe(&self) -> String {
        describe(self.level, self.log_dir.as_deref())
    }
}

/// Initializes process logging from configuration.
///
/// With `log_dir` set, logs rotate under that directory
/// (10 MiB per file, 5 files kept). Without it, logs go to stderr.
///
/// # Errors
/// - [`LoggingError::UnsupportedLevel`] / [`LoggingError::RelativeLogDir`] for bad input.
/// - [`LoggingError::Conflict`] when already initialized differently.
/// - [`LoggingError::CreateDir`] / [`LoggingError::Backend`] when setup fails.
pub fn init_logging(config: &LoggingConfig) -> Result<(), LoggingError> {
    let level = normalize_level(&config.level)?;
    let log_dir = match config.log_dir.as_deref() {
        Some(dir) => Some(normalize_log_dir(dir)?),
        None => None,
    };

    let state = LOGGING_STATE.get_or_try_init(|| start_logger(level, log_dir.clone()))?;

    if state.level != level || state.log_dir != log_dir {
        return Err(LoggingError::Conflict {
            active: state.describe(),
            requested: describe(level, log_dir.as_deref()),
        });
    }

    Ok(())
}

/// Returns `(level, log_dir)` of the active logger, or `None` before init.
pub fn logging_status() -> Option<(&'static str, Option<PathBuf>)> {
    LOGGING_STATE
        .get()
        .map(|state| (state.level, state.log_dir.clone()))
}

fn start_logger(
    level: &'static str,
    log_dir: Option<PathBuf>,
) -> Result<LoggingState, LoggingError> {
    let logger = Logger::try_with_str(level)?;
    let handle = match log_dir.as_deref() {
        Some(dir) => {
            std::fs::create_dir_all(dir).map_err(|source| LoggingError::CreateDir {
                path: dir.to_path_buf(),
                source,
            })?;
            logger
                .log_to_file(
                    FileSpec::default()
                        .directory(dir)
                        .basename(LOG_FILE_BASENAME),
                )
                .rotate(
                    Criterion::Size(MAX_LOG_FILE_SIZE_BYTES),
                    Naming::Numbers,
                    Cleanup::KeepLogFiles(MAX_LOG_FILES),
                )
                .write_mode(WriteMode::BufferAndFlush)
                .append()
                .format_for_files(flexi_logger::detailed_format)
                .start()?
        }
        None => logger
            .log_to_stderr()
            .format(flexi_logger::detailed_format)
            .start()?,
    };

    install_panic_hook_once();

    info!(
        "event=logging_init module=logging status=ok level={} destination={} version={}",
        level,
        log_dir
            .as_deref()
            .map_or_else(|| "stderr".to_string(), |dir| dir.display().to_string()),
        env!("CARGO_PKG_VERSION")
    );

    Ok(LoggingState {
        level,
        log_dir,
        _logger: handle,
    })
}

fn describe(level: &str, log_dir: Option<&Path>) -> String {
    match log_dir {
        Some(dir) => format!("level `{level}` at `{}`", dir.display()),
        None => format!("level `{level}` on stderr"),
    }
}

fn normalize_level(level: &str) -> Result<&'static str, LoggingError> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok("trace"),
        "debug" => Ok("debug"),
        "info" => Ok("info"),
        "warn" | "warning" => Ok("warn"),
        "error" => Ok("error"),
        other => Err(LoggingError::UnsupportedLevel(other.to_string())),
    }
}

fn normalize_log_dir(log_dir: &Path) -> Result<PathBuf, LoggingError> {
    if !log_dir.is_absolute() {
        return Err(LoggingError::RelativeLogDir(log_dir.to_path_buf()));
    }
    Ok(log_dir.to_path_buf())
}

fn install_panic_hook_once() {
    if PANIC_HOOK_INSTALLED.set(()).is_err() {
        return;
    }

    let previous_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let location = panic_info
            .location()
            .map_or_else(|| "unknown".to_string(), |loc| format!("{}:{}", loc.file(), loc.line()));
        let payload = panic_payload_summary(panic_info);
        error!(
            "event=panic_captured module=logging status=error location={} payload={}",
            location, payload
        );
        previous_hook(panic_info);
    }));
}

fn panic_payload_summary(info: &std::panic::PanicHookInfo<'_>) -> String {
    let payload = if let Some(message) = info.payload().downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = info.payload().downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    };

    sanitize_message(&payload, MAX_PANIC_PAYLOAD_CHARS)
}

/// Flattens newlines and caps length so one event stays on one log line.
pub(crate) fn sanitize_message(value: &str, max_chars: usize) -> String {
    let normalized = value.replace(['\n', '\r'], " ");
    let mut truncated = normalized.chars().take(max_chars).collect::<String>();
    if normalized.chars().count() > max_chars {
        truncated.push_str("...");
    }
    truncated
}

#[cfg(test)]
mod tests {
    use super::{
        init_logging, logging_status, normalize_level, normalize_log_dir, sanitize_message,
        LoggingError,
    };
    use crate::config::LoggingConfig;
    use std::path::Path;

    #[test]
    fn normalize_level_accepts_known_values() {
        assert_eq!(normalize_level("INFO").unwrap(), "info");
        assert_eq!(normalize_level(" warning ").unwrap(), "warn");
        assert!(matches!(
            normalize_level("verbose"),
            Err(LoggingError::UnsupportedLevel(level)) if level == "verbose"
        ));
    }

    #[test]
    fn normalize_log_dir_rejects_relative_path() {
        let err = normalize_log_dir(Path::new("logs/dev")).unwrap_err();
        assert!(err.to_string().contains("absolute"));
    }

    #[test]
    fn sanitize_message_removes_newlines_and_truncates() {
        let sanitized = sanitize_message("line1\nline2\rline3", 8);
        assert!(!sanitized.contains('\n'));
        assert!(!sanitized.contains('\r'));
        assert!(sanitized.ends_with("..."));
        assert_eq!(sanitize_message("short", 8), "short");
    }

    #[test]
    fn init_logging_is_idempotent_and_rejects_conflicts() {
        let dir = tempfile::tempdir().unwrap();
        let config = LoggingConfig {
            level: "info".to_string(),
            log_dir: Some(dir.path().to_path_buf()),
        };

        init_logging(&config).unwrap();
        init_logging(&config).unwrap();

        let louder = LoggingConfig {
            level: "debug".to_string(),
            ..config.clone()
        };
        assert!(matches!(
            init_logging(&louder),
            Err(LoggingError::Conflict { .. })
        ));

        let to_stderr = LoggingConfig {
            log_dir: None,
            ..config.clone()
        };
        let err = init_logging(&to_stderr).unwrap_err();
        assert!(err.to_string().contains("refusing to switch"));

        let (level, log_dir) = logging_status().unwrap();
        assert_eq!(level, "info");
        assert_eq!(log_dir.as_deref(), Some(dir.path()));
    }
}
