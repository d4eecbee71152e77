// LogTail - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// No string-based error propagation: every variant carries the file name or
// field it concerns so the boundary layer can build a user-facing message.

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

/// Top-level error type for all LogTail operations.
/// Errors are categorised by the subsystem that produced them.
#[derive(Debug)]
pub enum LogTailError {
    /// The tail engine failed to produce a result.
    Tail(TailError),

    /// The incoming request was rejected before reaching the engine.
    Request(RequestError),

    /// Configuration loading or validation failed.
    Config(ConfigError),

    /// I/O error with path context.
    Io {
        path: PathBuf,
        operation: &'static str,
        source: io::Error,
    },
}

impl LogTailError {
    /// Transport-level status code for this error (HTTP semantics).
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Tail(e) => e.status_code(),
            Self::Request(_) => 400,
            Self::Config(_) | Self::Io { .. } => 500,
        }
    }
}

impl fmt::Display for LogTailError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tail(e) => write!(f, "Tail error: {e}"),
            Self::Request(e) => write!(f, "Invalid request: {e}"),
            Self::Config(e) => write!(f, "Configuration error: {e}"),
            Self::Io {
                path,
                operation,
                source,
            } => write!(
                f,
                "I/O error during {operation} on '{}': {source}",
                path.display()
            ),
        }
    }
}

impl std::error::Error for LogTailError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Tail(e) => Some(e),
            Self::Request(e) => Some(e),
            Self::Config(e) => Some(e),
            Self::Io { source, .. } => Some(source),
        }
    }
}

// ---------------------------------------------------------------------------
// Tail engine errors
// ---------------------------------------------------------------------------

/// Errors produced by the watcher registry and its worker pool.
#[derive(Debug)]
pub enum TailError {
    /// The requested file does not exist under the base directory.
    NotFound { file: String, path: PathBuf },

    /// The registry already tracks its maximum number of files.
    CapacityExceeded { file: String, max: usize },

    /// Reading a file that was known to exist failed.
    Io { file: String, source: io::Error },

    /// The read did not complete within the configured timeout.
    Timeout { file: String, timeout: Duration },

    /// The engine is shutting down and no longer admits requests.
    ShuttingDown,

    /// The worker pool could not be built or lost its worker mid-read.
    WorkerPool { reason: String },
}

impl TailError {
    /// Transport-level status code for this error (HTTP semantics).
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NotFound { .. } => 404,
            Self::CapacityExceeded { .. } => 429,
            Self::Io { .. } | Self::WorkerPool { .. } => 500,
            Self::ShuttingDown => 503,
            Self::Timeout { .. } => 504,
        }
    }
}

impl fmt::Display for TailError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { file, path } => write!(
                f,
                "File '{file}' does not exist on server ('{}')",
                path.display()
            ),
            Self::CapacityExceeded { file, max } => write!(
                f,
                "Cannot watch '{file}': reached maximum number of file watchers ({max}). \
                 Retry later."
            ),
            Self::Io { file, source } => write!(f, "Failed to read '{file}': {source}"),
            Self::Timeout { file, timeout } => write!(
                f,
                "Reading '{file}' did not complete within {} ms",
                timeout.as_millis()
            ),
            Self::ShuttingDown => write!(f, "Engine is shutting down"),
            Self::WorkerPool { reason } => write!(f, "Worker pool failure: {reason}"),
        }
    }
}

impl std::error::Error for TailError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<TailError> for LogTailError {
    fn from(e: TailError) -> Self {
        Self::Tail(e)
    }
}

// ---------------------------------------------------------------------------
// Request errors
// ---------------------------------------------------------------------------

/// Errors raised while validating an incoming tail request.
#[derive(Debug)]
pub enum RequestError {
    /// The file name is empty, a dot segment, or contains a path separator.
    InvalidFileName { file: String },

    /// The filter contains a path separator.
    InvalidFilter { filter: String },

    /// The requested line count is outside the allowed range.
    NumEntriesOutOfRange {
        requested: usize,
        min: usize,
        max: usize,
    },
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidFileName { file } => write!(
                f,
                "File name '{file}' is invalid. Forward and backward slashes are not \
                 allowed in file names"
            ),
            Self::InvalidFilter { filter } => write!(
                f,
                "Filter '{filter}' is invalid. Forward and backward slashes are not allowed"
            ),
            Self::NumEntriesOutOfRange {
                requested,
                min,
                max,
            } => write!(
                f,
                "Requested {requested} log entries; minimum is {min} and maximum is {max}"
            ),
        }
    }
}

impl std::error::Error for RequestError {}

impl From<RequestError> for LogTailError {
    fn from(e: RequestError) -> Self {
        Self::Request(e)
    }
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

/// Errors related to configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    /// TOML parsing failed.
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// A config value is out of the allowed range.
    ValueOutOfRange {
        field: String,
        value: String,
        expected: String,
    },

    /// I/O error reading config file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TomlParse { path, source } => {
                write!(f, "Config parse error '{}': {source}", path.display())
            }
            Self::ValueOutOfRange {
                field,
                value,
                expected,
            } => write!(
                f,
                "Config '{field}' = '{value}' is out of range. Expected: {expected}"
            ),
            Self::Io { path, source } => {
                write!(f, "Config I/O error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TomlParse { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ConfigError> for LogTailError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// Convenience type alias for LogTail results.
pub type Result<T> = std::result::Result<T, LogTailError>;
