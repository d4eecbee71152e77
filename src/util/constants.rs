// LogTail - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.
// Config validation and the engine both read their bounds from here.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "LogTail";

/// Application identifier used for config/data directories.
pub const APP_ID: &str = "LogTail";

/// Current application version (updated by release script).
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Engine limits
// =============================================================================

/// Default maximum number of files tracked by the watcher registry at once.
pub const DEFAULT_MAX_WATCHERS: usize = 10;

/// Minimum user-configurable watcher ceiling.
pub const MIN_MAX_WATCHERS: usize = 1;

/// Hard upper bound on the watcher ceiling (prevents configuration mistakes).
pub const ABSOLUTE_MAX_WATCHERS: usize = 1_000;

/// Default number of worker threads executing tail reads.
pub const DEFAULT_WORKER_THREADS: usize = 10;

/// Minimum user-configurable worker count.
pub const MIN_WORKER_THREADS: usize = 1;

/// Maximum user-configurable worker count.
pub const MAX_WORKER_THREADS: usize = 256;

/// Default block size in bytes for backward tail reads.
pub const DEFAULT_BLOCK_SIZE: usize = 4 * 1024; // 4 KiB

/// Smallest accepted block size. Anything below this turns a tail read into
/// a syscall per handful of bytes.
pub const MIN_BLOCK_SIZE: usize = 64;

/// Largest accepted block size.
pub const MAX_BLOCK_SIZE: usize = 1024 * 1024; // 1 MiB

/// Default upper bound on how long a request waits for its read (ms).
/// Zero disables the timeout.
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 30_000;

/// Maximum user-configurable read timeout (ms).
pub const MAX_READ_TIMEOUT_MS: u64 = 600_000; // 10 min

/// How long `Engine::shutdown` waits for in-flight reads to drain (ms).
pub const SHUTDOWN_DRAIN_TIMEOUT_MS: u64 = 10_000;

// =============================================================================
// Tail request limits
// =============================================================================

/// Default number of lines returned when a request does not specify a count.
pub const DEFAULT_NUM_ENTRIES: usize = 10;

/// Default maximum number of lines a single request may ask for.
pub const DEFAULT_MAX_TAIL_LINES: usize = 100;

/// Hard upper bound on the per-request line ceiling.
pub const ABSOLUTE_MAX_TAIL_LINES: usize = 100_000;

/// Characters rejected in file names and filters. Slashes would let a caller
/// escape the base directory with `../`.
pub const NOT_ALLOWED_INPUT_CHARS: &str = r"[/\\]";

// =============================================================================
// Logging
// =============================================================================

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

// =============================================================================
// Configuration
// =============================================================================

/// Configuration file name.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Default log directory name, relative to the working directory, used when
/// neither the CLI nor config.toml names a base directory.
pub const DEFAULT_BASE_DIR: &str = "logs";
