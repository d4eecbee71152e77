// LogTail - platform/config.rs
//
// Platform-specific configuration directory resolution and config.toml
// loading with startup validation.
//
// Uses the `directories` crate for XDG (Linux), AppData (Windows),
// Library (macOS) compliance.

use crate::app::engine::EngineConfig;
use crate::app::registry::RegistryConfig;
use crate::core::model::CapacityPolicy;
use crate::gateway::request::RequestLimits;
use crate::util::constants;
use crate::util::error::ConfigError;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Resolved platform paths for LogTail configuration.
#[derive(Debug, Clone)]
pub struct PlatformPaths {
    /// Configuration directory (e.g. ~/.config/logtail/ or %APPDATA%\LogTail\)
    pub config_dir: PathBuf,
}

impl PlatformPaths {
    /// Resolve platform-appropriate paths.
    ///
    /// Falls back to current directory if platform dirs cannot be determined.
    pub fn resolve() -> Self {
        if let Some(proj_dirs) = ProjectDirs::from("", "", constants::APP_ID) {
            let config_dir = proj_dirs.config_dir().to_path_buf();
            tracing::debug!(config = %config_dir.display(), "Platform paths resolved");
            Self { config_dir }
        } else {
            tracing::warn!("Could not determine platform directories, using current directory");
            Self {
                config_dir: PathBuf::from("."),
            }
        }
    }

    /// Default location of config.toml.
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(constants::CONFIG_FILE_NAME)
    }
}

// =============================================================================
// config.toml loading and validation
// =============================================================================

/// Raw deserialisable shape of config.toml.
///
/// Unknown keys are silently ignored for forward compatibility -- a newer
/// config file can be used with an older binary without crashing.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// `[engine]` section.
    pub engine: EngineSection,
    /// `[tail]` section.
    pub tail: TailSection,
    /// `[logging]` section.
    pub logging: LoggingSection,
}

/// `[engine]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct EngineSection {
    /// Directory the served log files live in.
    pub base_dir: Option<String>,
    /// Maximum files tracked at once.
    pub max_watchers: Option<usize>,
    /// Worker threads executing reads.
    pub worker_threads: Option<usize>,
    /// Bytes per backward read step.
    pub block_size_bytes: Option<usize>,
    /// Read timeout in ms (0 = none).
    pub read_timeout_ms: Option<u64>,
    /// "reject" or "lru".
    pub capacity_policy: Option<String>,
}

/// `[tail]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct TailSection {
    /// Largest line count a request may ask for.
    pub max_tail_lines: Option<usize>,
    /// Line count used when a request omits it.
    pub default_num_entries: Option<usize>,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub level: Option<String>,
    /// Log file path (empty = stderr only).
    pub file: Option<String>,
}

/// Validated application configuration derived from `config.toml`.
///
/// All values are validated against named constants at load time.
/// Invalid values produce actionable warnings and fall back to defaults.
#[derive(Debug, Clone)]
pub struct AppConfig {
    // -- Engine --
    pub base_dir: PathBuf,
    pub max_watchers: usize,
    pub worker_threads: usize,
    pub block_size: usize,
    /// 0 disables the timeout.
    pub read_timeout_ms: u64,
    pub capacity_policy: CapacityPolicy,

    // -- Tail --
    pub max_tail_lines: usize,
    pub default_num_entries: usize,

    // -- Logging --
    /// Logging level string (for init before tracing is available).
    pub log_level: Option<String>,
    /// Log file path.
    pub log_file: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from(constants::DEFAULT_BASE_DIR),
            max_watchers: constants::DEFAULT_MAX_WATCHERS,
            worker_threads: constants::DEFAULT_WORKER_THREADS,
            block_size: constants::DEFAULT_BLOCK_SIZE,
            read_timeout_ms: constants::DEFAULT_READ_TIMEOUT_MS,
            capacity_policy: CapacityPolicy::Reject,
            max_tail_lines: constants::DEFAULT_MAX_TAIL_LINES,
            default_num_entries: constants::DEFAULT_NUM_ENTRIES,
            log_level: None,
            log_file: None,
        }
    }
}

impl AppConfig {
    /// Engine settings derived from this configuration.
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            registry: RegistryConfig {
                base_dir: self.base_dir.clone(),
                max_watchers: self.max_watchers,
                worker_threads: self.worker_threads,
                block_size: self.block_size,
                read_timeout: (self.read_timeout_ms > 0)
                    .then(|| Duration::from_millis(self.read_timeout_ms)),
                capacity_policy: self.capacity_policy,
            },
            limits: RequestLimits {
                default_num_entries: self.default_num_entries,
                max_tail_lines: self.max_tail_lines,
            },
        }
    }
}

/// Load and validate the config file at `config_path`.
///
/// Returns `AppConfig` with validated values and a list of non-fatal warnings.
/// A missing file yields defaults with no warnings (first run). An unreadable
/// or unparseable file is an error: the caller decides whether that is fatal
/// (explicit `--config`) or a warning (platform default location).
pub fn load_config(config_path: &Path) -> Result<(AppConfig, Vec<String>), ConfigError> {
    if !config_path.exists() {
        tracing::debug!(path = %config_path.display(), "No config.toml found; using defaults");
        return Ok((AppConfig::default(), Vec::new()));
    }

    let content = std::fs::read_to_string(config_path).map_err(|e| ConfigError::Io {
        path: config_path.to_path_buf(),
        source: e,
    })?;

    let raw: RawConfig = toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
        path: config_path.to_path_buf(),
        source: e,
    })?;

    tracing::info!(path = %config_path.display(), "Loaded config.toml");
    Ok(validate(raw))
}

/// Like `load_config`, but any load error becomes a warning and defaults are
/// used. For the platform default location, where a broken file should not
/// stop the tool from starting.
pub fn load_config_or_default(config_path: &Path) -> (AppConfig, Vec<String>) {
    match load_config(config_path) {
        Ok(loaded) => loaded,
        Err(e) => {
            let msg = format!("{e}. Using defaults.");
            tracing::warn!("{}", msg);
            (AppConfig::default(), vec![msg])
        }
    }
}

/// Command-line values that take precedence over config.toml.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub base_dir: Option<PathBuf>,
    pub max_watchers: Option<usize>,
    pub worker_threads: Option<usize>,
    pub capacity_policy: Option<String>,
}

impl AppConfig {
    /// Apply command-line overrides under the same bounds as config.toml.
    ///
    /// An invalid override is ignored (the configured value stays) and
    /// reported in the returned warnings.
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) -> Vec<String> {
        let mut warnings = Vec::new();

        if let Some(ref dir) = overrides.base_dir {
            self.base_dir = dir.clone();
        }

        if let Some(max) = overrides.max_watchers {
            match check_range(
                "--max-watchers",
                max,
                constants::MIN_MAX_WATCHERS,
                constants::ABSOLUTE_MAX_WATCHERS,
                constants::DEFAULT_MAX_WATCHERS,
            ) {
                Ok(v) => self.max_watchers = v,
                Err(w) => warnings.push(w),
            }
        }

        if let Some(threads) = overrides.worker_threads {
            match check_range(
                "--workers",
                threads,
                constants::MIN_WORKER_THREADS,
                constants::MAX_WORKER_THREADS,
                constants::DEFAULT_WORKER_THREADS,
            ) {
                Ok(v) => self.worker_threads = v,
                Err(w) => warnings.push(w),
            }
        }

        if let Some(ref name) = overrides.capacity_policy {
            match CapacityPolicy::parse(name) {
                Some(policy) => self.capacity_policy = policy,
                None => warnings.push(format!(
                    "--policy \"{name}\" is not recognised. Expected \"reject\" or \"lru\". \
                     Keeping {}.",
                    self.capacity_policy
                )),
            }
        }

        warnings
    }
}

/// `Ok(value)` if it lies in `min..=max`, otherwise the out-of-range warning.
fn check_range<T>(field: &str, value: T, min: T, max: T, default: T) -> Result<T, String>
where
    T: PartialOrd + Copy + std::fmt::Display,
{
    if value >= min && value <= max {
        Ok(value)
    } else {
        Err(out_of_range(
            field,
            value,
            format!("{min}-{max} (default {default})"),
        ))
    }
}

fn out_of_range(field: &str, value: impl ToString, expected: String) -> String {
    ConfigError::ValueOutOfRange {
        field: field.to_string(),
        value: value.to_string(),
        expected,
    }
    .to_string()
}

/// Validate each field against named constants, accumulating all warnings.
pub fn validate(raw: RawConfig) -> (AppConfig, Vec<String>) {
    let mut config = AppConfig::default();
    let mut warnings: Vec<String> = Vec::new();

    // -- Engine: base_dir --
    if let Some(ref dir) = raw.engine.base_dir {
        if dir.is_empty() {
            warnings.push(format!(
                "[engine] base_dir is empty. Using default ({}).",
                constants::DEFAULT_BASE_DIR
            ));
        } else {
            config.base_dir = PathBuf::from(dir);
        }
    }

    // -- Engine: max_watchers --
    if let Some(max) = raw.engine.max_watchers {
        match check_range(
            "[engine] max_watchers",
            max,
            constants::MIN_MAX_WATCHERS,
            constants::ABSOLUTE_MAX_WATCHERS,
            constants::DEFAULT_MAX_WATCHERS,
        ) {
            Ok(v) => config.max_watchers = v,
            Err(w) => warnings.push(w),
        }
    }

    // -- Engine: worker_threads --
    if let Some(threads) = raw.engine.worker_threads {
        match check_range(
            "[engine] worker_threads",
            threads,
            constants::MIN_WORKER_THREADS,
            constants::MAX_WORKER_THREADS,
            constants::DEFAULT_WORKER_THREADS,
        ) {
            Ok(v) => config.worker_threads = v,
            Err(w) => warnings.push(w),
        }
    }

    // -- Engine: block_size_bytes --
    if let Some(block) = raw.engine.block_size_bytes {
        match check_range(
            "[engine] block_size_bytes",
            block,
            constants::MIN_BLOCK_SIZE,
            constants::MAX_BLOCK_SIZE,
            constants::DEFAULT_BLOCK_SIZE,
        ) {
            Ok(v) => config.block_size = v,
            Err(w) => warnings.push(w),
        }
    }

    // -- Engine: read_timeout_ms --
    if let Some(timeout) = raw.engine.read_timeout_ms {
        if timeout <= constants::MAX_READ_TIMEOUT_MS {
            config.read_timeout_ms = timeout;
        } else {
            warnings.push(out_of_range(
                "[engine] read_timeout_ms",
                timeout,
                format!(
                    "0-{} (default {})",
                    constants::MAX_READ_TIMEOUT_MS,
                    constants::DEFAULT_READ_TIMEOUT_MS
                ),
            ));
        }
    }

    // -- Engine: capacity_policy --
    if let Some(ref policy) = raw.engine.capacity_policy {
        match CapacityPolicy::parse(policy) {
            Some(p) => config.capacity_policy = p,
            None => warnings.push(format!(
                "[engine] capacity_policy = \"{policy}\" is not recognised. \
                 Expected \"reject\" or \"lru\". Using default (reject).",
            )),
        }
    }

    // -- Tail: max_tail_lines --
    if let Some(max) = raw.tail.max_tail_lines {
        if (1..=constants::ABSOLUTE_MAX_TAIL_LINES).contains(&max) {
            config.max_tail_lines = max;
        } else {
            warnings.push(out_of_range(
                "[tail] max_tail_lines",
                max,
                format!(
                    "1-{} (default {})",
                    constants::ABSOLUTE_MAX_TAIL_LINES,
                    constants::DEFAULT_MAX_TAIL_LINES
                ),
            ));
        }
    }

    // -- Tail: default_num_entries (validated after max_tail_lines) --
    if let Some(n) = raw.tail.default_num_entries {
        if (1..=config.max_tail_lines).contains(&n) {
            config.default_num_entries = n;
        } else {
            warnings.push(out_of_range(
                "[tail] default_num_entries",
                n,
                format!("1-{}", config.max_tail_lines),
            ));
        }
    }
    config.default_num_entries = config.default_num_entries.min(config.max_tail_lines);

    // -- Logging: level --
    if let Some(ref level) = raw.logging.level {
        let valid = ["error", "warn", "info", "debug", "trace"];
        if valid.contains(&level.to_lowercase().as_str()) {
            config.log_level = Some(level.clone());
        } else {
            warnings.push(format!(
                "[logging] level = \"{level}\" is not recognised. \
                 Valid values: error, warn, info, debug, trace. Using default (info).",
            ));
        }
    }

    // -- Logging: file --
    if let Some(ref file) = raw.logging.file {
        if !file.is_empty() {
            config.log_file = Some(file.clone());
        }
    }

    if !warnings.is_empty() {
        tracing::warn!(
            count = warnings.len(),
            "Config validation produced warnings"
        );
    }

    (config, warnings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().expect("tmpdir");
        let (config, warnings) = load_config(&dir.path().join("config.toml")).unwrap();
        assert!(warnings.is_empty());
        assert_eq!(config.max_watchers, constants::DEFAULT_MAX_WATCHERS);
        assert_eq!(config.capacity_policy, CapacityPolicy::Reject);
    }

    #[test]
    fn test_valid_values_are_applied() {
        let dir = TempDir::new().expect("tmpdir");
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[engine]
base_dir = "/var/log/app"
max_watchers = 25
worker_threads = 4
block_size_bytes = 8192
read_timeout_ms = 0
capacity_policy = "lru"

[tail]
max_tail_lines = 500
default_num_entries = 20

[logging]
level = "debug"
"#,
        )
        .unwrap();

        let (config, warnings) = load_config(&path).unwrap();
        assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");
        assert_eq!(config.base_dir, PathBuf::from("/var/log/app"));
        assert_eq!(config.max_watchers, 25);
        assert_eq!(config.capacity_policy, CapacityPolicy::Lru);
        assert_eq!(config.log_level.as_deref(), Some("debug"));

        let engine = config.engine_config();
        assert_eq!(engine.registry.read_timeout, None);
        assert_eq!(engine.registry.block_size, 8192);
        assert_eq!(engine.limits.max_tail_lines, 500);
        assert_eq!(engine.limits.default_num_entries, 20);
    }

    #[test]
    fn test_out_of_range_values_warn_and_fall_back() {
        let raw: RawConfig = toml::from_str(
            r#"
[engine]
max_watchers = 0
worker_threads = 100000
capacity_policy = "lfu"

[tail]
default_num_entries = 1000
"#,
        )
        .unwrap();

        let (config, warnings) = validate(raw);
        assert_eq!(warnings.len(), 4, "warnings: {warnings:?}");
        assert_eq!(config.max_watchers, constants::DEFAULT_MAX_WATCHERS);
        assert_eq!(config.worker_threads, constants::DEFAULT_WORKER_THREADS);
        assert_eq!(config.capacity_policy, CapacityPolicy::Reject);
        assert_eq!(config.default_num_entries, constants::DEFAULT_NUM_ENTRIES);
    }

    #[test]
    fn test_cli_overrides_use_config_bounds() {
        let mut config = AppConfig::default();
        let warnings = config.apply_overrides(&ConfigOverrides {
            base_dir: Some(PathBuf::from("/srv/logs")),
            max_watchers: Some(0),
            worker_threads: Some(100_000),
            capacity_policy: Some("lfu".to_string()),
        });

        assert_eq!(warnings.len(), 3, "warnings: {warnings:?}");
        assert_eq!(config.base_dir, PathBuf::from("/srv/logs"));
        assert_eq!(config.max_watchers, constants::DEFAULT_MAX_WATCHERS);
        assert_eq!(config.worker_threads, constants::DEFAULT_WORKER_THREADS);
        assert_eq!(config.capacity_policy, CapacityPolicy::Reject);

        let warnings = config.apply_overrides(&ConfigOverrides {
            max_watchers: Some(constants::ABSOLUTE_MAX_WATCHERS),
            worker_threads: Some(constants::MAX_WORKER_THREADS),
            capacity_policy: Some("LRU".to_string()),
            ..Default::default()
        });
        assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");
        assert_eq!(config.max_watchers, constants::ABSOLUTE_MAX_WATCHERS);
        assert_eq!(config.worker_threads, constants::MAX_WORKER_THREADS);
        assert_eq!(config.capacity_policy, CapacityPolicy::Lru);
    }

    #[test]
    fn test_unparseable_file_is_error_or_warning() {
        let dir = TempDir::new().expect("tmpdir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[engine\nmax_watchers = ").unwrap();

        assert!(matches!(
            load_config(&path),
            Err(ConfigError::TomlParse { .. })
        ));
        let (config, warnings) = load_config_or_default(&path);
        assert_eq!(warnings.len(), 1);
        assert_eq!(config.max_watchers, constants::DEFAULT_MAX_WATCHERS);
    }
}
