// LogTail - app/engine.rs
//
// Process-wide tail engine: owns the watcher registry and its worker pool and
// is passed by reference to every request handler. Constructed explicitly from
// configuration; `shutdown` stops admission and drains in-flight reads.

use crate::app::registry::{RegistryConfig, WatcherRegistry};
use crate::core::filter;
use crate::core::model::RegistryStats;
use crate::gateway::request::{RequestLimits, TailRequest};
use crate::gateway::response::TailResponse;
use crate::util::constants::SHUTDOWN_DRAIN_TIMEOUT_MS;
use crate::util::error::{LogTailError, TailError};
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Everything needed to build an `Engine`.
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    pub registry: RegistryConfig,
    pub limits: RequestLimits,
}

/// Cached, concurrent tail engine.
pub struct Engine {
    registry: WatcherRegistry,
    limits: RequestLimits,
    shutting_down: AtomicBool,
}

impl Engine {
    /// Build the engine. Fails if the base directory does not exist or the
    /// worker pool cannot be started.
    pub fn new(config: EngineConfig) -> Result<Self, LogTailError> {
        let base_dir = &config.registry.base_dir;
        if !base_dir.is_dir() {
            return Err(LogTailError::Io {
                path: base_dir.clone(),
                operation: "open base directory",
                source: io::Error::new(io::ErrorKind::NotFound, "not a directory"),
            });
        }

        let registry = WatcherRegistry::new(config.registry)?;
        Ok(Self {
            registry,
            limits: config.limits,
            shutting_down: AtomicBool::new(false),
        })
    }

    /// Last `num_entries` lines of `file_name`, newest first, restricted to
    /// lines containing `filter` (case-insensitive).
    ///
    /// The filter runs after truncation, so fewer than `num_entries` lines may
    /// come back even when the file holds more matches further up.
    pub fn tail(
        &self,
        file_name: &str,
        num_entries: usize,
        filter: Option<&str>,
    ) -> Result<Vec<String>, LogTailError> {
        if self.shutting_down.load(Ordering::SeqCst) {
            return Err(TailError::ShuttingDown.into());
        }

        let result = self.registry.get_entries(file_name, num_entries)?;
        let window = result.truncated(num_entries);
        Ok(filter::apply(&window, filter))
    }

    /// Validate `request` and answer it.
    pub fn handle(&self, request: &TailRequest) -> Result<TailResponse, LogTailError> {
        let validated = request.validate(&self.limits)?;
        let log_entries = self.tail(
            &validated.file_name,
            validated.num_entries,
            validated.filter.as_deref(),
        )?;

        Ok(TailResponse {
            log_entries,
            filter_used: validated.filter,
        })
    }

    pub fn limits(&self) -> &RequestLimits {
        &self.limits
    }

    pub fn registry(&self) -> &WatcherRegistry {
        &self.registry
    }

    pub fn stats(&self) -> RegistryStats {
        self.registry.stats()
    }

    /// Refuse new requests and wait for in-flight reads to finish.
    /// Safe to call more than once.
    pub fn shutdown(&self) {
        if self.shutting_down.swap(true, Ordering::SeqCst) {
            return;
        }

        let remaining = self
            .registry
            .drain(Duration::from_millis(SHUTDOWN_DRAIN_TIMEOUT_MS));
        if remaining > 0 {
            tracing::warn!(remaining, "Shutdown drain timed out with reads in flight");
        }

        let stats = self.registry.stats();
        tracing::info!(
            watchers = stats.watchers,
            reads = stats.reads,
            cache_hits = stats.cache_hits,
            "Engine shut down"
        );
    }
}
