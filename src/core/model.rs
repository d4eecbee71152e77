// LogTail - core/model.rs
//
// Core data model types. Pure data definitions with no I/O.
// These types are the shared vocabulary across all layers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

// =============================================================================
// Tail result
// =============================================================================

/// Lines read from the end of a file, newest first, together with the depth
/// (line count) the read was issued with.
///
/// `lines.len() < depth` means the file held fewer non-empty lines than were
/// asked for, so the result is still complete for any request up to `depth`.
#[derive(Debug, Clone)]
pub struct TailResult {
    /// Newest line first; never contains empty lines.
    pub lines: Arc<Vec<String>>,
    /// `max_lines` of the read that produced `lines`.
    pub depth: usize,
}

impl TailResult {
    pub fn new(lines: Vec<String>, depth: usize) -> Self {
        Self {
            lines: Arc::new(lines),
            depth,
        }
    }

    /// True if this result can answer a request for `requested` lines without
    /// reading the file again.
    pub fn covers(&self, requested: usize) -> bool {
        requested <= self.depth
    }

    /// The first `count` lines (newest first).
    pub fn truncated(&self, count: usize) -> Vec<String> {
        self.lines.iter().take(count).cloned().collect()
    }
}

// =============================================================================
// Capacity policy
// =============================================================================

/// What the registry does when a new file is requested while it is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CapacityPolicy {
    /// Refuse the new file with `CapacityExceeded`.
    #[default]
    Reject,
    /// Drop the least recently accessed idle watcher to make room.
    Lru,
}

impl CapacityPolicy {
    /// Parse a policy name as written in config.toml or on the CLI.
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "reject" => Some(Self::Reject),
            "lru" => Some(Self::Lru),
            _ => None,
        }
    }
}

impl fmt::Display for CapacityPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reject => write!(f, "reject"),
            Self::Lru => write!(f, "lru"),
        }
    }
}

// =============================================================================
// Registry statistics
// =============================================================================

/// Point-in-time counters for the watcher registry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryStats {
    /// Files currently tracked.
    pub watchers: usize,
    /// Reads dispatched to the worker pool (successful or not).
    pub reads: u64,
    /// Requests answered from a cached result.
    pub cache_hits: u64,
    /// Watchers dropped to make room under the LRU policy.
    pub evictions: u64,
    /// New files refused because the registry was full.
    pub rejections: u64,
}
