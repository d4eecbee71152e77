// LogTail - app/watcher.rs
//
// Per-file watcher: wraps the reverse line reader with modification-time
// bookkeeping so the registry can tell whether a cached tail is still valid.
//
// Architecture:
//   - `Watcher` owns `(path, last_known_modified, max_lines)` and is only ever
//     mutated by the registry while it holds the per-file lock.
//   - Reads run on the worker pool. `prepare_read` hands the pool an owned
//     `ReadRequest`; the pool returns a `ReadOutcome`; `apply` records the
//     outcome. The pool never touches watcher state.
//   - `read` chains the three steps on the calling thread.

use crate::core::reader;
use crate::platform::fs;
use crate::util::error::TailError;
use chrono::{DateTime, Utc};
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Instant, SystemTime};

/// Tracks one log file and the modification time seen by its last read.
#[derive(Debug)]
pub struct Watcher {
    /// Registry key (file name as requested).
    file_name: String,
    /// Full path: base directory joined with `file_name`.
    path: PathBuf,
    /// Modification time observed right after the last successful read.
    /// `None` until the first successful read.
    last_known_modified: Option<SystemTime>,
    /// Number of lines the next read will collect.
    max_lines: usize,
    /// Bytes per backward step of the reader.
    block_size: usize,
}

/// Owned description of one tail read, safe to send to a worker thread.
#[derive(Debug, Clone)]
pub struct ReadRequest {
    pub file_name: String,
    pub path: PathBuf,
    pub max_lines: usize,
    pub block_size: usize,
}

/// Result of a completed `ReadRequest`.
#[derive(Debug)]
pub struct ReadOutcome {
    /// Lines read, newest first.
    pub lines: Vec<String>,
    /// `max_lines` the read was issued with.
    pub depth: usize,
    /// Modification time sampled immediately after the read finished.
    pub modified: Option<SystemTime>,
}

impl Watcher {
    /// Create a watcher for `path`.
    ///
    /// Fails with `TailError::NotFound` if the file does not exist. No read is
    /// performed here.
    pub fn new(
        file_name: &str,
        path: PathBuf,
        max_lines: usize,
        block_size: usize,
    ) -> Result<Self, TailError> {
        if !path.is_file() {
            return Err(TailError::NotFound {
                file: file_name.to_string(),
                path,
            });
        }

        tracing::debug!(file = %path.display(), max_lines, "Started new watcher");

        Ok(Self {
            file_name: file_name.to_string(),
            path,
            last_known_modified: None,
            max_lines,
            block_size,
        })
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn max_lines(&self) -> usize {
        self.max_lines
    }

    /// Update the depth of future reads without reading.
    pub fn set_max_lines(&mut self, max_lines: usize) {
        self.max_lines = max_lines;
    }

    /// True if the file may differ from what the last successful read saw.
    ///
    /// Always true before the first successful read. A file whose mtime can no
    /// longer be read also counts as changed, so the next read surfaces the
    /// underlying I/O error instead of serving a stale cache.
    pub fn has_changed(&self) -> bool {
        let Some(known) = self.last_known_modified else {
            return true;
        };
        match fs::modified_time(&self.path) {
            Ok(current) => current != known,
            Err(e) => {
                tracing::debug!(
                    file = %self.path.display(),
                    error = %e,
                    "Cannot stat watched file; treating as changed"
                );
                true
            }
        }
    }

    /// Snapshot the parameters of a read for execution on another thread.
    pub fn prepare_read(&self) -> ReadRequest {
        ReadRequest {
            file_name: self.file_name.clone(),
            path: self.path.clone(),
            max_lines: self.max_lines,
            block_size: self.block_size,
        }
    }

    /// Record a completed read. Only the modification time is kept here; the
    /// lines belong to the caller.
    pub fn apply(&mut self, outcome: &ReadOutcome) {
        self.last_known_modified = outcome.modified;
        if let Some(t) = outcome.modified {
            tracing::trace!(
                file = %self.path.display(),
                modified = %DateTime::<Utc>::from(t),
                "Watcher modification time recorded"
            );
        }
    }

    /// Read up to `max_lines` lines now, on the calling thread.
    ///
    /// Always performs I/O. On failure the recorded modification time is left
    /// untouched.
    pub fn read(&mut self, max_lines: usize) -> Result<ReadOutcome, TailError> {
        self.set_max_lines(max_lines);
        let outcome = self.prepare_read().run().map_err(|source| TailError::Io {
            file: self.file_name.clone(),
            source,
        })?;
        self.apply(&outcome);
        Ok(outcome)
    }
}

impl ReadRequest {
    /// Perform the read. Runs on a worker thread.
    pub fn run(&self) -> io::Result<ReadOutcome> {
        let timer = Instant::now();

        let lines = reader::read_tail_with_block_size(&self.path, self.max_lines, self.block_size)?;
        // Sampled after the read so a write racing with it is caught by the
        // next `has_changed`.
        let modified = fs::modified_time(&self.path).ok();

        tracing::debug!(
            file = %self.path.display(),
            lines = lines.len(),
            max_lines = self.max_lines,
            elapsed_ms = timer.elapsed().as_millis() as u64,
            "Read file tail"
        );

        Ok(ReadOutcome {
            lines,
            depth: self.max_lines,
            modified,
        })
    }
}
