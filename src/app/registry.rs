// LogTail - app/registry.rs
//
// Watcher registry: a bounded map from file name to (Watcher, cached tail)
// that decides between serving the cache and re-reading the file.
//
// Architecture:
//   - The map lock is held only to look up, insert, or evict an entry; the
//     existence check for a new file runs outside it. Each entry has its own
//     mutex, held for the whole reuse-or-recompute decision including the
//     read. Concurrent requests for one file therefore collapse into a single
//     read: the second caller wakes up to a fresh cache.
//   - Reads of distinct files run in parallel on the worker pool; the caller
//     blocks until its own read finishes (or the read timeout expires).
//   - A read that times out keeps running. Its handle is parked in the entry
//     and the next request for that file waits on it instead of queueing a
//     second read, so one stalled file holds at most one worker.
//   - Watcher state is updated by the caller after the pool returns, never by
//     the worker.
//
// Decision per request:
//   1. Unknown file: refuse if full (or evict under the LRU policy), create
//      the watcher (NotFound if the file is missing), read, cache, return.
//   2. Known file: settle any parked read first. Then re-read if the file
//      changed or the cached result was read at a smaller depth than
//      requested; otherwise serve the cache.

use crate::app::pool::{PendingJob, PoolError, WorkerPool};
use crate::app::watcher::{ReadOutcome, ReadRequest, Watcher};
use crate::core::model::{CapacityPolicy, RegistryStats, TailResult};
use crate::util::constants;
use crate::util::error::TailError;
use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Settings for a `WatcherRegistry`.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Directory every requested file name is resolved against.
    pub base_dir: PathBuf,
    /// Maximum number of files tracked at once.
    pub max_watchers: usize,
    /// Worker threads executing reads.
    pub worker_threads: usize,
    /// Bytes per backward step of the reader.
    pub block_size: usize,
    /// Upper bound on how long a caller waits for its read. `None` = no limit.
    pub read_timeout: Option<Duration>,
    /// Behaviour when a new file arrives at capacity.
    pub capacity_policy: CapacityPolicy,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from(constants::DEFAULT_BASE_DIR),
            max_watchers: constants::DEFAULT_MAX_WATCHERS,
            worker_threads: constants::DEFAULT_WORKER_THREADS,
            block_size: constants::DEFAULT_BLOCK_SIZE,
            read_timeout: Some(Duration::from_millis(constants::DEFAULT_READ_TIMEOUT_MS)),
            capacity_policy: CapacityPolicy::Reject,
        }
    }
}

type PendingRead = PendingJob<io::Result<ReadOutcome>>;

/// One tracked file.
#[derive(Debug)]
struct RegistryEntry {
    watcher: Watcher,
    /// Last successful read. `None` until one succeeds.
    result: Option<TailResult>,
    /// Read that outlived its caller's timeout and is still on the pool.
    pending: Option<PendingRead>,
    /// Used to pick an eviction victim under the LRU policy.
    last_access: Instant,
}

type EntryHandle = Arc<Mutex<RegistryEntry>>;

/// Bounded, thread-safe registry of per-file watchers and their cached tails.
pub struct WatcherRegistry {
    config: RegistryConfig,
    entries: Mutex<HashMap<String, EntryHandle>>,
    pool: WorkerPool,
    reads: AtomicU64,
    cache_hits: AtomicU64,
    evictions: AtomicU64,
    rejections: AtomicU64,
}

/// Lock a mutex, recovering the data if a previous holder panicked. Entries
/// are only written after a read has fully completed, so the data is
/// consistent even then.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

impl WatcherRegistry {
    /// Build a registry and its worker pool.
    pub fn new(config: RegistryConfig) -> Result<Self, TailError> {
        let pool = WorkerPool::new(config.worker_threads).map_err(|e| TailError::WorkerPool {
            reason: e.to_string(),
        })?;

        tracing::info!(
            base_dir = %config.base_dir.display(),
            max_watchers = config.max_watchers,
            workers = pool.threads(),
            policy = %config.capacity_policy,
            "Watcher registry ready"
        );

        Ok(Self {
            config,
            entries: Mutex::new(HashMap::new()),
            pool,
            reads: AtomicU64::new(0),
            cache_hits: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
            rejections: AtomicU64::new(0),
        })
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Return up to `requested` trailing lines of `file_name`, newest first,
    /// from cache when still valid.
    ///
    /// The returned result may hold more than `requested` lines when an
    /// earlier, deeper read is reused; callers truncate.
    pub fn get_entries(&self, file_name: &str, requested: usize) -> Result<TailResult, TailError> {
        loop {
            let handle = self.entry_for(file_name, requested)?;
            let mut entry = lock(&handle);
            // Under LRU the entry may have been evicted between lookup and
            // lock; serving it would race a fresh entry for the same file.
            if !self.is_current(file_name, &handle) {
                tracing::debug!(file = file_name, "Entry evicted before use, retrying lookup");
                continue;
            }
            return self.serve(file_name, requested, &mut entry);
        }
    }

    /// Whether the watcher for `file_name` would re-read on the next request.
    /// `None` if the file is not tracked.
    pub fn has_changed(&self, file_name: &str) -> Option<bool> {
        let handle = lock(&self.entries).get(file_name).cloned()?;
        let entry = lock(&handle);
        Some(entry.result.is_none() || entry.watcher.has_changed())
    }

    /// True if `file_name` currently has a watcher.
    pub fn contains(&self, file_name: &str) -> bool {
        lock(&self.entries).contains_key(file_name)
    }

    /// Number of tracked files.
    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of the registry counters.
    pub fn stats(&self) -> RegistryStats {
        RegistryStats {
            watchers: self.len(),
            reads: self.reads.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            rejections: self.rejections.load(Ordering::Relaxed),
        }
    }

    /// Wait for in-flight reads to finish. Returns how many were still running
    /// when `limit` expired.
    pub fn drain(&self, limit: Duration) -> usize {
        self.pool.drain(limit)
    }

    /// Reuse-or-recompute for one locked entry.
    fn serve(
        &self,
        file_name: &str,
        requested: usize,
        entry: &mut RegistryEntry,
    ) -> Result<TailResult, TailError> {
        entry.last_access = Instant::now();

        if let Some(pending) = entry.pending.take() {
            tracing::debug!(file = file_name, "Waiting on read left by a timed-out request");
            match pending.wait(self.config.read_timeout) {
                Ok(Ok(outcome)) => {
                    Self::store(entry, outcome);
                }
                Ok(Err(e)) => {
                    tracing::warn!(file = file_name, error = %e, "Earlier tail read failed");
                }
                Err(PoolError::Timeout) => {
                    entry.pending = Some(pending);
                    return Err(self.timed_out(file_name));
                }
                Err(PoolError::Disconnected) => {}
            }
        }

        if let Some(cached) = &entry.result {
            if cached.covers(requested) && !entry.watcher.has_changed() {
                self.cache_hits.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(file = file_name, requested, "Cache hit, returning stored lines");
                return Ok(cached.clone());
            }
        }

        entry.watcher.set_max_lines(requested);
        let pending = self.dispatch(entry.watcher.prepare_read());
        match pending.wait(self.config.read_timeout) {
            Ok(Ok(outcome)) => Ok(Self::store(entry, outcome)),
            Ok(Err(source)) => {
                tracing::warn!(file = file_name, error = %source, "Tail read failed");
                Err(TailError::Io {
                    file: file_name.to_string(),
                    source,
                })
            }
            Err(PoolError::Timeout) => {
                entry.pending = Some(pending);
                Err(self.timed_out(file_name))
            }
            Err(PoolError::Disconnected) => Err(TailError::WorkerPool {
                reason: format!("worker stopped before finishing read of '{file_name}'"),
            }),
        }
    }

    /// Record a completed read on the entry and return the new cached result.
    fn store(entry: &mut RegistryEntry, outcome: ReadOutcome) -> TailResult {
        entry.watcher.apply(&outcome);
        let result = TailResult::new(outcome.lines, outcome.depth);
        entry.result = Some(result.clone());
        result
    }

    /// Find the entry for `file_name`, registering a new watcher if needed.
    fn entry_for(&self, file_name: &str, requested: usize) -> Result<EntryHandle, TailError> {
        {
            let entries = lock(&self.entries);
            if let Some(handle) = entries.get(file_name) {
                return Ok(Arc::clone(handle));
            }
            if entries.len() >= self.config.max_watchers
                && self.config.capacity_policy == CapacityPolicy::Reject
            {
                return Err(self.reject(file_name));
            }
        }

        // The existence check stats the file, so it runs without the map lock.
        // Checked before evicting so a bad name never costs a live watcher.
        let path = self.config.base_dir.join(file_name);
        let watcher = Watcher::new(file_name, path, requested, self.config.block_size)?;

        let mut entries = lock(&self.entries);
        if let Some(handle) = entries.get(file_name) {
            // Registered by a concurrent request while we were checking.
            return Ok(Arc::clone(handle));
        }
        if entries.len() >= self.config.max_watchers {
            let evicted = self.config.capacity_policy == CapacityPolicy::Lru
                && self.evict_least_recent(&mut entries);
            if !evicted {
                return Err(self.reject(file_name));
            }
        }

        let handle = Arc::new(Mutex::new(RegistryEntry {
            watcher,
            result: None,
            pending: None,
            last_access: Instant::now(),
        }));
        entries.insert(file_name.to_string(), Arc::clone(&handle));

        tracing::info!(
            file = file_name,
            watchers = entries.len(),
            max = self.config.max_watchers,
            "Registered new watcher"
        );
        Ok(handle)
    }

    /// True if `handle` is still the registered entry for `file_name`.
    fn is_current(&self, file_name: &str, handle: &EntryHandle) -> bool {
        lock(&self.entries)
            .get(file_name)
            .is_some_and(|registered| Arc::ptr_eq(registered, handle))
    }

    fn reject(&self, file_name: &str) -> TailError {
        self.rejections.fetch_add(1, Ordering::Relaxed);
        tracing::warn!(
            file = file_name,
            max = self.config.max_watchers,
            "Reached maximum number of file watchers"
        );
        TailError::CapacityExceeded {
            file: file_name.to_string(),
            max: self.config.max_watchers,
        }
    }

    fn timed_out(&self, file_name: &str) -> TailError {
        let timeout = self.config.read_timeout.unwrap_or_default();
        tracing::warn!(
            file = file_name,
            timeout_ms = timeout.as_millis() as u64,
            "Tail read timed out"
        );
        TailError::Timeout {
            file: file_name.to_string(),
            timeout,
        }
    }

    /// Drop the least recently accessed entry that no request is using.
    /// Returns false if every entry is busy.
    fn evict_least_recent(&self, entries: &mut HashMap<String, EntryHandle>) -> bool {
        let victim = entries
            .iter()
            .filter_map(|(name, handle)| {
                // A locked entry has a request in progress; one with a parked
                // read still owns a worker.
                let entry = handle.try_lock().ok()?;
                if entry.pending.is_some() {
                    return None;
                }
                Some((name.clone(), entry.last_access))
            })
            .min_by_key(|(_, last_access)| *last_access)
            .map(|(name, _)| name);

        match victim {
            Some(name) => {
                entries.remove(&name);
                self.evictions.fetch_add(1, Ordering::Relaxed);
                tracing::info!(file = %name, "Evicted least recently used watcher");
                true
            }
            None => false,
        }
    }

    /// Queue a read on the worker pool.
    fn dispatch(&self, request: ReadRequest) -> PendingRead {
        self.reads.fetch_add(1, Ordering::Relaxed);
        self.pool.submit(move || request.run())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::path::Path;
    use tempfile::TempDir;

    fn registry(dir: &TempDir, max_watchers: usize, policy: CapacityPolicy) -> WatcherRegistry {
        WatcherRegistry::new(RegistryConfig {
            base_dir: dir.path().to_path_buf(),
            max_watchers,
            worker_threads: 4,
            capacity_policy: policy,
            ..Default::default()
        })
        .expect("registry")
    }

    fn write_lines(dir: &TempDir, name: &str, count: usize) {
        let content = (1..=count)
            .map(|i| format!("L{i}"))
            .collect::<Vec<_>>()
            .join("\n");
        std::fs::write(dir.path().join(name), content).expect("write");
    }

    fn bump_mtime(dir: &TempDir, name: &str) {
        let path = dir.path().join(name);
        let current = std::fs::metadata(&path).unwrap().modified().unwrap();
        File::options()
            .write(true)
            .open(&path)
            .unwrap()
            .set_modified(current + Duration::from_secs(60))
            .unwrap();
    }

    /// Push the file's mtime an hour into the past so a replacement file is
    /// guaranteed to look modified.
    fn age_mtime(dir: &TempDir, name: &str) {
        let path = dir.path().join(name);
        let current = std::fs::metadata(&path).unwrap().modified().unwrap();
        File::options()
            .write(true)
            .open(&path)
            .unwrap()
            .set_modified(current - Duration::from_secs(3600))
            .unwrap();
    }

    /// Replace `name` with a FIFO that has no writer: opening it for reading
    /// blocks, so any read of the file stalls until `release_stall`.
    #[cfg(unix)]
    fn stall_file(dir: &TempDir, name: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::remove_file(&path).expect("remove");
        let status = std::process::Command::new("mkfifo")
            .arg(&path)
            .status()
            .expect("run mkfifo");
        assert!(status.success(), "mkfifo failed");
        path
    }

    /// Open the write end so the stalled reader's `open` returns.
    #[cfg(unix)]
    fn release_stall(path: &Path) {
        let _writer = File::options().write(true).open(path).expect("open fifo");
    }

    fn stalling_registry(dir: &TempDir, workers: usize) -> WatcherRegistry {
        WatcherRegistry::new(RegistryConfig {
            base_dir: dir.path().to_path_buf(),
            max_watchers: 10,
            worker_threads: workers,
            read_timeout: Some(Duration::from_millis(200)),
            ..Default::default()
        })
        .expect("registry")
    }

    #[test]
    fn test_second_request_is_cache_hit() {
        let dir = TempDir::new().expect("tmpdir");
        write_lines(&dir, "app.log", 10);
        let reg = registry(&dir, 10, CapacityPolicy::Reject);

        let first = reg.get_entries("app.log", 3).unwrap();
        let second = reg.get_entries("app.log", 3).unwrap();

        assert_eq!(first.lines, second.lines);
        assert_eq!(*second.lines, vec!["L10", "L9", "L8"]);
        let stats = reg.stats();
        assert_eq!(stats.reads, 1);
        assert_eq!(stats.cache_hits, 1);
    }

    #[test]
    fn test_modified_file_is_reread() {
        let dir = TempDir::new().expect("tmpdir");
        write_lines(&dir, "app.log", 5);
        let reg = registry(&dir, 10, CapacityPolicy::Reject);
        reg.get_entries("app.log", 2).unwrap();

        write_lines(&dir, "app.log", 7);
        bump_mtime(&dir, "app.log");
        assert_eq!(reg.has_changed("app.log"), Some(true));

        let fresh = reg.get_entries("app.log", 2).unwrap();
        assert_eq!(*fresh.lines, vec!["L7", "L6"]);
        assert_eq!(reg.has_changed("app.log"), Some(false));
        assert_eq!(reg.stats().reads, 2);
    }

    #[test]
    fn test_deeper_request_forces_reread() {
        let dir = TempDir::new().expect("tmpdir");
        write_lines(&dir, "app.log", 10);
        let reg = registry(&dir, 10, CapacityPolicy::Reject);

        assert_eq!(reg.get_entries("app.log", 3).unwrap().lines.len(), 3);
        let deeper = reg.get_entries("app.log", 5).unwrap();
        assert_eq!(*deeper.lines, vec!["L10", "L9", "L8", "L7", "L6"]);
        assert_eq!(reg.stats().reads, 2);

        // A shallower request is served from the deeper cache.
        reg.get_entries("app.log", 2).unwrap();
        assert_eq!(reg.stats().reads, 2);
    }

    #[test]
    fn test_short_file_is_cached_at_requested_depth() {
        let dir = TempDir::new().expect("tmpdir");
        write_lines(&dir, "short.log", 2);
        let reg = registry(&dir, 10, CapacityPolicy::Reject);

        reg.get_entries("short.log", 50).unwrap();
        let again = reg.get_entries("short.log", 50).unwrap();
        assert_eq!(again.lines.len(), 2);
        assert_eq!(reg.stats().reads, 1);
    }

    #[test]
    fn test_capacity_rejects_new_files_but_serves_known_ones() {
        let dir = TempDir::new().expect("tmpdir");
        for i in 0..3 {
            write_lines(&dir, &format!("f{i}.log"), 3);
        }
        let reg = registry(&dir, 2, CapacityPolicy::Reject);

        reg.get_entries("f0.log", 1).unwrap();
        reg.get_entries("f1.log", 1).unwrap();
        let result = reg.get_entries("f2.log", 1);
        assert!(
            matches!(result, Err(TailError::CapacityExceeded { max: 2, .. })),
            "expected CapacityExceeded, got {result:?}"
        );
        assert!(reg.get_entries("f0.log", 1).is_ok());
        assert_eq!(reg.len(), 2);
        assert_eq!(reg.stats().rejections, 1);
    }

    #[test]
    fn test_lru_policy_evicts_least_recently_used() {
        let dir = TempDir::new().expect("tmpdir");
        for i in 0..3 {
            write_lines(&dir, &format!("f{i}.log"), 3);
        }
        let reg = registry(&dir, 2, CapacityPolicy::Lru);

        reg.get_entries("f0.log", 1).unwrap();
        reg.get_entries("f1.log", 1).unwrap();
        // Touch f0 so f1 becomes the oldest.
        reg.get_entries("f0.log", 1).unwrap();
        reg.get_entries("f2.log", 1).unwrap();

        assert!(reg.contains("f0.log"));
        assert!(!reg.contains("f1.log"));
        assert!(reg.contains("f2.log"));
        assert_eq!(reg.stats().evictions, 1);
    }

    #[test]
    fn test_missing_file_is_not_registered() {
        let dir = TempDir::new().expect("tmpdir");
        let reg = registry(&dir, 2, CapacityPolicy::Lru);
        let result = reg.get_entries("missing.log", 5);
        assert!(
            matches!(result, Err(TailError::NotFound { .. })),
            "expected NotFound, got {result:?}"
        );
        assert!(reg.is_empty());
    }

    #[test]
    fn test_read_failure_does_not_poison_entry() {
        let dir = TempDir::new().expect("tmpdir");
        write_lines(&dir, "app.log", 4);
        let reg = registry(&dir, 2, CapacityPolicy::Reject);
        reg.get_entries("app.log", 2).unwrap();

        std::fs::remove_file(dir.path().join("app.log")).unwrap();
        let result = reg.get_entries("app.log", 2);
        assert!(
            matches!(result, Err(TailError::Io { .. })),
            "expected Io, got {result:?}"
        );

        write_lines(&dir, "app.log", 6);
        bump_mtime(&dir, "app.log");
        let recovered = reg.get_entries("app.log", 2).unwrap();
        assert_eq!(*recovered.lines, vec!["L6", "L5"]);
    }

    #[test]
    fn test_concurrent_requests_for_one_file_read_once() {
        let dir = TempDir::new().expect("tmpdir");
        write_lines(&dir, "busy.log", 1_000);
        let reg = Arc::new(registry(&dir, 4, CapacityPolicy::Reject));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let reg = Arc::clone(&reg);
                std::thread::spawn(move || reg.get_entries("busy.log", 20).unwrap())
            })
            .collect();
        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert!(results.iter().all(|r| r.lines == results[0].lines));
        let stats = reg.stats();
        assert_eq!(stats.reads, 1);
        assert_eq!(stats.cache_hits, 7);
    }

    #[cfg(unix)]
    #[test]
    fn test_timeout_leaves_cached_result_untouched() {
        let dir = TempDir::new().expect("tmpdir");
        write_lines(&dir, "stuck.log", 5);
        age_mtime(&dir, "stuck.log");
        let reg = stalling_registry(&dir, 2);
        reg.get_entries("stuck.log", 3).unwrap();

        let fifo = stall_file(&dir, "stuck.log");
        let result = reg.get_entries("stuck.log", 3);
        assert!(
            matches!(result, Err(TailError::Timeout { .. })),
            "expected Timeout, got {result:?}"
        );

        {
            let handle = lock(&reg.entries).get("stuck.log").cloned().unwrap();
            let entry = lock(&handle);
            let cached = entry.result.as_ref().expect("cached result kept");
            assert_eq!(*cached.lines, vec!["L5", "L4", "L3"]);
            assert!(entry.pending.is_some());
        }

        release_stall(&fifo);
        assert_eq!(reg.drain(Duration::from_secs(5)), 0);
    }

    #[cfg(unix)]
    #[test]
    fn test_stalled_file_holds_at_most_one_worker() {
        let dir = TempDir::new().expect("tmpdir");
        write_lines(&dir, "stuck.log", 5);
        write_lines(&dir, "other.log", 5);
        age_mtime(&dir, "stuck.log");
        let reg = stalling_registry(&dir, 2);
        reg.get_entries("stuck.log", 2).unwrap();

        let fifo = stall_file(&dir, "stuck.log");
        for _ in 0..3 {
            let result = reg.get_entries("stuck.log", 2);
            assert!(
                matches!(result, Err(TailError::Timeout { .. })),
                "expected Timeout, got {result:?}"
            );
        }
        // Retries waited on the parked read instead of queueing new ones.
        assert_eq!(reg.stats().reads, 2);

        let healthy = reg.get_entries("other.log", 2);
        assert!(
            matches!(&healthy, Ok(r) if *r.lines == vec!["L5", "L4"]),
            "expected other.log to be served, got {healthy:?}"
        );

        release_stall(&fifo);
        assert_eq!(reg.drain(Duration::from_secs(5)), 0);
    }

    #[test]
    fn test_lru_with_every_entry_busy_rejects() {
        let dir = TempDir::new().expect("tmpdir");
        write_lines(&dir, "f0.log", 3);
        write_lines(&dir, "f1.log", 3);
        let reg = registry(&dir, 1, CapacityPolicy::Lru);
        reg.get_entries("f0.log", 1).unwrap();

        let handle = lock(&reg.entries).get("f0.log").cloned().unwrap();
        let busy = lock(&handle);
        let result = reg.get_entries("f1.log", 1);
        drop(busy);

        assert!(
            matches!(result, Err(TailError::CapacityExceeded { max: 1, .. })),
            "expected CapacityExceeded, got {result:?}"
        );
        assert!(reg.contains("f0.log"));
        assert_eq!(reg.stats().evictions, 0);
        assert_eq!(reg.stats().rejections, 1);
    }

    #[test]
    fn test_missing_file_at_capacity_keeps_live_watcher() {
        let dir = TempDir::new().expect("tmpdir");
        write_lines(&dir, "f0.log", 3);
        let reg = registry(&dir, 1, CapacityPolicy::Lru);
        reg.get_entries("f0.log", 1).unwrap();

        let result = reg.get_entries("missing.log", 1);
        assert!(
            matches!(result, Err(TailError::NotFound { .. })),
            "expected NotFound, got {result:?}"
        );
        assert!(reg.contains("f0.log"));
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.stats().evictions, 0);
    }

    #[test]
    fn test_racing_registrations_share_one_entry() {
        let dir = TempDir::new().expect("tmpdir");
        write_lines(&dir, "fresh.log", 50);
        let reg = Arc::new(registry(&dir, 1, CapacityPolicy::Reject));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let reg = Arc::clone(&reg);
                std::thread::spawn(move || reg.get_entries("fresh.log", 5))
            })
            .collect();
        for handle in handles {
            let result = handle.join().unwrap();
            assert!(result.is_ok(), "expected success, got {result:?}");
        }

        let stats = reg.stats();
        assert_eq!(stats.watchers, 1);
        assert_eq!(stats.rejections, 0);
        assert_eq!(stats.reads, 1);
    }

    #[test]
    fn test_evicted_handle_is_not_served() {
        let dir = TempDir::new().expect("tmpdir");
        write_lines(&dir, "f0.log", 3);
        write_lines(&dir, "f1.log", 4);
        let reg = registry(&dir, 1, CapacityPolicy::Lru);

        let stale = reg.entry_for("f0.log", 1).unwrap();
        assert!(reg.is_current("f0.log", &stale));

        reg.get_entries("f1.log", 1).unwrap();
        assert!(!reg.is_current("f0.log", &stale));

        let fresh = reg.get_entries("f0.log", 1).unwrap();
        assert_eq!(*fresh.lines, vec!["L3"]);
        assert!(!reg.is_current("f0.log", &stale));
        assert_eq!(reg.stats().evictions, 2);
    }
}
