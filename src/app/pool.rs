// LogTail - app/pool.rs
//
// Fixed-size worker pool for tail reads.
//
// Architecture:
//   - A `rayon::ThreadPool` with a fixed thread count executes jobs.
//   - `submit` hands a job to the pool and returns a `PendingJob`, the
//     receiving end of an mpsc channel the job reports back on. `wait` blocks
//     on it, optionally bounded by a timeout, and may be called again after a
//     timeout. `run` is submit-then-wait for callers that never retry.
//     Parallelism comes from several callers using the pool at once.
//   - An in-flight counter guarded by a Condvar lets `drain` wait for every
//     submitted job to finish before the pool is dropped.
//
// A job abandoned by a timed-out caller still runs to completion; its result
// is discarded when the send on the closed channel fails.

use std::sync::{mpsc, Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

/// Why `WorkerPool::run` returned without a job result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolError {
    /// The job did not finish within the caller's timeout.
    Timeout,
    /// The job's worker went away without reporting (the job panicked).
    Disconnected,
}

/// Handle to a job submitted with `WorkerPool::submit`.
#[derive(Debug)]
pub struct PendingJob<T> {
    rx: mpsc::Receiver<T>,
}

impl<T> PendingJob<T> {
    /// Wait for the job's result. `timeout = None` waits indefinitely.
    ///
    /// After `Err(PoolError::Timeout)` the job is still running and `wait` can
    /// be called again. Once a result or `Disconnected` has been returned the
    /// handle is spent.
    pub fn wait(&self, timeout: Option<Duration>) -> Result<T, PoolError> {
        match timeout {
            Some(limit) => self.rx.recv_timeout(limit).map_err(|e| match e {
                mpsc::RecvTimeoutError::Timeout => PoolError::Timeout,
                mpsc::RecvTimeoutError::Disconnected => PoolError::Disconnected,
            }),
            None => self.rx.recv().map_err(|_| PoolError::Disconnected),
        }
    }
}

/// Counter of submitted-but-unfinished jobs.
#[derive(Debug, Default)]
struct InFlight {
    count: Mutex<usize>,
    idle: Condvar,
}

impl InFlight {
    fn begin(&self) {
        let mut count = self.count.lock().unwrap_or_else(|e| e.into_inner());
        *count += 1;
    }

    fn end(&self) {
        let mut count = self.count.lock().unwrap_or_else(|e| e.into_inner());
        *count = count.saturating_sub(1);
        if *count == 0 {
            self.idle.notify_all();
        }
    }

    fn current(&self) -> usize {
        *self.count.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Decrements the in-flight counter when a job finishes, including by panic.
struct JobGuard(Arc<InFlight>);

impl Drop for JobGuard {
    fn drop(&mut self) {
        self.0.end();
    }
}

/// Fixed-size pool of worker threads executing blocking jobs.
pub struct WorkerPool {
    pool: rayon::ThreadPool,
    threads: usize,
    in_flight: Arc<InFlight>,
}

impl WorkerPool {
    /// Build a pool with exactly `threads` workers (at least one).
    pub fn new(threads: usize) -> Result<Self, rayon::ThreadPoolBuildError> {
        let threads = threads.max(1);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("logtail-worker-{i}"))
            // Without a handler rayon aborts the process on a job panic.
            .panic_handler(|_| tracing::error!("Worker job panicked"))
            .build()?;

        tracing::debug!(threads, "Worker pool started");

        Ok(Self {
            pool,
            threads,
            in_flight: Arc::new(InFlight::default()),
        })
    }

    /// Number of worker threads.
    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Jobs submitted and not yet finished.
    pub fn in_flight(&self) -> usize {
        self.in_flight.current()
    }

    /// Queue `job` on a worker and return a handle to its result.
    pub fn submit<T, F>(&self, job: F) -> PendingJob<T>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();

        self.in_flight.begin();
        let guard = JobGuard(Arc::clone(&self.in_flight));
        self.pool.spawn(move || {
            let _guard = guard;
            // Receiver dropped means nobody wants the result any more.
            let _ = tx.send(job());
        });

        PendingJob { rx }
    }

    /// Run `job` on a worker and wait for its result.
    ///
    /// `timeout = None` waits indefinitely.
    pub fn run<T, F>(&self, job: F, timeout: Option<Duration>) -> Result<T, PoolError>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        self.submit(job).wait(timeout)
    }

    /// Block until every submitted job has finished or `limit` elapses.
    /// Returns the number of jobs still running when it gave up.
    pub fn drain(&self, limit: Duration) -> usize {
        let deadline = Instant::now() + limit;
        let mut count = self
            .in_flight
            .count
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        while *count > 0 {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            count = match self.in_flight.idle.wait_timeout(count, deadline - now) {
                Ok((guard, _)) => guard,
                Err(e) => e.into_inner().0,
            };
        }
        *count
    }
}
