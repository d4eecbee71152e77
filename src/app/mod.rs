// LogTail - app/mod.rs
//
// Application layer: the tail engine, its watcher registry, per-file
// watchers, and the worker pool that executes reads.
// Dependencies: core, gateway (request/response types), util.

pub mod engine;
pub mod pool;
pub mod registry;
pub mod watcher;
