// LogTail - core/mod.rs
//
// Core business logic layer: the reverse line reader, the result filter, and
// the shared data model.
// Must NOT depend on: app, gateway, or platform config.

pub mod filter;
pub mod model;
pub mod reader;
