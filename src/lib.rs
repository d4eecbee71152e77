// LogTail - lib.rs
//
// Library entry point, exposing the tail engine and its supporting layers for
// the binary, integration tests, and embedding in a request-serving process.

pub mod app;
pub mod core;
pub mod gateway;
pub mod platform;
pub mod util;
