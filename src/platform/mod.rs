// LogTail - platform/mod.rs
//
// Platform abstraction layer: config directory resolution, config.toml
// loading, and filesystem helpers.
// Dependencies: standard library, directories, toml.

pub mod config;
pub mod fs;
