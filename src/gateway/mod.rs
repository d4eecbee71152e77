// LogTail - gateway/mod.rs
//
// Request gateway: validation of untrusted input and shaping of responses.
// Dependencies: util, serde, regex.
// Must NOT depend on: app internals (registry, watcher, pool).

pub mod request;
pub mod response;
