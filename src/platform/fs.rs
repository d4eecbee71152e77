// LogTail - platform/fs.rs
//
// Filesystem helpers shared by the watcher and the tests.

use std::io;
use std::path::Path;
use std::time::SystemTime;

/// Last-modified timestamp of `path`.
pub fn modified_time(path: &Path) -> io::Result<SystemTime> {
    std::fs::metadata(path)?.modified()
}

/// Read the last `max_lines` non-empty lines of a file, newest first, by
/// loading the whole file.
///
/// Produces the same lines as `core::reader::read_tail` but holds the entire
/// file in memory, so it is only suitable for small files and as a reference
/// in tests.
pub fn read_tail_naive(path: &Path, max_lines: usize) -> io::Result<Vec<String>> {
    let bytes = std::fs::read(path)?;
    let lines = bytes
        .split_inclusive(|b| *b == b'\n')
        .map(|line| match line.strip_suffix(b"\n") {
            // Only a `\r` that precedes the terminator belongs to it.
            Some(body) => body.strip_suffix(b"\r").unwrap_or(body),
            None => line,
        })
        .filter(|line| !line.is_empty())
        .map(|line| String::from_utf8_lossy(line).into_owned())
        .collect::<Vec<_>>();
    Ok(lines.into_iter().rev().take(max_lines).collect())
}
