// LogTail - core/reader.rs
//
// Reverse line reader: returns the last N lines of a file, newest first,
// walking fixed-size blocks backward from the end of the file.
//
// Memory: one block buffer plus the line currently being assembled, so the
// working set is bounded by `block_size + longest line` regardless of file size.
//
// Line rules:
//   - `\n` terminates a line; a `\r` immediately before it is dropped too.
//   - Empty lines are skipped and do not count toward `max_lines`.
//   - A first line without a preceding terminator (offset 0) is still emitted.
//   - Bytes are decoded per line as lossy UTF-8.

use crate::util::constants::DEFAULT_BLOCK_SIZE;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

/// Read up to `max_lines` trailing lines of `path`, newest first, using the
/// default block size.
pub fn read_tail(path: &Path, max_lines: usize) -> io::Result<Vec<String>> {
    read_tail_with_block_size(path, max_lines, DEFAULT_BLOCK_SIZE)
}

/// Read up to `max_lines` trailing lines of `path`, newest first, reading
/// `block_size` bytes per backward step.
///
/// Fails with `io::ErrorKind::NotFound` when the file does not exist. Stops
/// reading as soon as `max_lines` non-empty lines have been collected.
pub fn read_tail_with_block_size(
    path: &Path,
    max_lines: usize,
    block_size: usize,
) -> io::Result<Vec<String>> {
    let mut file = File::open(path)?;
    let size = file.metadata()?.len();

    let mut lines = Vec::with_capacity(max_lines.min(1024));
    if max_lines == 0 || size == 0 {
        return Ok(lines);
    }

    let block_size = block_size.max(1);
    let mut buf = vec![0u8; block_size];
    // Bytes of the line being assembled, in reverse order.
    let mut pending: Vec<u8> = Vec::new();
    // Set after a `\n` so that a `\r` directly before it is swallowed, even
    // when the two bytes straddle a block boundary.
    let mut after_newline = false;
    // Exclusive end of the next block to read.
    let mut end = size;

    while end > 0 {
        let start = end.saturating_sub(block_size as u64);
        // end - start <= block_size, which is a usize.
        let len = (end - start) as usize;
        let block = &mut buf[..len];
        file.seek(SeekFrom::Start(start))?;
        file.read_exact(block)?;

        for &byte in block.iter().rev() {
            if after_newline {
                after_newline = false;
                if byte == b'\r' {
                    continue;
                }
            }
            if byte == b'\n' {
                if emit_line(&mut pending, &mut lines) && lines.len() >= max_lines {
                    return Ok(lines);
                }
                after_newline = true;
            } else {
                pending.push(byte);
            }
        }

        end = start;
    }

    // Oldest line of the file has no terminator in front of it.
    emit_line(&mut pending, &mut lines);
    Ok(lines)
}

/// Restore left-to-right order of `pending`, push it to `lines` if non-empty,
/// and clear the buffer. Returns true when a line was emitted.
fn emit_line(pending: &mut Vec<u8>, lines: &mut Vec<String>) -> bool {
    if pending.is_empty() {
        return false;
    }
    pending.reverse();
    lines.push(String::from_utf8_lossy(pending).into_owned());
    pending.clear();
    true
}
