// LogTail - gateway/request.rs
//
// Incoming tail request and its validation. Everything past `validate` may
// assume a file name without path separators and an in-range line count.

use crate::util::constants;
use crate::util::error::RequestError;
use regex::Regex;
use serde::Deserialize;
use std::sync::OnceLock;

/// A tail request as received from a caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TailRequest {
    /// File name relative to the base directory.
    pub file_name: String,
    /// Lines requested. `None` uses the configured default.
    pub num_entries: Option<usize>,
    /// Optional case-insensitive substring filter.
    pub filter: Option<String>,
}

/// Line-count bounds applied during validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestLimits {
    pub default_num_entries: usize,
    pub max_tail_lines: usize,
}

impl Default for RequestLimits {
    fn default() -> Self {
        Self {
            default_num_entries: constants::DEFAULT_NUM_ENTRIES,
            max_tail_lines: constants::DEFAULT_MAX_TAIL_LINES,
        }
    }
}

/// A request that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRequest {
    pub file_name: String,
    pub num_entries: usize,
    pub filter: Option<String>,
}

fn not_allowed_chars() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(constants::NOT_ALLOWED_INPUT_CHARS).expect("separator pattern is valid")
    })
}

impl TailRequest {
    pub fn new(file_name: impl Into<String>, num_entries: Option<usize>, filter: Option<&str>) -> Self {
        Self {
            file_name: file_name.into(),
            num_entries,
            filter: filter.map(str::to_string),
        }
    }

    /// Check the request against `limits`, filling in the default line count.
    pub fn validate(&self, limits: &RequestLimits) -> Result<ValidatedRequest, RequestError> {
        let name = self.file_name.as_str();
        if name.is_empty()
            || name == "."
            || name == ".."
            || name.contains('\0')
            || not_allowed_chars().is_match(name)
        {
            return Err(RequestError::InvalidFileName {
                file: self.file_name.clone(),
            });
        }

        if let Some(filter) = &self.filter {
            if not_allowed_chars().is_match(filter) {
                return Err(RequestError::InvalidFilter {
                    filter: filter.clone(),
                });
            }
        }

        let num_entries = self.num_entries.unwrap_or(limits.default_num_entries);
        if num_entries < 1 || num_entries > limits.max_tail_lines {
            return Err(RequestError::NumEntriesOutOfRange {
                requested: num_entries,
                min: 1,
                max: limits.max_tail_lines,
            });
        }

        Ok(ValidatedRequest {
            file_name: self.file_name.clone(),
            num_entries,
            // An empty filter is the same as no filter.
            filter: self.filter.clone().filter(|f| !f.is_empty()),
        })
    }
}
