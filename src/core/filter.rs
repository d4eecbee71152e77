// LogTail - core/filter.rs
//
// Substring filter applied to a tail result after truncation.
// Core layer: pure logic, no I/O.

/// Filter applied to the lines of a tail result.
#[derive(Debug, Clone, Default)]
pub struct TailFilter {
    /// Substring text search (case-insensitive). Empty = no filter.
    pub text_search: String,
}

impl TailFilter {
    /// Build a filter from an optional query; `None` and `""` both disable it.
    pub fn new(query: Option<&str>) -> Self {
        Self {
            text_search: query.unwrap_or_default().to_string(),
        }
    }

    /// Returns true if no filter is active.
    pub fn is_empty(&self) -> bool {
        self.text_search.is_empty()
    }

    /// Return the lines matching this filter, preserving their order.
    pub fn apply(&self, lines: &[String]) -> Vec<String> {
        if self.is_empty() {
            return lines.to_vec();
        }

        let text_lower = self.text_search.to_lowercase();
        lines
            .iter()
            .filter(|line| line.to_lowercase().contains(&text_lower))
            .cloned()
            .collect()
    }
}

/// Apply an optional case-insensitive substring query to `lines`.
///
/// Returns the input unchanged when no query is supplied.
pub fn apply(lines: &[String], query: Option<&str>) -> Vec<String> {
    TailFilter::new(query).apply(lines)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_no_query_returns_all() {
        let input = lines(&["Error: a", "Info: b"]);
        assert_eq!(apply(&input, None), input);
        assert_eq!(apply(&input, Some("")), input);
    }

    #[test]
    fn test_text_search_case_insensitive() {
        let input = lines(&["Error: a", "Info: b", "Error: c"]);
        assert_eq!(apply(&input, Some("error")), vec!["Error: a", "Error: c"]);
        assert_eq!(apply(&input, Some("ERROR")), vec!["Error: a", "Error: c"]);
    }

    #[test]
    fn test_no_match_returns_empty() {
        let input = lines(&["Connection ok", "Query ok"]);
        assert!(apply(&input, Some("timeout")).is_empty());
    }

    #[test]
    fn test_order_is_preserved() {
        let input = lines(&["z db", "a db", "m cache", "b DB"]);
        assert_eq!(apply(&input, Some("db")), vec!["z db", "a db", "b DB"]);
    }
}
