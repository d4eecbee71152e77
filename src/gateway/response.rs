// LogTail - gateway/response.rs
//
// Client-visible payloads for tail results and failures.

use crate::util::error::LogTailError;
use serde::Serialize;

/// Successful tail response: the lines and an echo of the filter used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TailResponse {
    pub log_entries: Vec<String>,
    pub filter_used: Option<String>,
}

/// Failure payload with a transport status and a displayable reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorResponse {
    pub status: u16,
    pub error: String,
}

impl From<&LogTailError> for ErrorResponse {
    fn from(e: &LogTailError) -> Self {
        Self {
            status: e.status_code(),
            error: e.to_string(),
        }
    }
}

/// Serialise a response to a single JSON line.
pub fn to_json_line<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| {
        tracing::error!(error = %e, "Failed to serialise response");
        format!(r#"{{"status":500,"error":"serialisation failed: {e}"}}"#)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::error::TailError;

    #[test]
    fn test_tail_response_shape() {
        let response = TailResponse {
            log_entries: vec!["L9".to_string()],
            filter_used: Some("9".to_string()),
        };
        assert_eq!(
            to_json_line(&response),
            r#"{"logEntries":["L9"],"filterUsed":"9"}"#
        );
    }

    #[test]
    fn test_error_response_carries_status() {
        let err = LogTailError::from(TailError::CapacityExceeded {
            file: "x.log".to_string(),
            max: 10,
        });
        let payload = ErrorResponse::from(&err);
        assert_eq!(payload.status, 429);
        assert!(payload.error.contains("x.log"));
    }
}
