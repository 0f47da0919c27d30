//! Error taxonomy for the Huddle API client.
//!
//! The backend reports failures as JSON bodies carrying a `detail` or
//! `message` field. Normalization happens here, once, so every caller sees a
//! single error value with a human-readable message. The one application-level
//! soft error the backend signals in prose ("pending approval") is classified
//! into its own variant so callers match on the kind instead of the text.

use thiserror::Error;

/// Phrase the backend uses for accounts awaiting admin approval.
const PENDING_APPROVAL_PHRASE: &str = "pending approval";

/// Errors surfaced by [`crate::ApiClient`].
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-2xx response. `Display` is exactly the normalized server message.
    #[error("{message}")]
    Status { status: u16, message: String },

    /// The account exists but has not been approved by an admin yet.
    #[error("{message}")]
    PendingApproval { status: u16, message: String },

    #[error("Invalid response payload: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
}

impl ApiError {
    /// Classify a non-2xx response into an error value.
    ///
    /// Message precedence: the `detail`/`message` field of a JSON body, the
    /// raw body text when the response is not JSON, and `HTTP <status>` when
    /// neither yields anything.
    pub fn from_response(status: u16, is_json: bool, body: &str) -> Self {
        let message = normalize_message(status, is_json, body);
        if message.to_lowercase().contains(PENDING_APPROVAL_PHRASE) {
            ApiError::PendingApproval { status, message }
        } else {
            ApiError::Status { status, message }
        }
    }

    /// HTTP status of the failed response, when there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } | ApiError::PendingApproval { status, .. } => {
                Some(*status)
            }
            ApiError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// True when the server rejected the caller's credentials.
    pub fn is_auth_error(&self) -> bool {
        matches!(self.status(), Some(401) | Some(403))
    }

    pub fn is_pending_approval(&self) -> bool {
        matches!(self, ApiError::PendingApproval { .. })
    }
}

/// Extract the best available message from an error response body.
fn normalize_message(status: u16, is_json: bool, body: &str) -> String {
    let from_body = if is_json {
        serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|payload| {
                message_field(&payload, "detail").or_else(|| message_field(&payload, "message"))
            })
    } else if body.is_empty() {
        None
    } else {
        Some(body.to_string())
    };

    from_body.unwrap_or_else(|| format!("HTTP {}", status))
}

/// A present, non-empty field. Non-string values (validation error arrays and
/// the like) are serialized rather than dropped.
fn message_field(payload: &serde_json::Value, key: &str) -> Option<String> {
    match payload.get(key)? {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) if s.is_empty() => None,
        serde_json::Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_detail_used_verbatim() {
        let err = ApiError::from_response(400, true, r#"{"detail":"X"}"#);
        assert_eq!(err.to_string(), "X");
        assert_eq!(err.status(), Some(400));
    }

    #[test]
    fn test_json_message_used_when_no_detail() {
        let err = ApiError::from_response(422, true, r#"{"message":"bad input"}"#);
        assert_eq!(err.to_string(), "bad input");
    }

    #[test]
    fn test_detail_preferred_over_message() {
        let err = ApiError::from_response(400, true, r#"{"detail":"d","message":"m"}"#);
        assert_eq!(err.to_string(), "d");
    }

    #[test]
    fn test_empty_detail_falls_through_to_message() {
        let err = ApiError::from_response(400, true, r#"{"detail":"","message":"m"}"#);
        assert_eq!(err.to_string(), "m");
    }

    #[test]
    fn test_non_string_detail_is_serialized() {
        let err = ApiError::from_response(422, true, r#"{"detail":[{"loc":["body"]}]}"#);
        assert!(err.to_string().contains("loc"), "got: {}", err);
    }

    #[test]
    fn test_raw_text_body_used_as_message() {
        let err = ApiError::from_response(502, false, "Y");
        assert_eq!(err.to_string(), "Y");
    }

    #[test]
    fn test_synthesized_message_when_nothing_usable() {
        assert_eq!(ApiError::from_response(500, false, "").to_string(), "HTTP 500");
        assert_eq!(
            ApiError::from_response(500, true, "not json at all").to_string(),
            "HTTP 500"
        );
        assert_eq!(ApiError::from_response(404, true, "{}").to_string(), "HTTP 404");
    }

    #[test]
    fn test_pending_approval_classified_case_insensitively() {
        let err = ApiError::from_response(403, true, r#"{"detail":"Account Pending Approval"}"#);
        assert!(err.is_pending_approval());
        assert_eq!(err.to_string(), "Account Pending Approval");

        let err = ApiError::from_response(403, true, r#"{"detail":"forbidden"}"#);
        assert!(!err.is_pending_approval());
    }

    #[test]
    fn test_auth_error_detection() {
        assert!(ApiError::from_response(401, false, "").is_auth_error());
        assert!(ApiError::from_response(403, false, "").is_auth_error());
        assert!(!ApiError::from_response(500, false, "").is_auth_error());
    }
}
