//! Request and response types shared by the client and the MCP server.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

// =============================================================================
// HTTP method
// =============================================================================

/// HTTP method accepted by the request executor.
///
/// Only the four verbs the tracker API uses are recognised. Anything else is
/// kept as [`HttpMethod::Unsupported`] so the executor can reject it without
/// touching the network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    /// Unrecognised verb, holding the text the caller supplied.
    Unsupported(String),
}

impl HttpMethod {
    /// Parse a method name. Case is ignored, aliases are not.
    pub fn parse(method: &str) -> Self {
        match method.to_ascii_uppercase().as_str() {
            "GET" => Self::Get,
            "POST" => Self::Post,
            "PUT" => Self::Put,
            "DELETE" => Self::Delete,
            _ => Self::Unsupported(method.to_string()),
        }
    }

    /// Canonical upper-case name, or the text as given for unsupported verbs.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Unsupported(method) => method,
        }
    }

    /// Whether a request body is attached for this method.
    pub fn carries_body(&self) -> bool {
        matches!(self, Self::Post | Self::Put)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for HttpMethod {
    fn from(method: &str) -> Self {
        Self::parse(method)
    }
}

// =============================================================================
// Payload
// =============================================================================

/// Request body handed to the executor.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// JSON body, sent with `Content-Type: application/json`.
    Json(Value),
    /// Text fields of a multipart form, in submission order.
    /// The content type (with boundary) is left to the HTTP client.
    Multipart(Vec<(String, String)>),
}

impl Payload {
    pub fn is_multipart(&self) -> bool {
        matches!(self, Self::Multipart(_))
    }
}

// =============================================================================
// Result envelope
// =============================================================================

/// Category of a failure that happened on this side of the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    UnsupportedMethod,
    Timeout,
    Connection,
    Unexpected,
}

impl FailureKind {
    /// Label placed in the envelope's `error` field.
    pub fn label(self) -> &'static str {
        match self {
            Self::UnsupportedMethod => "Unsupported HTTP method",
            Self::Timeout => "Request timeout",
            Self::Connection => "Connection error",
            Self::Unexpected => "Unexpected error",
        }
    }
}

/// Normalized outcome of one tracker API call.
///
/// Serializes to exactly one of:
///
/// - `{"result": ...}`
/// - `{"status_code": 404, "error": ...}`
/// - `{"error": "...", "details": "..."}`
///
/// Success is recognised by the `result` key alone; no failure shape has it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Envelope {
    /// 200/201 response: parsed JSON body, or raw text otherwise.
    Success { result: Value },
    /// Any other HTTP status, with the remote body attached.
    Remote { status_code: u16, error: Value },
    /// Failure raised locally before a response was classified.
    Local {
        error: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        details: Option<String>,
    },
}

impl Envelope {
    pub fn success(result: Value) -> Self {
        Self::Success { result }
    }

    pub fn remote(status_code: u16, error: Value) -> Self {
        Self::Remote { status_code, error }
    }

    pub fn local(kind: FailureKind, details: impl Into<String>) -> Self {
        Self::Local {
            error: kind.label().to_string(),
            details: Some(details.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// The `result` value of a successful envelope.
    pub fn result(&self) -> Option<&Value> {
        match self {
            Self::Success { result } => Some(result),
            _ => None,
        }
    }

    /// Remote HTTP status, if the failure came from the tracker.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Remote { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }

    /// Label of a local failure (`"Request timeout"`, ...).
    pub fn local_error(&self) -> Option<&str> {
        match self {
            Self::Local { error, .. } => Some(error),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_method_parse() {
        assert_eq!(HttpMethod::parse("GET"), HttpMethod::Get);
        assert_eq!(HttpMethod::parse("get"), HttpMethod::Get);
        assert_eq!(HttpMethod::parse("Post"), HttpMethod::Post);
        assert_eq!(HttpMethod::parse("put"), HttpMethod::Put);
        assert_eq!(HttpMethod::parse("delete"), HttpMethod::Delete);
    }

    #[test]
    fn test_method_parse_unsupported_keeps_given_text() {
        assert_eq!(
            HttpMethod::parse("PATCH"),
            HttpMethod::Unsupported("PATCH".to_string())
        );
        assert_eq!(
            HttpMethod::parse("head"),
            HttpMethod::Unsupported("head".to_string())
        );
        assert_eq!(HttpMethod::parse("patch").to_string(), "patch");
    }

    #[test]
    fn test_method_carries_body() {
        assert!(HttpMethod::Post.carries_body());
        assert!(HttpMethod::Put.carries_body());
        assert!(!HttpMethod::Get.carries_body());
        assert!(!HttpMethod::Delete.carries_body());
    }

    #[test]
    fn test_success_envelope_shape() {
        let env = Envelope::success(json!([{"id": 1}]));
        let value = serde_json::to_value(&env).unwrap();
        assert_eq!(value, json!({"result": [{"id": 1}]}));
    }

    #[test]
    fn test_success_envelope_empty_text() {
        let env = Envelope::success(Value::String(String::new()));
        let value = serde_json::to_value(&env).unwrap();
        assert_eq!(value, json!({"result": ""}));
    }

    #[test]
    fn test_remote_envelope_shape() {
        let env = Envelope::remote(404, json!({"message": "Not found"}));
        let value = serde_json::to_value(&env).unwrap();
        assert_eq!(
            value,
            json!({"status_code": 404, "error": {"message": "Not found"}})
        );
        assert!(value.get("result").is_none());
    }

    #[test]
    fn test_local_envelope_shape() {
        let env = Envelope::local(FailureKind::Timeout, "timed out");
        let value = serde_json::to_value(&env).unwrap();
        assert_eq!(
            value,
            json!({"error": "Request timeout", "details": "timed out"})
        );
        assert!(value.get("result").is_none());
        assert!(value.get("status_code").is_none());
    }

    #[test]
    fn test_envelope_deserialize_picks_variant() {
        let ok: Envelope = serde_json::from_value(json!({"result": "text"})).unwrap();
        assert!(ok.is_success());

        let remote: Envelope =
            serde_json::from_value(json!({"status_code": 500, "error": "boom"})).unwrap();
        assert_eq!(remote.status_code(), Some(500));

        let local: Envelope =
            serde_json::from_value(json!({"error": "Connection error", "details": "x"})).unwrap();
        assert_eq!(local.local_error(), Some("Connection error"));
    }

    #[test]
    fn test_failure_labels() {
        assert_eq!(
            FailureKind::UnsupportedMethod.label(),
            "Unsupported HTTP method"
        );
        assert_eq!(FailureKind::Timeout.label(), "Request timeout");
        assert_eq!(FailureKind::Connection.label(), "Connection error");
        assert_eq!(FailureKind::Unexpected.label(), "Unexpected error");
    }
}
