use serde_json::Value;
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Maximum number of error body characters surfaced to the operator.
const MAX_ERROR_CHARS: usize = 200;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("Unable to reach the server: {0}")]
    Network(String),
    /// Non-2xx answer; `body` is the raw response text.
    #[error("Request failed ({status}): {}", sanitize_body(.body))]
    Http { status: u16, body: String },
    #[error("Response error: {0}")]
    Parse(String),
    #[error("{0}")]
    Validation(String),
    /// 2xx answer that still refuses the request (`valid: false`).
    #[error("{0}")]
    Rejected(String),
    #[error("Not signed in, run `gatepass login` first")]
    Unauthenticated,
    #[error("Config error: {0}")]
    Config(String),
}

impl Error {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// HTTP status of a failed request, if the server answered at all.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Operator-facing message for an HTTP failure.
    ///
    /// The API answers errors with `{"detail": "..."}` or, for serializer
    /// validation, a list of messages. A JSON body without either gives
    /// `None`; a plain-text body is returned trimmed and truncated.
    #[must_use]
    pub fn detail(&self) -> Option<String> {
        let Self::Http { body, .. } = self else {
            return None;
        };

        let message = match serde_json::from_str::<Value>(body) {
            Ok(Value::Object(map)) => map.get("detail").and_then(Value::as_str).map(str::to_string),
            Ok(Value::Array(items)) => items.first().and_then(Value::as_str).map(str::to_string),
            Ok(Value::String(message)) => Some(message),
            Ok(_) => None,
            Err(_) => Some(truncate(body)),
        };

        message
            .map(|message| message.trim().to_string())
            .filter(|message| !message.is_empty())
    }
}

fn truncate(body: &str) -> String {
    body.trim().chars().take(MAX_ERROR_CHARS).collect()
}

/// Trims and truncates error bodies for operator-facing messages.
fn sanitize_body(body: &str) -> String {
    let trimmed = truncate(body);
    if trimmed.is_empty() {
        "Request failed.".to_string()
    } else {
        trimmed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn http(status: u16, body: &str) -> Error {
        Error::Http {
            status,
            body: body.to_string(),
        }
    }

    #[test]
    fn detail_prefers_detail_field() {
        let err = http(404, r#"{"valid": false, "detail": "Invalid QR Code."}"#);
        assert_eq!(err.detail().as_deref(), Some("Invalid QR Code."));
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn detail_reads_validation_lists() {
        let err = http(400, r#"["User not found."]"#);
        assert_eq!(err.detail().as_deref(), Some("User not found."));
    }

    #[test]
    fn detail_falls_back_to_text_body() {
        let err = http(502, "  Bad Gateway\n");
        assert_eq!(err.detail().as_deref(), Some("Bad Gateway"));

        let err = http(502, &"x".repeat(500));
        assert_eq!(err.detail().map(|d| d.len()), Some(MAX_ERROR_CHARS));
    }

    #[test]
    fn detail_is_none_without_a_message() {
        assert_eq!(http(502, "").detail(), None);
        assert_eq!(http(500, "  \n").detail(), None);
        assert_eq!(http(404, r#"{"detail": ""}"#).detail(), None);
        assert_eq!(http(500, r#"{"error": "boom"}"#).detail(), None);
    }

    #[test]
    fn long_detail_is_not_truncated() {
        let detail = format!("Error linking face to user: {}", "x".repeat(250));
        let err = http(500, &serde_json::json!({ "detail": detail }).to_string());
        assert_eq!(err.detail(), Some(detail));
    }

    #[test]
    fn display_sanitizes_body() {
        assert_eq!(http(502, "").to_string(), "Request failed (502): Request failed.");

        let shown = http(500, &"y".repeat(500)).to_string();
        assert_eq!(shown, format!("Request failed (500): {}", "y".repeat(MAX_ERROR_CHARS)));
    }

    #[test]
    fn sanitize_body_trims_and_truncates() {
        assert_eq!(sanitize_body("   "), "Request failed.");
        assert_eq!(sanitize_body("  nope \n"), "nope");
        assert_eq!(sanitize_body(&"x".repeat(500)).len(), MAX_ERROR_CHARS);
    }

    #[test]
    fn detail_is_none_for_local_errors() {
        assert_eq!(Error::Network("refused".to_string()).detail(), None);
        assert_eq!(Error::Unauthenticated.status(), None);
    }
}
