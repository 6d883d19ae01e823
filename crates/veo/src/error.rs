//! Generation failures and HTTP error classification.
//!
//! Non-success responses are reduced to a message (the JSON
//! `error.message` when present, else the raw body) and then classified
//! by substring: mentions of an API key become [`GenerationError::Auth`],
//! mentions of quota become [`GenerationError::Quota`], anything else is
//! kept verbatim as [`GenerationError::Http`].

use reqwest::StatusCode;

/// Message used when a finished operation carries no video and no reason.
pub const NO_VIDEOS_MESSAGE: &str = "No videos generated";

/// Errors from submitting, polling or downloading a generation.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// The API key is missing or was rejected.
    #[error("API key rejected: {detail}")]
    Auth { detail: String },

    /// The account's usage quota is exhausted.
    #[error("Quota exceeded: {detail}")]
    Quota { detail: String },

    /// The operation finished without a downloadable video.
    #[error("{0}")]
    NoOutput(String),

    /// The HTTP request itself failed (network, DNS, TLS, body decode).
    #[error("HTTP request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// Non-2xx response that did not match a friendlier category.
    #[error("{message}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Extracted error message or raw body.
        message: String,
    },

    /// The poll loop was stopped through its cancellation token.
    #[error("Generation cancelled")]
    Cancelled,
}

impl GenerationError {
    /// Whether the user should be asked for a new API key.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth { .. })
    }

    /// Short, user-facing description of the failure.
    pub fn user_message(&self) -> String {
        match self {
            Self::Auth { .. } => {
                "Invalid or missing API key. Please enter a valid API key.".to_string()
            }
            Self::Quota { .. } => {
                "API quota exceeded. Check your plan and billing details, then try again."
                    .to_string()
            }
            Self::Network(e) if e.is_timeout() => {
                "The request timed out. Check your connection and try again.".to_string()
            }
            Self::Network(_) => {
                "Could not reach the video service. Check your connection and try again."
                    .to_string()
            }
            other => other.to_string(),
        }
    }
}

/// Classify a non-success HTTP response.
pub fn classify_http_failure(status: StatusCode, body: &str) -> GenerationError {
    let message = extract_error_message(body).unwrap_or_else(|| {
        let raw = body.trim();
        if raw.is_empty() {
            format!("Request failed with status {status}")
        } else {
            raw.to_string()
        }
    });
    classify_message(status, message)
}

/// Map an already-extracted message to the error taxonomy.
pub fn classify_message(status: StatusCode, message: String) -> GenerationError {
    let lower = message.to_lowercase();
    if lower.contains("api key") || status == StatusCode::UNAUTHORIZED {
        GenerationError::Auth { detail: message }
    } else if lower.contains("quota") {
        GenerationError::Quota { detail: message }
    } else {
        GenerationError::Http {
            status: status.as_u16(),
            message,
        }
    }
}

/// Pull a human-readable message out of a JSON error body.
///
/// Accepts `{"error": {"message": ...}}`, `{"error": "..."}` and
/// `{"message": ...}`. Returns `None` for malformed JSON or other shapes.
pub fn extract_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;

    let message = match value.get("error") {
        Some(serde_json::Value::String(s)) => Some(s.as_str()),
        Some(err) => err.get("message").and_then(serde_json::Value::as_str),
        None => value.get("message").and_then(serde_json::Value::as_str),
    }?;

    let message = message.trim();
    (!message.is_empty()).then(|| message.to_string())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn forbidden_with_json_message_is_verbatim() {
        let err = classify_http_failure(
            StatusCode::FORBIDDEN,
            r#"{"error":{"message":"bad key"}}"#,
        );
        assert_matches!(&err, GenerationError::Http { status: 403, .. });
        assert_eq!(err.to_string(), "bad key");
    }

    #[test]
    fn api_key_mention_is_auth() {
        let body = r#"{"error":{"code":400,"message":"API key not valid. Please pass a valid API key.","status":"INVALID_ARGUMENT"}}"#;
        let err = classify_http_failure(StatusCode::BAD_REQUEST, body);
        assert_matches!(&err, GenerationError::Auth { detail } if detail.starts_with("API key not valid"));
        assert!(err.is_auth());
        assert_eq!(
            err.user_message(),
            "Invalid or missing API key. Please enter a valid API key."
        );
    }

    #[test]
    fn unauthorized_status_is_auth() {
        let err = classify_http_failure(StatusCode::UNAUTHORIZED, "");
        assert_matches!(err, GenerationError::Auth { .. });
    }

    #[test]
    fn quota_mention_is_quota() {
        let body = r#"{"error":{"code":429,"message":"You exceeded your current quota, please check your plan."}}"#;
        let err = classify_http_failure(StatusCode::TOO_MANY_REQUESTS, body);
        assert_matches!(err, GenerationError::Quota { .. });
    }

    #[test]
    fn malformed_json_falls_back_to_raw_text() {
        let err = classify_http_failure(StatusCode::BAD_GATEWAY, "<html>upstream down</html>");
        assert_eq!(err.to_string(), "<html>upstream down</html>");

        let err = classify_http_failure(StatusCode::BAD_GATEWAY, r#"{"error": {"message": "#);
        assert_eq!(err.to_string(), r#"{"error": {"message": "#);
    }

    #[test]
    fn raw_text_is_still_classified() {
        let err = classify_http_failure(StatusCode::FORBIDDEN, "Daily quota reached");
        assert_matches!(err, GenerationError::Quota { .. });
    }

    #[test]
    fn empty_body_uses_status() {
        let err = classify_http_failure(StatusCode::INTERNAL_SERVER_ERROR, "  ");
        assert_eq!(
            err.to_string(),
            "Request failed with status 500 Internal Server Error"
        );
    }

    #[test]
    fn extract_accepts_known_shapes() {
        assert_eq!(
            extract_error_message(r#"{"error":"plain string"}"#).as_deref(),
            Some("plain string")
        );
        assert_eq!(
            extract_error_message(r#"{"message":"top level"}"#).as_deref(),
            Some("top level")
        );
        assert!(extract_error_message(r#"{"error":{"code":500}}"#).is_none());
        assert!(extract_error_message(r#"[1, 2, 3]"#).is_none());
        assert!(extract_error_message(r#"{"error":{"message":"   "}}"#).is_none());
    }

    #[test]
    fn no_output_displays_message_verbatim() {
        assert_eq!(
            GenerationError::NoOutput(NO_VIDEOS_MESSAGE.to_string()).to_string(),
            "No videos generated"
        );
        assert_eq!(
            GenerationError::NoOutput("X".to_string()).user_message(),
            "X"
        );
    }
}
