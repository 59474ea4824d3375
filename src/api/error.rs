use thiserror::Error;

/// Fallback shown when a failed login/signup carries no usable detail.
pub const AUTH_FAILED_MESSAGE: &str = "Authentication failed";

/// Normalized backend failure.
///
/// Callers match on the variant, never on transport details. Variants carry
/// strings rather than `reqwest::Error` so results can be cloned into cache
/// entries and events.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Credential missing, invalid or expired (HTTP 401/403).
    #[error("Not authorized{}", suffix(.detail))]
    Authorization { detail: Option<String> },

    /// Input rejected on the client before dispatch.
    #[error("{0}")]
    Validation(String),

    /// Transport failure: DNS, connect, TLS, timeout.
    #[error("Network error: {0}")]
    Network(String),

    /// Non-2xx response with a well-formed `{"detail": "..."}` payload.
    #[error("Server error ({status}): {detail}")]
    Backend { status: u16, detail: String },

    /// Anything else: unexpected status without payload, undecodable body.
    #[error("Unexpected response: {0}")]
    Unknown(String),
}

impl ApiError {
    /// True when the credential must be discarded and the user sent back to
    /// authentication.
    pub fn is_authorization(&self) -> bool {
        matches!(self, ApiError::Authorization { .. })
    }

    /// Backend-provided detail text, if the server sent one.
    pub fn detail(&self) -> Option<&str> {
        match self {
            ApiError::Authorization { detail } => detail.as_deref(),
            ApiError::Backend { detail, .. } => Some(detail),
            ApiError::Validation(msg) => Some(msg),
            ApiError::Network(_) | ApiError::Unknown(_) => None,
        }
    }

    /// Message for an inline form error: the server's detail when present,
    /// otherwise `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        self.detail().unwrap_or(fallback).to_string()
    }

    pub(crate) fn from_transport(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Network("request timed out".to_string())
        } else if err.is_decode() || err.is_body() {
            ApiError::Unknown(err.to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }

    /// Classify a non-2xx response from its status and (possibly empty) body.
    pub(crate) fn from_status(status: u16, body: &[u8]) -> Self {
        let detail = extract_detail(body);
        match status {
            401 | 403 => ApiError::Authorization { detail },
            _ => match detail {
                Some(detail) => ApiError::Backend { status, detail },
                None => ApiError::Unknown(format!("HTTP status {}", status)),
            },
        }
    }
}

fn suffix(detail: &Option<String>) -> String {
    detail.as_deref().map(|d| format!(": {d}")).unwrap_or_default()
}

/// Pull a string `detail` out of an error payload.
///
/// Validation failures on the backend send `detail` as a list of objects;
/// those are not user-facing text and yield `None`.
fn extract_detail(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    value
        .get("detail")
        .and_then(|d| d.as_str())
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string)
}
