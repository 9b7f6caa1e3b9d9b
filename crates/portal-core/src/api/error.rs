use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// The service refused the credentials; the message is shown as-is
    #[error("{0}")]
    Rejected(String),

    #[error("Unauthorized - session may be expired")]
    Unauthorized,

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Network error: {0}")]
    NetworkError(#[source] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Fallback shown when a rejection carries no body
const DEFAULT_REJECTION_MESSAGE: &str = "Login failed";

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ApiError::Timeout
        } else if e.is_decode() {
            ApiError::InvalidResponse(e.to_string())
        } else {
            ApiError::NetworkError(e)
        }
    }
}

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let cut = (0..=MAX_ERROR_BODY_LENGTH)
                .rev()
                .find(|i| body.is_char_boundary(*i))
                .unwrap_or(0);
            format!("{}... (truncated, {} total bytes)", &body[..cut], body.len())
        }
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let truncated = Self::truncate_body(body);
        match status.as_u16() {
            401 => ApiError::Unauthorized,
            403 => ApiError::AccessDenied(truncated),
            404 => ApiError::NotFound(truncated),
            500..=599 => ApiError::ServerError(truncated),
            _ => ApiError::InvalidResponse(format!("Status {}: {}", status, truncated)),
        }
    }

    /// Classify a failed login response.
    ///
    /// Any client error is a rejection carrying the service's message.
    pub fn from_login_status(status: reqwest::StatusCode, body: &str) -> Self {
        if status.is_client_error() {
            ApiError::Rejected(Self::rejection_message(body))
        } else {
            Self::from_status(status, body)
        }
    }

    /// Pull the human-readable message out of an error body.
    /// Accepts plain text, a JSON string, or a JSON object with a
    /// `message` or `error` field.
    pub fn rejection_message(body: &str) -> String {
        let trimmed = body.trim();
        if trimmed.is_empty() {
            return DEFAULT_REJECTION_MESSAGE.to_string();
        }
        match serde_json::from_str::<serde_json::Value>(trimmed) {
            Ok(serde_json::Value::String(s)) => s,
            Ok(serde_json::Value::Object(map)) => ["message", "error"]
                .iter()
                .find_map(|k| map.get(*k).and_then(|v| v.as_str()))
                .map(str::to_string)
                .unwrap_or_else(|| Self::truncate_body(trimmed)),
            _ => Self::truncate_body(trimmed),
        }
    }

    /// True for failures that mean the session is no longer valid
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }
}
