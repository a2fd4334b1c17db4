use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Not logged on")]
    NotLoggedOn,

    #[error("Disconnected from the network")]
    Disconnected,

    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// Non-success answers from the connection-manager gateway.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("Unauthorized - session may have expired")]
    Unauthorized,

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Rate limited - please wait before retrying")]
    RateLimited,

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl GatewayError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            return body.to_string();
        }
        let mut end = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let truncated = Self::truncate_body(body);
        match status.as_u16() {
            401 | 403 => GatewayError::Unauthorized,
            404 => GatewayError::SessionNotFound(truncated),
            429 => GatewayError::RateLimited,
            500..=599 => GatewayError::ServerError(truncated),
            _ => GatewayError::InvalidResponse(format!("Status {}: {}", status, truncated)),
        }
    }
}
