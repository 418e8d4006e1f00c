use thiserror::Error;

/// Failures of a single scoring round-trip.
#[derive(Debug, Error)]
pub enum HttpError {
    #[error("Connection to {url} failed: {message}")]
    Connect { url: String, message: String },

    #[error("Request to {url} timed out: {message}")]
    Timeout { url: String, message: String },

    #[error("Transport error talking to {url}: {message}")]
    Transport { url: String, message: String },

    #[error("Scoring service answered HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Response body is not valid JSON: {0}")]
    InvalidBody(String),

    #[error("Failed to build HTTP client: {0}")]
    Client(String),
}

impl HttpError {
    /// Connection-level failure, as opposed to a reply the server did send.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            HttpError::Connect { .. } | HttpError::Timeout { .. } | HttpError::Transport { .. }
        )
    }
}
