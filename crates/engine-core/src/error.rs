use connectors::{
    http::error::HttpError,
    sql::base::error::{ConnectorError, DbError},
};
use model::records::row::RowIndex;
use thiserror::Error;

/// The scoring service answered, but not with something we can use.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProtocolError {
    #[error("Service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Response body is not valid JSON: {0}")]
    InvalidBody(String),

    #[error("Response has no `results` array")]
    MissingResults,

    #[error("Response carries {actual} results for {expected} examples")]
    ResultCount { expected: usize, actual: usize },

    #[error("Malformed result for row {index}: {reason}")]
    MalformedResult { index: RowIndex, reason: String },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScoringError {
    /// The request may not have reached the service; safe to retry.
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

impl ScoringError {
    pub fn is_transport(&self) -> bool {
        matches!(self, ScoringError::Transport(_))
    }
}

impl From<HttpError> for ScoringError {
    fn from(err: HttpError) -> Self {
        match err {
            HttpError::Status { status, body } => {
                ScoringError::Protocol(ProtocolError::Status { status, body })
            }
            HttpError::InvalidBody(reason) => {
                ScoringError::Protocol(ProtocolError::InvalidBody(reason))
            }
            other => ScoringError::Transport(other.to_string()),
        }
    }
}

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("Database error: {0}")]
    Db(#[from] DbError),

    #[error("Connection error: {0}")]
    Connector(#[from] ConnectorError),

    #[error("Sink connection closed")]
    Closed,

    #[error("Sink error: {0}")]
    Other(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_errors_split_into_transport_and_protocol() {
        let refused: ScoringError = HttpError::Connect {
            url: "http://localhost:1/score".into(),
            message: "connection refused".into(),
        }
        .into();
        assert!(refused.is_transport());

        let status: ScoringError = HttpError::Status {
            status: 500,
            body: "boom".into(),
        }
        .into();
        assert_eq!(
            status,
            ScoringError::Protocol(ProtocolError::Status {
                status: 500,
                body: "boom".into()
            })
        );

        let body: ScoringError = HttpError::InvalidBody("eof".into()).into();
        assert!(!body.is_transport());
    }
}
