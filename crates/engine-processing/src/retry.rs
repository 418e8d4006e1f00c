use connectors::sql::base::error::{ConnectorError, DbError};
use engine_core::{
    error::{ScoringError, SinkError},
    retry::RetryDisposition,
};
use tokio_postgres::{Error as PgError, error::SqlState};

/// Only failures that may never have reached the service are retried; a
/// reply we could not use would come back the same way.
pub fn classify_scoring_error(err: &ScoringError) -> RetryDisposition {
    match err {
        ScoringError::Transport(_) => RetryDisposition::Retry,
        ScoringError::Protocol(_) => RetryDisposition::Stop,
    }
}

pub fn classify_sink_error(err: &SinkError) -> RetryDisposition {
    match err {
        SinkError::Closed => RetryDisposition::Retry,
        SinkError::Db(db_err) => classify_db_error(db_err),
        SinkError::Connector(conn_err) => classify_connector_error(conn_err),
        SinkError::Other(_) => RetryDisposition::Stop,
    }
}

pub fn classify_db_error(err: &DbError) -> RetryDisposition {
    match err {
        DbError::Io(_) => RetryDisposition::Retry,
        DbError::Postgres(pg_err) => classify_pg_error(pg_err),
        DbError::Write(_) => RetryDisposition::Stop,
        DbError::Unknown(_) => RetryDisposition::Stop,
    }
}

fn classify_connector_error(err: &ConnectorError) -> RetryDisposition {
    match err {
        ConnectorError::Connection(pg_err) => classify_pg_error(pg_err),
        ConnectorError::InvalidUrl(_) => RetryDisposition::Stop,
        ConnectorError::TlsConfig(_) => RetryDisposition::Retry,
    }
}

fn classify_pg_error(err: &PgError) -> RetryDisposition {
    if err.is_closed() {
        return RetryDisposition::Retry;
    }

    if let Some(code) = err.code()
        && is_retryable_pg_code(code)
    {
        return RetryDisposition::Retry;
    }

    RetryDisposition::Stop
}

fn is_retryable_pg_code(code: &SqlState) -> bool {
    matches!(
        *code,
        SqlState::T_R_SERIALIZATION_FAILURE
            | SqlState::T_R_DEADLOCK_DETECTED
            | SqlState::LOCK_NOT_AVAILABLE
            | SqlState::TOO_MANY_CONNECTIONS
            | SqlState::ADMIN_SHUTDOWN
            | SqlState::CRASH_SHUTDOWN
            | SqlState::CANNOT_CONNECT_NOW
            | SqlState::CONNECTION_FAILURE
            | SqlState::CONNECTION_DOES_NOT_EXIST
            | SqlState::SQLCLIENT_UNABLE_TO_ESTABLISH_SQLCONNECTION
            | SqlState::CONNECTION_EXCEPTION
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine_core::error::ProtocolError;

    #[test]
    fn transport_is_retried_protocol_is_not() {
        assert_eq!(
            classify_scoring_error(&ScoringError::Transport("reset".into())),
            RetryDisposition::Retry
        );
        assert_eq!(
            classify_scoring_error(&ScoringError::Protocol(ProtocolError::MissingResults)),
            RetryDisposition::Stop
        );
    }

    #[test]
    fn sink_errors_split_by_cause() {
        assert_eq!(classify_sink_error(&SinkError::Closed), RetryDisposition::Retry);
        assert_eq!(
            classify_sink_error(&SinkError::Other("rejected".into())),
            RetryDisposition::Stop
        );
        assert_eq!(
            classify_sink_error(&SinkError::Db(DbError::Write("ragged".into()))),
            RetryDisposition::Stop
        );
        assert_eq!(
            classify_sink_error(&SinkError::Connector(ConnectorError::InvalidUrl("".into()))),
            RetryDisposition::Stop
        );
    }
}
