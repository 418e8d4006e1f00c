use connectors::file::csv::error::FileError;
use engine_config::settings::error::SettingsError;
use engine_core::error::{ScoringError, SinkError};
use engine_processing::error::{AssemblyError, EncodingError};
use model::records::row::RowIndex;
use std::path::PathBuf;
use thiserror::Error;

/// Top-level errors of a scoring run or a log offload.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    #[error("Initialization error: {0}")]
    Initialization(String),

    #[error("Data access failed for {file}: {source}")]
    DataAccess {
        file: String,
        #[source]
        source: FileError,
    },

    #[error("Encoding failed for {file}: {source}")]
    Encoding {
        file: String,
        #[source]
        source: EncodingError,
    },

    #[error("Scoring failed for {file}{}: {source}", fmt_index(.index))]
    Scoring {
        file: String,
        index: Option<RowIndex>,
        #[source]
        source: ScoringError,
    },

    #[error("Assembling audit records failed for {file}: {source}")]
    Assembly {
        file: String,
        #[source]
        source: AssemblyError,
    },

    #[error("Audit log error: {0}")]
    LogFile(#[source] FileError),

    #[error("Failed to remove audit log {}: {source}", .path.display())]
    LogCleanup {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Persisting table {table} failed: {source}")]
    Persistence {
        table: String,
        #[source]
        source: SinkError,
    },
}

fn fmt_index(index: &Option<RowIndex>) -> String {
    index.map(|i| format!(" (row {i})")).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scoring_error_names_file_and_row() {
        let err = RuntimeError::Scoring {
            file: "perf_2.csv".into(),
            index: Some(RowIndex(14)),
            source: ScoringError::Transport("connection refused".into()),
        };
        assert_eq!(
            err.to_string(),
            "Scoring failed for perf_2.csv (row 14): Transport error: connection refused"
        );

        let err = RuntimeError::Scoring {
            file: "perf_2.csv".into(),
            index: None,
            source: ScoringError::Transport("reset".into()),
        };
        assert!(err.to_string().starts_with("Scoring failed for perf_2.csv: "));
    }
}
