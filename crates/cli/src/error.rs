use engine_config::settings::error::SettingsError;
use engine_core::error::{ScoringError, SinkError};
use engine_runtime::error::RuntimeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Settings(#[from] SettingsError),

    #[error("Failed to run: {0}")]
    Runner(#[from] RuntimeError),

    #[error("Failed to set up the scoring client: {0}")]
    Scoring(#[from] ScoringError),

    #[error("Failed to open the sink: {0}")]
    Sink(#[from] SinkError),

    #[error("Failed to serialize data to JSON: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    #[error("Failed to write output: {0}")]
    Io(#[from] std::io::Error),
}
