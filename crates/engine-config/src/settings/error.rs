use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading, overriding or validating settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to read settings file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse settings: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid setting '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("Missing settings section: [{0}]")]
    MissingSection(&'static str),

    #[error("Unsupported database driver: {0}")]
    UnsupportedDriver(String),

    #[error("Invalid value for environment override {key}: {value}")]
    InvalidOverride { key: String, value: String },

    #[error("Invalid env file: {0}")]
    EnvFile(String),
}

impl SettingsError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        SettingsError::Invalid {
            field,
            reason: reason.into(),
        }
    }
}
