use crate::settings::{
    data::DataSettings, endpoint::EndpointSettings, error::SettingsError, retry::RetrySettings,
    scoring::ScoringSettings, sink::DbEndpointSettings, sink::TableSettings,
    variables::VariableSchema,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

pub mod data;
pub mod endpoint;
pub mod env;
pub mod error;
pub mod retry;
pub mod scoring;
pub mod sink;
pub mod validator;
pub mod variables;

/// Complete configuration of a scoring run and of the log offload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    pub model_endpoint: EndpointSettings,
    pub variables: VariableSchema,
    pub data: DataSettings,
    #[serde(default)]
    pub scoring: ScoringSettings,
    #[serde(default)]
    pub retry: RetrySettings,
    #[serde(default)]
    pub db_endpoint: Option<DbEndpointSettings>,
    #[serde(default)]
    pub table: TableSettings,
}

impl Settings {
    pub fn from_toml_str(source: &str) -> Result<Self, SettingsError> {
        Ok(toml::from_str(source)?)
    }

    /// Reads and parses a TOML settings file. Validation is left to the caller
    /// so overrides can be applied first.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        info!(path = %path.display(), "Loading settings");
        let source = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    pub fn db_endpoint(&self) -> Result<&DbEndpointSettings, SettingsError> {
        self.db_endpoint
            .as_ref()
            .ok_or(SettingsError::MissingSection("db_endpoint"))
    }

    /// JSON rendering with credential values masked.
    pub fn redacted_json(&self) -> serde_json::Value {
        let mut value = serde_json::to_value(self).unwrap_or(serde_json::Value::Null);
        redact(&mut value);
        value
    }
}

fn redact(value: &mut serde_json::Value) {
    match value {
        serde_json::Value::Object(map) => {
            for (key, v) in map.iter_mut() {
                if env::is_sensitive_key(key) && v.is_string() {
                    *v = serde_json::Value::String("********".to_string());
                } else {
                    redact(v);
                }
            }
        }
        serde_json::Value::Array(items) => items.iter_mut().for_each(redact),
        _ => {}
    }
}
