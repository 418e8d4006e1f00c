use connectors::http::client::HttpEndpoint;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Location of the deployed model's scoring endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EndpointSettings {
    #[serde(default = "default_schema")]
    pub schema: String,
    pub host: String,
    pub port: u16,
    pub path: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Key of the array that wraps the predictor maps in a request body.
    #[serde(default = "default_envelope_key")]
    pub envelope_key: String,
}

fn default_schema() -> String {
    "http".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_envelope_key() -> String {
    "examples".to_string()
}

impl EndpointSettings {
    pub fn url(&self) -> String {
        format!(
            "{}://{}:{}/{}",
            self.schema,
            self.host,
            self.port,
            self.path.trim_start_matches('/')
        )
    }

    pub fn to_http_endpoint(&self) -> HttpEndpoint {
        HttpEndpoint {
            url: self.url(),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}
