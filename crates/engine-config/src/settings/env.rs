use crate::settings::{Settings, error::SettingsError};
use std::{collections::HashMap, fs, path::Path};
use tracing::{debug, info};

pub const ENV_DB_USERNAME: &str = "SCORELINE_DB_USERNAME";
pub const ENV_DB_PASSWORD: &str = "SCORELINE_DB_PASSWORD";
pub const ENV_DB_HOSTNAME: &str = "SCORELINE_DB_HOSTNAME";
pub const ENV_DB_PORT: &str = "SCORELINE_DB_PORT";
pub const ENV_MODEL_HOST: &str = "SCORELINE_MODEL_HOST";
pub const ENV_MODEL_PORT: &str = "SCORELINE_MODEL_PORT";

const SENSITIVE_PATTERNS: [&str; 6] = [
    "password",
    "passwd",
    "secret",
    "token",
    "credential",
    "api_key",
];

/// Environment variable manager that loads from the process and `.env` files.
#[derive(Debug, Clone, Default)]
pub struct EnvManager {
    vars: HashMap<String, String>,
}

impl EnvManager {
    pub fn new() -> Self {
        Self {
            vars: std::env::vars().collect(),
        }
    }

    pub fn from_vars(vars: HashMap<String, String>) -> Self {
        Self { vars }
    }

    /// Load variables from a .env file. File entries win over the process.
    pub fn load_from_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), SettingsError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        self.parse_env_content(&content)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// Applies the `SCORELINE_*` overrides on top of file settings.
    pub fn apply_overrides(&self, settings: &mut Settings) -> Result<(), SettingsError> {
        if let Some(host) = self.get(ENV_MODEL_HOST) {
            info!(key = ENV_MODEL_HOST, "Overriding model endpoint host");
            settings.model_endpoint.host = host.to_string();
        }
        if let Some(port) = self.get(ENV_MODEL_PORT) {
            settings.model_endpoint.port = parse_port(ENV_MODEL_PORT, port)?;
        }

        let db_keys = [ENV_DB_USERNAME, ENV_DB_PASSWORD, ENV_DB_HOSTNAME, ENV_DB_PORT];
        let Some(db) = settings.db_endpoint.as_mut() else {
            if db_keys.iter().any(|k| self.vars.contains_key(*k)) {
                debug!("Database overrides present but no [db_endpoint] section; ignoring");
            }
            return Ok(());
        };

        if let Some(username) = self.get(ENV_DB_USERNAME) {
            db.username = username.to_string();
        }
        if let Some(password) = self.get(ENV_DB_PASSWORD) {
            info!(key = ENV_DB_PASSWORD, "Overriding database password");
            db.password = password.to_string();
        }
        if let Some(hostname) = self.get(ENV_DB_HOSTNAME) {
            db.hostname = hostname.to_string();
        }
        if let Some(port) = self.get(ENV_DB_PORT) {
            db.port = parse_port(ENV_DB_PORT, port)?;
        }
        Ok(())
    }

    fn parse_env_content(&mut self, content: &str) -> Result<(), SettingsError> {
        for (line_num, line) in content.lines().enumerate() {
            let line = line.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                return Err(SettingsError::EnvFile(format!(
                    "malformed line {} (expected KEY=VALUE)",
                    line_num + 1
                )));
            };

            let key = key.trim().trim_start_matches("export ").trim();
            if key.is_empty() {
                return Err(SettingsError::EnvFile(format!(
                    "empty key at line {}",
                    line_num + 1
                )));
            }

            self.vars
                .insert(key.to_string(), Self::unquote_value(value));
        }

        Ok(())
    }

    fn unquote_value(value: &str) -> String {
        let value = value.trim();

        for quote in ['"', '\''] {
            if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
                return value[1..value.len() - 1].to_string();
            }
        }

        value.to_string()
    }
}

fn parse_port(key: &str, value: &str) -> Result<u16, SettingsError> {
    value
        .trim()
        .parse::<u16>()
        .map_err(|_| SettingsError::InvalidOverride {
            key: key.to_string(),
            value: value.to_string(),
        })
}

/// True for keys whose values must not be printed.
pub fn is_sensitive_key(key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    SENSITIVE_PATTERNS.iter().any(|p| key.contains(p))
}
