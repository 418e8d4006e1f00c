use crate::settings::error::SettingsError;
use chrono::{
    DateTime, Utc,
    format::{Item, StrftimeItems},
};
use connectors::sql::postgres::config::{PgEndpoint, PgSslMode};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

const SUPPORTED_DRIVERS: [&str; 3] = ["postgres", "postgresql", "postgresql+psycopg2"];

/// Connection parameters of the relational store receiving the log chunks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DbEndpointSettings {
    #[serde(default = "default_driver")]
    pub driver: String,
    pub username: String,
    #[serde(default)]
    pub password: String,
    pub hostname: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub dbname: String,
    #[serde(default)]
    pub ssl_mode: SslModeSetting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SslModeSetting {
    Disable,
    #[default]
    Prefer,
    Require,
}

fn default_driver() -> String {
    "postgresql".to_string()
}

fn default_port() -> u16 {
    5432
}

impl DbEndpointSettings {
    pub fn check_driver(&self) -> Result<(), SettingsError> {
        if SUPPORTED_DRIVERS.contains(&self.driver.to_ascii_lowercase().as_str()) {
            Ok(())
        } else {
            Err(SettingsError::UnsupportedDriver(self.driver.clone()))
        }
    }

    pub fn to_pg_endpoint(&self) -> Result<PgEndpoint, SettingsError> {
        self.check_driver()?;
        Ok(PgEndpoint {
            host: self.hostname.clone(),
            port: self.port,
            user: self.username.clone(),
            password: self.password.clone(),
            dbname: self.dbname.clone(),
            ssl_mode: match self.ssl_mode {
                SslModeSetting::Disable => PgSslMode::Disable,
                SslModeSetting::Prefer => PgSslMode::Prefer,
                SslModeSetting::Require => PgSslMode::Require,
            },
        })
    }
}

/// Label appended to every chunk table name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeLabel {
    /// Used verbatim; reruns with the same label overwrite the same tables.
    Fixed(String),
    /// strftime pattern rendered from the run's start time.
    Pattern(String),
}

impl Default for TimeLabel {
    fn default() -> Self {
        TimeLabel::Pattern("%Y%m%d%H%M%S".to_string())
    }
}

impl TimeLabel {
    pub fn render(&self, started_at: DateTime<Utc>) -> Result<String, SettingsError> {
        match self {
            TimeLabel::Fixed(label) => Ok(label.clone()),
            TimeLabel::Pattern(pattern) => {
                let items = parse_pattern(pattern)?;
                let mut out = String::new();
                write!(out, "{}", started_at.format_with_items(items.into_iter()))
                    .map_err(|_| SettingsError::invalid("table.time_label", pattern.clone()))?;
                Ok(out)
            }
        }
    }
}

pub(crate) fn parse_pattern(pattern: &str) -> Result<Vec<Item<'_>>, SettingsError> {
    let items: Vec<Item<'_>> = StrftimeItems::new(pattern).collect();
    if items.iter().any(|i| matches!(i, Item::Error)) {
        return Err(SettingsError::invalid(
            "table.time_label",
            format!("invalid strftime pattern '{pattern}'"),
        ));
    }
    Ok(items)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TableSettings {
    #[serde(default = "default_prefix")]
    pub prefix: String,
    #[serde(default)]
    pub time_label: TimeLabel,
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    /// Remove the log file once every chunk has been written.
    #[serde(default = "default_delete_log")]
    pub delete_log: bool,
}

fn default_prefix() -> String {
    "perf".to_string()
}

fn default_chunk_size() -> usize {
    1000
}

fn default_delete_log() -> bool {
    true
}

impl Default for TableSettings {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            time_label: TimeLabel::default(),
            chunk_size: default_chunk_size(),
            delete_log: default_delete_log(),
        }
    }
}
