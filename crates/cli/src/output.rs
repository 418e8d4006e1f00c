use crate::error::CliError;
use serde::Serialize;
use std::path::Path;

pub async fn emit<T: Serialize>(report: &T, path: Option<&Path>) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(report)?;
    match path {
        Some(path) => tokio::fs::write(path, json).await?,
        None => println!("{json}"),
    }
    Ok(())
}
