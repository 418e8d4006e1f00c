use crate::{
    error::CliError,
    shutdown::{ExitCode, ShutdownCoordinator},
};
use chrono::Utc;
use clap::Parser;
use commands::Commands;
use engine_config::settings::{Settings, env::EnvManager};
use engine_core::{
    connectors::{
        scorer::HttpScorer,
        sink::{LogSink, memory::MemorySink, postgres::PostgresSink},
    },
    metrics::Metrics,
};
use engine_processing::scorer::RetryingScorer;
use engine_runtime::execution::{
    offload::OffloadRun, scoring::ScoringRun, summary::RunOutcome,
};
use std::{path::Path, sync::Arc};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod commands;
mod error;
mod output;
mod shutdown;

#[derive(Parser, Debug)]
#[command(
    name = "scoreline",
    version,
    about = "Batch scoring client and audit-log offload"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let shutdown = ShutdownCoordinator::new(CancellationToken::new());
    shutdown.register_handlers();

    let code = match run(cli.command, &shutdown).await {
        Ok(code) => code,
        Err(err) => {
            error!(error = %err, "Command failed");
            eprintln!("error: {err}");
            ExitCode::GeneralError
        }
    };
    std::process::exit(code.as_i32());
}

async fn run(command: Commands, shutdown: &ShutdownCoordinator) -> Result<ExitCode, CliError> {
    let cancel = shutdown.cancel_token();

    match command {
        Commands::Score {
            config,
            env_file,
            rows,
            output,
        } => {
            let settings = load_settings(&config, env_file.as_deref())?;
            settings.validate()?;

            let metrics = Metrics::new();
            let http = HttpScorer::new(settings.model_endpoint.to_http_endpoint())?;
            info!(url = %http.url(), "Scoring against model endpoint");
            let scorer = RetryingScorer::new(http, settings.retry.to_policy(), metrics.clone());

            let summary = ScoringRun::new(&settings, Arc::new(scorer), metrics)?
                .with_row_limit(rows)
                .run(&cancel)
                .await?;
            output::emit(&summary, output.as_deref()).await?;
            Ok(exit_code(summary.outcome))
        }
        Commands::Offload {
            config,
            env_file,
            rows,
            keep_log,
            dry_run,
            output,
        } => {
            let settings = load_settings(&config, env_file.as_deref())?;
            settings.validate_for_offload(!dry_run)?;

            let sink: Arc<dyn LogSink> = if dry_run {
                info!("Dry run: chunks go to an in-memory store and the log is kept");
                Arc::new(MemorySink::new())
            } else {
                let endpoint = settings.db_endpoint()?.to_pg_endpoint()?;
                Arc::new(PostgresSink::connect(&endpoint).await?)
            };

            let mut offload = OffloadRun::new(&settings, sink, Metrics::new(), Utc::now())?
                .with_row_limit(rows);
            if keep_log || dry_run {
                offload = offload.keep_log();
            }

            let summary = offload.run(&cancel).await?;
            output::emit(&summary, output.as_deref()).await?;
            Ok(exit_code(summary.outcome))
        }
        Commands::CheckConfig { config, env_file } => {
            let settings = load_settings(&config, env_file.as_deref())?;
            settings.validate()?;
            settings.validate_for_offload(settings.db_endpoint.is_some())?;
            output::emit(&settings.redacted_json(), None).await?;
            Ok(ExitCode::Success)
        }
    }
}

/// Reads the config file, then applies overrides from the process
/// environment and the optional env file.
fn load_settings(config: &Path, env_file: Option<&Path>) -> Result<Settings, CliError> {
    let mut settings = Settings::load(config)?;
    let mut env = EnvManager::new();
    if let Some(path) = env_file {
        env.load_from_file(path)?;
    }
    env.apply_overrides(&mut settings)?;
    Ok(settings)
}

fn exit_code(outcome: RunOutcome) -> ExitCode {
    match outcome {
        RunOutcome::Completed => ExitCode::Success,
        RunOutcome::Cancelled => ExitCode::ShutdownRequested,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::path::PathBuf;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_offload_flags() {
        let cli = Cli::try_parse_from([
            "scoreline",
            "offload",
            "--config",
            "scoreline.toml",
            "--rows",
            "500",
            "--keep-log",
            "--dry-run",
        ])
        .unwrap();

        match cli.command {
            Commands::Offload {
                config,
                rows,
                keep_log,
                dry_run,
                env_file,
                ..
            } => {
                assert_eq!(config, PathBuf::from("scoreline.toml"));
                assert_eq!(rows, Some(500));
                assert!(keep_log && dry_run);
                assert!(env_file.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn cancelled_runs_exit_with_130() {
        assert_eq!(exit_code(RunOutcome::Cancelled).as_i32(), 130);
        assert_eq!(exit_code(RunOutcome::Completed).as_i32(), 0);
    }
}
