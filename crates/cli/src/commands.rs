use clap::Subcommand;
use std::path::PathBuf;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Score every file of the input directory and write the audit log
    Score {
        #[arg(long, help = "Config file path")]
        config: PathBuf,

        #[arg(long, help = "Optional .env file with overrides")]
        env_file: Option<PathBuf>,

        #[arg(long, help = "Rows read per input file, overriding data.row_limit")]
        rows: Option<usize>,

        #[arg(
            long,
            help = "If specified, writes the JSON run summary to this file instead of stdout"
        )]
        output: Option<PathBuf>,
    },
    /// Offload the audit log into the database, one table per chunk
    Offload {
        #[arg(long, help = "Config file path")]
        config: PathBuf,

        #[arg(long, help = "Optional .env file with overrides")]
        env_file: Option<PathBuf>,

        #[arg(long, help = "Offload only the first N records of the log")]
        rows: Option<usize>,

        #[arg(long, help = "Keep the log file after a successful offload")]
        keep_log: bool,

        #[arg(
            long,
            help = "Write chunks to an in-memory store and report the tables that would be created"
        )]
        dry_run: bool,

        #[arg(
            long,
            help = "If specified, writes the JSON offload summary to this file instead of stdout"
        )]
        output: Option<PathBuf>,
    },
    /// Validate the configuration and print it with secrets redacted
    CheckConfig {
        #[arg(long, help = "Config file path")]
        config: PathBuf,

        #[arg(long, help = "Optional .env file with overrides")]
        env_file: Option<PathBuf>,
    },
}
