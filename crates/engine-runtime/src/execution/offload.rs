use crate::{
    error::RuntimeError,
    execution::summary::{OffloadSummary, RunOutcome, WrittenTable},
};
use chrono::{DateTime, Utc};
use connectors::file::csv::{source::CsvRecordSource, writer::read_audit_log};
use engine_config::settings::Settings;
use engine_core::{connectors::sink::LogSink, metrics::Metrics};
use engine_processing::{
    chunker::{LogChunker, TableNamer},
    writer::ChunkWriter,
};
use std::{
    num::NonZeroUsize,
    path::{Path, PathBuf},
    sync::Arc,
};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Moves the audit log into the sink, one table per chunk, and removes the
/// log file once every chunk is stored.
pub struct OffloadRun {
    source: CsvRecordSource,
    log_path: PathBuf,
    row_limit: Option<usize>,
    chunker: LogChunker,
    namer: TableNamer,
    writer: ChunkWriter,
    delete_log: bool,
    metrics: Metrics,
}

impl OffloadRun {
    /// `started_at` renders a pattern time label, so every table of one
    /// offload shares the same label.
    pub fn new(
        settings: &Settings,
        sink: Arc<dyn LogSink>,
        metrics: Metrics,
        started_at: DateTime<Utc>,
    ) -> Result<Self, RuntimeError> {
        settings.validate_for_offload(false)?;

        let table = &settings.table;
        let chunk_size = NonZeroUsize::new(table.chunk_size)
            .ok_or_else(|| RuntimeError::Initialization("chunk_size is zero".into()))?;
        let label = table.time_label.render(started_at)?;
        let source = CsvRecordSource::new(settings.data.delimiter)
            .map_err(|e| RuntimeError::Initialization(e.to_string()))?;

        Ok(Self {
            source,
            log_path: settings.data.log_path.clone(),
            row_limit: None,
            chunker: LogChunker::new(chunk_size),
            namer: TableNamer::new(table.prefix.clone(), label),
            writer: ChunkWriter::new(sink, settings.retry.to_policy(), metrics.clone()),
            delete_log: table.delete_log,
            metrics,
        })
    }

    /// Offloads only the first `limit` records of the log.
    pub fn with_row_limit(mut self, limit: Option<usize>) -> Self {
        self.row_limit = limit;
        self
    }

    pub fn keep_log(mut self) -> Self {
        self.delete_log = false;
        self
    }

    pub fn namer(&self) -> &TableNamer {
        &self.namer
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    pub async fn run(&self, cancel: &CancellationToken) -> Result<OffloadSummary, RuntimeError> {
        // One extra record tells whether the limit left anything behind.
        let mut log = read_audit_log(
            &self.source,
            &self.log_path,
            self.row_limit.map(|l| l.saturating_add(1)),
        )
        .map_err(RuntimeError::LogFile)?;
        let truncated = match self.row_limit {
            Some(limit) if log.len() > limit => {
                log.records.truncate(limit);
                true
            }
            _ => false,
        };

        let chunks = self.chunker.chunk(&log);
        info!(
            path = %self.log_path.display(),
            records = log.len(),
            chunks = chunks.len(),
            chunk_size = self.chunker.chunk_size().get(),
            "Starting log offload"
        );

        let mut tables = Vec::with_capacity(chunks.len());
        let mut outcome = RunOutcome::Completed;
        for chunk in &chunks {
            if cancel.is_cancelled() {
                warn!(
                    written = tables.len(),
                    remaining = chunks.len() - tables.len(),
                    "Shutdown requested, stopping before next chunk"
                );
                outcome = RunOutcome::Cancelled;
                break;
            }

            let table = self.namer.name(chunk.sequence);
            let result = self.writer.write(&table, chunk).await.map_err(|source| {
                error!(table = %table, error = %source, "Offload stopped, audit log kept");
                RuntimeError::Persistence {
                    table: table.clone(),
                    source,
                }
            })?;
            info!(
                table = %result.table,
                rows = result.rows_written,
                duration_ms = result.duration.as_millis() as u64,
                "Chunk stored"
            );
            tables.push(WrittenTable {
                name: result.table,
                rows: result.rows_written,
            });
        }

        let log_deleted = match outcome {
            RunOutcome::Completed if self.delete_log && !truncated => {
                tokio::fs::remove_file(&self.log_path)
                    .await
                    .map_err(|source| RuntimeError::LogCleanup {
                        path: self.log_path.clone(),
                        source,
                    })?;
                info!(path = %self.log_path.display(), "Audit log removed");
                true
            }
            RunOutcome::Completed if self.delete_log => {
                info!(
                    path = %self.log_path.display(),
                    "Row limit left records behind, keeping audit log"
                );
                false
            }
            _ => false,
        };

        Ok(OffloadSummary {
            outcome,
            records_read: log.len(),
            tables,
            log_deleted,
            metrics: self.metrics.snapshot(),
        })
    }
}
