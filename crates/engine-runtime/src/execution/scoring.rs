use crate::{
    error::RuntimeError,
    execution::summary::{RunOutcome, RunSummary, SkippedItem},
};
use connectors::file::csv::{
    error::FileError,
    source::{CsvRecordSource, split_target_predictors},
    writer::write_audit_log,
};
use engine_config::settings::{Settings, scoring::FailurePolicy};
use engine_core::{connectors::scorer::Scorer, error::ScoringError, metrics::Metrics};
use engine_processing::{
    assembler::AuditLogAssembler, decoder::ResponseDecoder, encoder::RequestEncoder,
};
use futures::future::join_all;
use model::{
    records::{
        audit::{AuditLog, AuditRecord},
        batch::file_label,
        row::{Row, RowIndex},
    },
    scoring::payload::ScoreRequestPayload,
};
use std::{
    num::NonZeroUsize,
    path::{Path, PathBuf},
    sync::Arc,
};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Scores every file of the input directory and writes one audit log.
pub struct ScoringRun {
    source: CsvRecordSource,
    input_dir: PathBuf,
    log_path: PathBuf,
    row_limit: Option<usize>,
    target: String,
    inputs: Vec<String>,
    encoder: RequestEncoder,
    decoder: ResponseDecoder,
    assembler: AuditLogAssembler,
    scorer: Arc<dyn Scorer>,
    failure_policy: FailurePolicy,
    records_per_request: NonZeroUsize,
    max_in_flight: NonZeroUsize,
    metrics: Metrics,
}

struct ScoredFile {
    records: Vec<AuditRecord>,
    cancelled: bool,
}

impl ScoringRun {
    pub fn new(
        settings: &Settings,
        scorer: Arc<dyn Scorer>,
        metrics: Metrics,
    ) -> Result<Self, RuntimeError> {
        settings.validate()?;

        let source = CsvRecordSource::new(settings.data.delimiter)
            .map_err(|e| RuntimeError::Initialization(e.to_string()))?;
        let records_per_request = NonZeroUsize::new(settings.scoring.records_per_request)
            .ok_or_else(|| RuntimeError::Initialization("records_per_request is zero".into()))?;
        let max_in_flight = NonZeroUsize::new(settings.scoring.max_in_flight)
            .ok_or_else(|| RuntimeError::Initialization("max_in_flight is zero".into()))?;

        Ok(Self {
            source,
            input_dir: settings.data.input_dir.clone(),
            log_path: settings.data.log_path.clone(),
            row_limit: settings.data.row_limit,
            target: settings.variables.target.clone(),
            inputs: settings.variables.inputs.clone(),
            encoder: RequestEncoder::new(settings.model_endpoint.envelope_key.clone()),
            decoder: ResponseDecoder::new(
                settings.scoring.probability_slot,
                settings.scoring.decision_rule,
            ),
            assembler: AuditLogAssembler::new(settings.variables.output_names()?),
            scorer,
            failure_policy: settings.scoring.failure_policy,
            records_per_request,
            max_in_flight,
            metrics,
        })
    }

    /// Overrides the configured per-file row limit when `limit` is set.
    pub fn with_row_limit(mut self, limit: Option<usize>) -> Self {
        if limit.is_some() {
            self.row_limit = limit;
        }
        self
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    /// Runs until every file is scored, the token is cancelled, or a
    /// failure aborts the run. The audit log is written in all three cases.
    pub async fn run(&self, cancel: &CancellationToken) -> Result<RunSummary, RuntimeError> {
        let files = self
            .source
            .list_data_files(&self.input_dir)
            .map_err(|source| RuntimeError::DataAccess {
                file: self.input_dir.display().to_string(),
                source,
            })?;

        info!(
            dir = %self.input_dir.display(),
            files = files.len(),
            policy = ?self.failure_policy,
            "Starting scoring run"
        );

        let mut log = AuditLog::new();
        let mut skipped = Vec::new();
        let mut files_processed = 0;
        let mut outcome = RunOutcome::Completed;

        for (idx, path) in files.iter().enumerate() {
            if cancel.is_cancelled() {
                warn!(
                    remaining_files = files.len() - idx,
                    "Shutdown requested, stopping before next file"
                );
                outcome = RunOutcome::Cancelled;
                break;
            }

            let file = file_label(path);
            info!(file = %file, "Processing file {}/{}", idx + 1, files.len());

            match self.score_file(path, &file, cancel, &mut skipped).await {
                Ok(scored) => {
                    log.extend(scored.records);
                    files_processed += 1;
                    self.metrics.increment_files(1);
                    if scored.cancelled {
                        outcome = RunOutcome::Cancelled;
                        break;
                    }
                }
                Err(err) if self.failure_policy != FailurePolicy::AbortRun => {
                    warn!(file = %file, error = %err, "Skipping file");
                    skipped.push(SkippedItem {
                        file,
                        index: None,
                        error: err.to_string(),
                    });
                }
                Err(err) => {
                    error!(file = %file, error = %err, "Scoring run aborted");
                    if let Err(write_err) = self.flush_partial(&log) {
                        error!(error = %write_err, "Failed to flush partial audit log");
                    }
                    return Err(err);
                }
            }
        }

        match outcome {
            RunOutcome::Completed => self.write_log(&log),
            RunOutcome::Cancelled => self.flush_partial(&log),
        }
        .map_err(RuntimeError::LogFile)?;

        let summary = RunSummary {
            outcome,
            files_processed,
            records_logged: log.len(),
            log_path: self.log_path.clone(),
            skipped,
            metrics: self.metrics.snapshot(),
        };
        info!(
            outcome = ?summary.outcome,
            files = summary.files_processed,
            records = summary.records_logged,
            skipped = summary.skipped.len(),
            "Scoring run finished"
        );
        Ok(summary)
    }

    async fn score_file(
        &self,
        path: &Path,
        file: &str,
        cancel: &CancellationToken,
        skipped: &mut Vec<SkippedItem>,
    ) -> Result<ScoredFile, RuntimeError> {
        let data_err = |source: FileError| RuntimeError::DataAccess {
            file: file.to_string(),
            source,
        };
        let batch = self.source.read_batch(path, self.row_limit).map_err(data_err)?;
        let (target, predictors) =
            split_target_predictors(&batch, &self.target, &self.inputs).map_err(data_err)?;

        let payloads = self.encode(file, &predictors, skipped)?;

        let mut outputs = Vec::with_capacity(predictors.len());
        let mut cancelled = false;
        for (window_idx, window) in payloads.chunks(self.max_in_flight.get()).enumerate() {
            if cancel.is_cancelled() {
                warn!(
                    file,
                    remaining_requests = payloads.len() - window_idx * self.max_in_flight.get(),
                    "Shutdown requested, stopping before next request"
                );
                cancelled = true;
                break;
            }

            let replies = join_all(window.iter().map(|p| self.scorer.score(p))).await;
            for (payload, reply) in window.iter().zip(replies) {
                match reply {
                    Ok(entries) => {
                        for entry in &entries {
                            match self.decoder.decode(entry) {
                                Ok(output) => outputs.push(output),
                                Err(err) => self.record_failure(
                                    file,
                                    &[entry.index],
                                    err.into(),
                                    skipped,
                                )?,
                            }
                        }
                    }
                    Err(err) => self.record_failure(file, &payload.indices, err, skipped)?,
                }
            }
        }

        self.metrics.increment_scored(outputs.len() as u64);
        let records = self
            .assembler
            .assemble(file, &batch.rows, &outputs)
            .map_err(|source| RuntimeError::Assembly {
                file: file.to_string(),
                source,
            })?;

        let (labelled, matching) = target.agreement(&outputs);
        info!(
            file,
            rows = batch.len(),
            scored = records.len(),
            labelled,
            matching,
            "File scored"
        );
        Ok(ScoredFile { records, cancelled })
    }

    /// Encodes the file's rows. Under `skip-record` rows that cannot be
    /// encoded are left out; otherwise the first bad row fails the file.
    fn encode(
        &self,
        file: &str,
        rows: &[Row],
        skipped: &mut Vec<SkippedItem>,
    ) -> Result<Vec<ScoreRequestPayload>, RuntimeError> {
        let encoding_err = |source| RuntimeError::Encoding {
            file: file.to_string(),
            source,
        };

        if self.failure_policy != FailurePolicy::SkipRecord {
            return self
                .encoder
                .encode_batch(rows, self.records_per_request)
                .map_err(encoding_err);
        }

        let (payloads, rejected) = self
            .encoder
            .encode_batch_lenient(rows, self.records_per_request);
        for (index, err) in rejected {
            warn!(file, index = index.0, error = %err, "Skipping record that cannot be encoded");
            self.metrics.increment_failed(1);
            skipped.push(SkippedItem {
                file: file.to_string(),
                index: Some(index),
                error: err.to_string(),
            });
        }
        Ok(payloads)
    }

    fn record_failure(
        &self,
        file: &str,
        indices: &[RowIndex],
        err: ScoringError,
        skipped: &mut Vec<SkippedItem>,
    ) -> Result<(), RuntimeError> {
        if self.failure_policy != FailurePolicy::SkipRecord {
            return Err(RuntimeError::Scoring {
                file: file.to_string(),
                index: indices.first().copied(),
                source: err,
            });
        }

        warn!(
            file,
            first_index = ?indices.first().map(|i| i.0),
            records = indices.len(),
            error = %err,
            "Skipping records that failed to score"
        );
        self.metrics.increment_failed(indices.len() as u64);
        let error = err.to_string();
        skipped.extend(indices.iter().map(|&index| SkippedItem {
            file: file.to_string(),
            index: Some(index),
            error: error.clone(),
        }));
        Ok(())
    }

    /// Writes what an interrupted run scored. With nothing scored the log file
    /// is left as it is, so a log still waiting for offload survives.
    fn flush_partial(&self, log: &AuditLog) -> Result<(), FileError> {
        if log.is_empty() {
            info!(path = %self.log_path.display(), "Nothing scored, audit log left untouched");
            return Ok(());
        }
        self.write_log(log)
    }

    fn write_log(&self, log: &AuditLog) -> Result<(), FileError> {
        write_audit_log(&self.log_path, log, self.source.delimiter())
    }
}
