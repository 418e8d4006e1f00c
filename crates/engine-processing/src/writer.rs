use crate::retry::classify_sink_error;
use engine_core::{
    connectors::sink::LogSink,
    error::SinkError,
    metrics::Metrics,
    retry::{RetryError, RetryPolicy},
};
use model::records::chunk::LogChunk;
use std::{sync::Arc, time::Instant};
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct WriteResult {
    pub table: String,
    pub rows_written: u64,
    pub duration: std::time::Duration,
}

/// Writes log chunks to the sink under the retry policy.
#[derive(Clone)]
pub struct ChunkWriter {
    sink: Arc<dyn LogSink>,
    retry: RetryPolicy,
    metrics: Metrics,
}

impl ChunkWriter {
    pub fn new(sink: Arc<dyn LogSink>, retry: RetryPolicy, metrics: Metrics) -> Self {
        Self {
            sink,
            retry,
            metrics,
        }
    }

    pub async fn write(&self, table: &str, chunk: &LogChunk) -> Result<WriteResult, SinkError> {
        let start = Instant::now();

        info!(
            table,
            sequence = chunk.sequence,
            row_count = chunk.len(),
            "Writing log chunk"
        );

        let rows_written = self
            .retry
            .run_observed(
                || self.sink.replace_table(table, chunk),
                classify_sink_error,
                |attempt, err, delay| {
                    self.metrics.increment_retries(1);
                    warn!(
                        table,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "Chunk write failed, retrying"
                    );
                },
            )
            .await
            .map_err(RetryError::into_inner)?;

        self.metrics.increment_chunks(1);
        self.metrics.increment_rows_written(rows_written);

        Ok(WriteResult {
            table: table.to_string(),
            rows_written,
            duration: start.elapsed(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine_core::connectors::sink::memory::{MemorySink, SinkFault};
    use model::{
        core::value::FieldValue,
        records::{audit::AuditRecord, row::RowIndex},
    };
    use std::time::Duration;

    fn chunk() -> LogChunk {
        LogChunk {
            sequence: 1,
            columns: vec!["LOAN".into()],
            records: vec![AuditRecord {
                source: "perf.csv".into(),
                index: RowIndex(0),
                fields: vec![FieldValue::new("LOAN", 1100)],
            }],
        }
    }

    fn writer(sink: &MemorySink, attempts: usize, metrics: Metrics) -> ChunkWriter {
        ChunkWriter::new(
            Arc::new(sink.clone()),
            RetryPolicy::new(attempts, Duration::ZERO, Duration::ZERO),
            metrics,
        )
    }

    #[tokio::test]
    async fn transient_failure_is_retried() {
        let sink = MemorySink::new();
        sink.fail_attempt(1, SinkFault::Transient).await;
        let metrics = Metrics::new();

        let result = writer(&sink, 2, metrics.clone())
            .write("perf_1_x1", &chunk())
            .await
            .unwrap();

        assert_eq!(result.rows_written, 1);
        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.retry_count, 1);
        assert_eq!(snapshot.chunks_written, 1);
        assert_eq!(snapshot.rows_written, 1);
    }

    #[tokio::test]
    async fn permanent_failure_stops() {
        let sink = MemorySink::new();
        sink.fail_attempt(1, SinkFault::Permanent).await;
        let metrics = Metrics::new();

        let err = writer(&sink, 5, metrics.clone())
            .write("perf_1_x1", &chunk())
            .await
            .unwrap_err();

        assert!(matches!(err, SinkError::Other(_)));
        assert_eq!(sink.attempts().await, 1);
        assert_eq!(metrics.snapshot().chunks_written, 0);
    }
}
