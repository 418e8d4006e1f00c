use serde::Serialize;
use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

#[derive(Debug, Default)]
struct InnerMetrics {
    records_scored: AtomicU64,
    records_failed: AtomicU64,
    files_processed: AtomicU64,
    chunks_written: AtomicU64,
    rows_written: AtomicU64,
    retry_count: AtomicU64,
}

/// Run counters, shared by clone.
#[derive(Debug, Clone)]
pub struct Metrics {
    inner: Arc<InnerMetrics>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub records_scored: u64,
    pub records_failed: u64,
    pub files_processed: u64,
    pub chunks_written: u64,
    pub rows_written: u64,
    pub retry_count: u64,
}

impl Metrics {
    pub fn new() -> Self {
        Metrics {
            inner: Arc::new(InnerMetrics::default()),
        }
    }

    pub fn increment_scored(&self, count: u64) {
        self.inner.records_scored.fetch_add(count, Ordering::Relaxed);
    }

    pub fn increment_failed(&self, count: u64) {
        self.inner.records_failed.fetch_add(count, Ordering::Relaxed);
    }

    pub fn increment_files(&self, count: u64) {
        self.inner.files_processed.fetch_add(count, Ordering::Relaxed);
    }

    pub fn increment_chunks(&self, count: u64) {
        self.inner.chunks_written.fetch_add(count, Ordering::Relaxed);
    }

    pub fn increment_rows_written(&self, count: u64) {
        self.inner.rows_written.fetch_add(count, Ordering::Relaxed);
    }

    pub fn increment_retries(&self, count: u64) {
        self.inner.retry_count.fetch_add(count, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            records_scored: self.inner.records_scored.load(Ordering::Relaxed),
            records_failed: self.inner.records_failed.load(Ordering::Relaxed),
            files_processed: self.inner.files_processed.load(Ordering::Relaxed),
            chunks_written: self.inner.chunks_written.load(Ordering::Relaxed),
            rows_written: self.inner.rows_written.load(Ordering::Relaxed),
            retry_count: self.inner.retry_count.load(Ordering::Relaxed),
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_counters() {
        let metrics = Metrics::new();
        let other = metrics.clone();
        metrics.increment_scored(3);
        other.increment_scored(2);
        other.increment_retries(1);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.records_scored, 5);
        assert_eq!(snapshot.retry_count, 1);
        assert_eq!(snapshot.chunks_written, 0);
    }
}
