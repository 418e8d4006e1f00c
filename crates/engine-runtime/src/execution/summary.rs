use engine_core::metrics::MetricsSnapshot;
use model::records::row::RowIndex;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunOutcome {
    Completed,
    Cancelled,
}

/// A file or record left out of the audit log under a skip policy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedItem {
    pub file: String,
    /// `None` when the whole file was skipped.
    pub index: Option<RowIndex>,
    pub error: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub outcome: RunOutcome,
    pub files_processed: usize,
    pub records_logged: usize,
    pub log_path: PathBuf,
    pub skipped: Vec<SkippedItem>,
    pub metrics: MetricsSnapshot,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WrittenTable {
    pub name: String,
    pub rows: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct OffloadSummary {
    pub outcome: RunOutcome,
    pub records_read: usize,
    pub tables: Vec<WrittenTable>,
    pub log_deleted: bool,
    pub metrics: MetricsSnapshot,
}
