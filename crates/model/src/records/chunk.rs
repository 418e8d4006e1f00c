use crate::{core::value::Value, records::audit::AuditRecord};

/// A contiguous slice of the audit log, persisted as one table.
#[derive(Debug, Clone, PartialEq)]
pub struct LogChunk {
    /// 1-based position of the chunk within the log.
    pub sequence: usize,
    pub columns: Vec<String>,
    pub records: Vec<AuditRecord>,
}

impl LogChunk {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn cells(&self) -> Vec<Vec<Value>> {
        self.records
            .iter()
            .map(|r| r.cells(&self.columns))
            .collect()
    }
}
