use crate::{
    core::value::{FieldValue, Value},
    records::row::RowIndex,
};
use serde::Serialize;

/// An input row merged with its derived outputs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditRecord {
    pub source: String,
    pub index: RowIndex,
    pub fields: Vec<FieldValue>,
}

impl AuditRecord {
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|f| f.name == column)
            .map(|f| &f.value)
    }

    /// Values aligned to `columns`; absent columns read as null.
    pub fn cells(&self, columns: &[String]) -> Vec<Value> {
        columns
            .iter()
            .map(|c| self.get(c).cloned().unwrap_or(Value::Null))
            .collect()
    }
}

/// Audit records accumulated over a run, in scoring order.
///
/// `columns` is the union of every record's columns in first-seen order, so
/// files with differing layouts still produce a rectangular log.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AuditLog {
    pub columns: Vec<String>,
    pub records: Vec<AuditRecord>,
}

impl AuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn push(&mut self, record: AuditRecord) {
        for field in &record.fields {
            if !self.columns.iter().any(|c| *c == field.name) {
                self.columns.push(field.name.clone());
            }
        }
        self.records.push(record);
    }

    pub fn extend(&mut self, records: impl IntoIterator<Item = AuditRecord>) {
        for record in records {
            self.push(record);
        }
    }

    /// Rectangular view of the log, one row of cells per record.
    pub fn cells(&self) -> Vec<Vec<Value>> {
        self.records
            .iter()
            .map(|r| r.cells(&self.columns))
            .collect()
    }
}
