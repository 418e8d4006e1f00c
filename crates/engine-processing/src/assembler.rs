use crate::error::AssemblyError;
use model::{
    core::value::FieldValue,
    records::{audit::AuditRecord, row::Row, row::RowIndex},
    scoring::derived::{DerivedOutput, OutputNames},
};
use std::collections::HashMap;
use tracing::{debug, info};
use uuid::Uuid;

/// Joins a file's rows with their derived outputs on row index.
#[derive(Debug, Clone)]
pub struct AuditLogAssembler {
    names: OutputNames,
}

impl AuditLogAssembler {
    pub fn new(names: OutputNames) -> Self {
        Self { names }
    }

    /// Inner join in row order. Rows without an output and outputs without
    /// a row are left out.
    pub fn assemble(
        &self,
        source: &str,
        rows: &[Row],
        outputs: &[DerivedOutput],
    ) -> Result<Vec<AuditRecord>, AssemblyError> {
        if let Some(column) = rows
            .iter()
            .flat_map(|r| r.columns())
            .find(|c| self.names.contains(c))
        {
            return Err(AssemblyError::OutputCollision(column.to_string()));
        }

        let mut by_index: HashMap<RowIndex, &DerivedOutput> =
            HashMap::with_capacity(outputs.len());
        for output in outputs {
            if by_index.insert(output.index, output).is_some() {
                return Err(AssemblyError::DuplicateIndex(output.index));
            }
        }

        let records: Vec<AuditRecord> = rows
            .iter()
            .filter_map(|row| {
                let output = by_index.get(&row.index)?;
                Some(self.record(source, row, output))
            })
            .collect();

        let dropped_rows = rows.len() - records.len();
        let dropped_outputs = outputs.len() - records.len();
        if dropped_rows > 0 || dropped_outputs > 0 {
            debug!(
                file = source,
                dropped_rows,
                dropped_outputs,
                "Unmatched rows left out of the audit log"
            );
        }

        Ok(records)
    }

    fn record(&self, source: &str, row: &Row, output: &DerivedOutput) -> AuditRecord {
        info!(
            request_id = %Uuid::new_v4(),
            file = source,
            index = %row.index,
            class = output.predicted_class,
            probability = round3(output.selected_probability),
            "Record scored"
        );

        let mut fields = Vec::with_capacity(row.fields.len() + 4);
        fields.extend(row.fields.iter().cloned());
        fields.extend(
            self.names
                .as_array()
                .into_iter()
                .zip(output.values())
                .map(|(name, value)| FieldValue::new(name, value)),
        );

        AuditRecord {
            source: source.to_string(),
            index: row.index,
            fields,
        }
    }
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
