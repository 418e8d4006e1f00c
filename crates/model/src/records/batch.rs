use crate::{
    core::value::Value,
    records::row::{Row, RowIndex},
    scoring::derived::DerivedOutput,
};
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

/// Rows read from a single source file, in file order.
#[derive(Debug, Clone)]
pub struct RecordBatch {
    pub source: PathBuf,
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl RecordBatch {
    pub fn new(source: impl Into<PathBuf>, columns: Vec<String>, rows: Vec<Row>) -> Self {
        RecordBatch {
            source: source.into(),
            columns,
            rows,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }
}

pub fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// The label column, split off the batch but still keyed by row index.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetColumn {
    pub name: String,
    pub values: Vec<(RowIndex, Value)>,
}

impl TargetColumn {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: RowIndex) -> Option<&Value> {
        self.values
            .iter()
            .find(|(i, _)| *i == index)
            .map(|(_, v)| v)
    }

    /// Compares predictions against the known labels. Returns how many
    /// outputs have a label and how many of those match the predicted class.
    pub fn agreement(&self, outputs: &[DerivedOutput]) -> (usize, usize) {
        let labels: HashMap<RowIndex, f64> = self
            .values
            .iter()
            .filter_map(|(i, v)| v.as_f64().filter(|l| !l.is_nan()).map(|l| (*i, l)))
            .collect();

        outputs
            .iter()
            .filter_map(|o| labels.get(&o.index).map(|l| *l == f64::from(o.predicted_class)))
            .fold((0, 0), |(labelled, matching), hit| {
                (labelled + 1, matching + usize::from(hit))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(index: usize, class: u8) -> DerivedOutput {
        DerivedOutput {
            index: RowIndex(index),
            prob_class0: 0.5,
            prob_class1: 0.5,
            selected_probability: 0.5,
            predicted_class: class,
        }
    }

    #[test]
    fn agreement_skips_unlabelled_rows() {
        let target = TargetColumn {
            name: "BAD".into(),
            values: vec![
                (RowIndex(0), Value::Int(1)),
                (RowIndex(1), Value::Null),
                (RowIndex(2), Value::Int(0)),
                (RowIndex(3), Value::Int(0)),
            ],
        };
        let outputs = [output(0, 1), output(1, 0), output(2, 1), output(3, 0)];

        assert_eq!(target.agreement(&outputs), (3, 2));
        assert_eq!(target.agreement(&[]), (0, 0));
    }
}
