use crate::core::value::{FieldValue, Value};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Positional index of a row within its source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RowIndex(pub usize);

impl fmt::Display for RowIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub index: RowIndex,
    pub fields: Vec<FieldValue>,
}

impl Row {
    pub fn new(index: usize, fields: Vec<FieldValue>) -> Self {
        Row {
            index: RowIndex(index),
            fields,
        }
    }

    pub fn get(&self, column: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|f| f.name == column)
    }

    pub fn get_value(&self, column: &str) -> Value {
        self.get(column)
            .map(|f| f.value.clone())
            .unwrap_or(Value::Null)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Projects the row onto `columns`, in that order, keeping the index.
    /// Returns the first column that the row does not carry.
    pub fn project(&self, columns: &[String]) -> Result<Row, String> {
        let mut fields = Vec::with_capacity(columns.len());
        for column in columns {
            let field = self.get(column).ok_or_else(|| column.clone())?;
            fields.push(field.clone());
        }
        Ok(Row {
            index: self.index,
            fields,
        })
    }
}
