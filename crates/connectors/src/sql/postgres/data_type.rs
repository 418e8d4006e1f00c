use model::core::value::Value;
use std::fmt;

/// Column types the audit store is created with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PgColumnType {
    BigInt,
    Double,
    Boolean,
    Text,
}

impl PgColumnType {
    pub fn as_sql(&self) -> &'static str {
        match self {
            PgColumnType::BigInt => "BIGINT",
            PgColumnType::Double => "DOUBLE PRECISION",
            PgColumnType::Boolean => "BOOLEAN",
            PgColumnType::Text => "TEXT",
        }
    }

    /// Narrowest type able to hold every non-missing value of a column.
    /// Integers mixed with floats widen to double; any other mix, and a
    /// column with no values at all, falls back to text. Values read back in
    /// the widened type.
    pub fn infer<'a>(values: impl IntoIterator<Item = &'a Value>) -> Self {
        let mut inferred: Option<PgColumnType> = None;
        for value in values {
            if value.is_missing() {
                continue;
            }
            let current = match value {
                Value::Int(_) => PgColumnType::BigInt,
                Value::Float(_) => PgColumnType::Double,
                Value::Boolean(_) => PgColumnType::Boolean,
                _ => return PgColumnType::Text,
            };
            inferred = Some(match (inferred, current) {
                (None, t) => t,
                (Some(a), b) if a == b => a,
                (Some(PgColumnType::BigInt), PgColumnType::Double)
                | (Some(PgColumnType::Double), PgColumnType::BigInt) => PgColumnType::Double,
                _ => return PgColumnType::Text,
            });
        }
        inferred.unwrap_or(PgColumnType::Text)
    }

    /// Infers one type per column of a rectangular row set.
    pub fn infer_columns(width: usize, rows: &[Vec<Value>]) -> Vec<PgColumnType> {
        (0..width)
            .map(|i| PgColumnType::infer(rows.iter().filter_map(|r| r.get(i))))
            .collect()
    }
}

impl fmt::Display for PgColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infers_from_present_values() {
        assert_eq!(
            PgColumnType::infer(&[Value::Int(1), Value::Null, Value::Int(3)]),
            PgColumnType::BigInt
        );
        assert_eq!(
            PgColumnType::infer(&[Value::Int(1), Value::Float(0.5)]),
            PgColumnType::Double
        );
        assert_eq!(
            PgColumnType::infer(&[Value::Float(f64::NAN), Value::Boolean(true)]),
            PgColumnType::Boolean
        );
        assert_eq!(
            PgColumnType::infer(&[Value::Int(1), "x".into()]),
            PgColumnType::Text
        );
        assert_eq!(
            PgColumnType::infer(&[Value::Int(1), Value::Boolean(false)]),
            PgColumnType::Text
        );
    }

    #[test]
    fn all_missing_column_is_text() {
        assert_eq!(PgColumnType::infer(&[Value::Null, Value::Null]), PgColumnType::Text);
        assert_eq!(PgColumnType::infer(std::iter::empty()), PgColumnType::Text);
    }

    #[test]
    fn infers_per_column() {
        let rows = vec![
            vec![Value::Int(1), Value::Float(0.9), "a".into()],
            vec![Value::Int(2), Value::Float(0.1), Value::Null],
        ];
        assert_eq!(
            PgColumnType::infer_columns(3, &rows),
            vec![PgColumnType::BigInt, PgColumnType::Double, PgColumnType::Text]
        );
    }
}
