use crate::sql::postgres::data_type::PgColumnType;
use model::core::value::Value;
use tokio_postgres::types::ToSql;

/// A bind parameter typed after its destination column, so nulls carry the
/// column's type rather than a guessed one.
pub struct PgParam(Box<dyn ToSql + Sync + Send>);

impl PgParam {
    pub fn for_column(value: &Value, column: PgColumnType) -> Self {
        match column {
            PgColumnType::BigInt => {
                let v = match value {
                    Value::Int(v) => Some(*v),
                    _ => None,
                };
                PgParam(Box::new(v))
            }
            PgColumnType::Double => {
                let v = value.as_f64().filter(|v| !v.is_nan());
                PgParam(Box::new(v))
            }
            PgColumnType::Boolean => {
                let v = match value {
                    Value::Boolean(v) => Some(*v),
                    _ => None,
                };
                PgParam(Box::new(v))
            }
            PgColumnType::Text => {
                let v = match value {
                    Value::String(s) => Some(s.clone()),
                    v if v.is_missing() => None,
                    v => Some(v.to_cell()),
                };
                PgParam(Box::new(v))
            }
        }
    }
}

impl AsRef<dyn ToSql + Sync> for PgParam {
    fn as_ref(&self) -> &(dyn ToSql + Sync + 'static) {
        &*self.0
    }
}

pub struct PgParamStore {
    pub params: Vec<PgParam>,
}

impl PgParamStore {
    /// Flattens `rows` row-major, typing each cell after its column.
    pub fn from_rows(rows: &[Vec<Value>], types: &[PgColumnType]) -> Self {
        let params = rows
            .iter()
            .flat_map(|row| {
                types.iter().enumerate().map(move |(i, ty)| {
                    PgParam::for_column(row.get(i).unwrap_or(&Value::Null), *ty)
                })
            })
            .collect();
        Self { params }
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn as_refs(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.params
            .iter()
            .map(|param| param.as_ref())
            .collect::<Vec<_>>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flattens_rows_by_column_type() {
        let rows = vec![
            vec![Value::Int(1), Value::Float(0.5)],
            vec![Value::Null, Value::Float(f64::NAN)],
        ];
        let store = PgParamStore::from_rows(&rows, &[PgColumnType::BigInt, PgColumnType::Double]);
        assert_eq!(store.len(), 4);
        assert_eq!(store.as_refs().len(), 4);
    }

    #[test]
    fn short_rows_are_padded_with_nulls() {
        let rows = vec![vec![Value::Int(1)]];
        let store = PgParamStore::from_rows(&rows, &[PgColumnType::BigInt, PgColumnType::Text]);
        assert_eq!(store.len(), 2);
    }
}
