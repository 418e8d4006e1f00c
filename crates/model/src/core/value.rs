use serde::{Deserialize, Serialize};

/// Tokens read from delimited files that stand for a missing cell.
const NULL_TOKENS: [&str; 6] = ["nan", "NaN", "NAN", "NA", "null", "NULL"];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Boolean(bool),
    String(String),
    Json(serde_json::Value),
    Null,
}

impl Value {
    /// Infers a typed value from a raw delimited-text cell.
    pub fn infer(cell: &str) -> Value {
        let trimmed = cell.trim();
        if trimmed.is_empty() || NULL_TOKENS.contains(&trimmed) {
            return Value::Null;
        }
        if let Ok(v) = trimmed.parse::<i64>() {
            return Value::Int(v);
        }
        // `f64::from_str` accepts "inf" and "nan" spellings; keep those as text.
        if trimmed.bytes().any(|b| b.is_ascii_digit())
            && let Ok(v) = trimmed.parse::<f64>()
        {
            return Value::Float(v);
        }
        match trimmed {
            "true" | "True" | "TRUE" => Value::Boolean(true),
            "false" | "False" | "FALSE" => Value::Boolean(false),
            _ => Value::String(cell.to_string()),
        }
    }

    /// Renders the value as a delimited-text cell. Nulls become empty cells,
    /// floats use the shortest representation that parses back to the same bits.
    pub fn to_cell(&self) -> String {
        match self {
            Value::Int(v) => v.to_string(),
            Value::Float(v) if v.is_nan() => String::new(),
            Value::Float(v) => {
                let mut buf = ryu::Buffer::new();
                buf.format(*v).to_string()
            }
            Value::Boolean(v) => v.to_string(),
            Value::String(v) => v.clone(),
            Value::Json(v) => v.to_string(),
            Value::Null => String::new(),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            Value::Boolean(v) => Some(if *v { 1.0 } else { 0.0 }),
            Value::String(v) => v.parse::<f64>().ok(),
            Value::Json(v) => v.as_f64(),
            Value::Null => None,
        }
    }

    /// Missing in the dataframe sense: an explicit null or a NaN float.
    pub fn is_missing(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Float(v) => v.is_nan(),
            _ => false,
        }
    }

    /// True for values that map onto a single JSON scalar.
    pub fn is_scalar(&self) -> bool {
        match self {
            Value::Json(v) => !(v.is_array() || v.is_object()),
            _ => true,
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldValue {
    pub name: String,
    pub value: Value,
}

impl FieldValue {
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        FieldValue {
            name: name.into(),
            value: value.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infers_cell_types() {
        assert_eq!(Value::infer("1000"), Value::Int(1000));
        assert_eq!(Value::infer("0.25"), Value::Float(0.25));
        assert_eq!(Value::infer("1e3"), Value::Float(1000.0));
        assert_eq!(Value::infer("true"), Value::Boolean(true));
        assert_eq!(Value::infer("DebtCon"), Value::String("DebtCon".into()));
        assert_eq!(Value::infer("inf"), Value::String("inf".into()));
    }

    #[test]
    fn missing_tokens_become_null() {
        for cell in ["", "  ", "nan", "NaN", "NA", "null"] {
            assert_eq!(Value::infer(cell), Value::Null, "cell {cell:?}");
        }
    }

    #[test]
    fn float_cells_survive_a_write_read_cycle() {
        for v in [1.0, 0.1, 0.9000000000000001, 123456.789, 1e21, -0.5] {
            let cell = Value::Float(v).to_cell();
            assert_eq!(Value::infer(&cell), Value::Float(v), "cell {cell}");
        }
    }

    #[test]
    fn nan_float_is_missing_and_writes_empty() {
        let v = Value::Float(f64::NAN);
        assert!(v.is_missing());
        assert_eq!(v.to_cell(), "");
    }

    #[test]
    fn json_containers_are_not_scalar() {
        assert!(Value::Json(serde_json::json!(3)).is_scalar());
        assert!(!Value::Json(serde_json::json!([1, 2])).is_scalar());
        assert!(!Value::Json(serde_json::json!({"a": 1})).is_scalar());
    }
}
