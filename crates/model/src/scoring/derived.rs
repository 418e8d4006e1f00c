use crate::{core::value::Value, records::row::RowIndex};
use serde::{Deserialize, Serialize};

/// Names of the four derived output columns, in output order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputNames {
    pub prob_class0: String,
    pub prob_class1: String,
    pub selected_probability: String,
    pub predicted_class: String,
}

impl OutputNames {
    pub fn from_list(names: &[String]) -> Option<Self> {
        match names {
            [p0, p1, selected, class] => Some(OutputNames {
                prob_class0: p0.clone(),
                prob_class1: p1.clone(),
                selected_probability: selected.clone(),
                predicted_class: class.clone(),
            }),
            _ => None,
        }
    }

    pub fn as_array(&self) -> [&str; 4] {
        [
            &self.prob_class0,
            &self.prob_class1,
            &self.selected_probability,
            &self.predicted_class,
        ]
    }

    pub fn contains(&self, column: &str) -> bool {
        self.as_array().contains(&column)
    }
}

impl Default for OutputNames {
    fn default() -> Self {
        OutputNames {
            prob_class0: "P_BAD0".to_string(),
            prob_class1: "P_BAD1".to_string(),
            selected_probability: "EM_PROBABILITY".to_string(),
            predicted_class: "EM_CLASSIFICATION".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DerivedOutput {
    pub index: RowIndex,
    pub prob_class0: f64,
    pub prob_class1: f64,
    pub selected_probability: f64,
    pub predicted_class: u8,
}

impl DerivedOutput {
    /// The four derived cells, ordered like `OutputNames::as_array`.
    pub fn values(&self) -> [Value; 4] {
        [
            Value::Float(self.prob_class0),
            Value::Float(self.prob_class1),
            Value::Float(self.selected_probability),
            Value::Int(i64::from(self.predicted_class)),
        ]
    }
}
