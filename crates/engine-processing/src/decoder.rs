use engine_config::settings::scoring::DecisionRule;
use engine_core::error::ProtocolError;
use model::{
    records::row::RowIndex,
    scoring::{derived::DerivedOutput, response::ScoredEntry},
};
use serde_json::Value as Json;

/// Turns raw per-example results into class probabilities and a decision.
///
/// Each result is read as `[[class0 ...], [class1 ...]]`, taking the number
/// at `slot` inside each class entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResponseDecoder {
    slot: usize,
    rule: DecisionRule,
}

impl Default for ResponseDecoder {
    fn default() -> Self {
        Self::new(0, DecisionRule::Argmax)
    }
}

impl ResponseDecoder {
    pub fn new(slot: usize, rule: DecisionRule) -> Self {
        Self { slot, rule }
    }

    pub fn decode(&self, entry: &ScoredEntry) -> Result<DerivedOutput, ProtocolError> {
        let prob_class0 = self.probability(entry, 0)?;
        let prob_class1 = self.probability(entry, 1)?;

        let predicted_class = match self.rule {
            DecisionRule::Argmax => u8::from(prob_class1 > prob_class0),
            DecisionRule::Threshold { threshold } => u8::from(prob_class1 > threshold),
        };
        let selected_probability = if predicted_class == 1 {
            prob_class1
        } else {
            prob_class0
        };

        Ok(DerivedOutput {
            index: entry.index,
            prob_class0,
            prob_class1,
            selected_probability,
            predicted_class,
        })
    }

    fn probability(&self, entry: &ScoredEntry, class: usize) -> Result<f64, ProtocolError> {
        let cell = entry
            .result
            .get(class)
            .and_then(|pair| pair.get(self.slot))
            .ok_or_else(|| {
                malformed(
                    entry.index,
                    format!("no value at position [{class}][{}]", self.slot),
                )
            })?;
        as_probability(cell).ok_or_else(|| {
            malformed(
                entry.index,
                format!("value {cell} at [{class}][{}] is not a number", self.slot),
            )
        })
    }
}

fn as_probability(cell: &Json) -> Option<f64> {
    match cell {
        Json::Number(n) => n.as_f64(),
        _ => None,
    }
}

fn malformed(index: RowIndex, reason: String) -> ProtocolError {
    ProtocolError::MalformedResult { index, reason }
}
