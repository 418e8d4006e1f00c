use crate::records::row::RowIndex;
use serde::{Deserialize, Serialize};

/// Decoded reply of the scoring service. Entries are kept as raw JSON and
/// validated by the decoder, so any shape of `results[i]` is accepted here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResponse {
    pub results: Vec<serde_json::Value>,
}

/// One entry of a response, tied back to the row it was requested for.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredEntry {
    pub index: RowIndex,
    pub result: serde_json::Value,
}

impl ScoreResponse {
    /// Pairs each result with the row index at the same position.
    /// Callers must check that both sides have the same length first.
    pub fn pair_with(self, indices: &[RowIndex]) -> Vec<ScoredEntry> {
        indices
            .iter()
            .copied()
            .zip(self.results)
            .map(|(index, result)| ScoredEntry { index, result })
            .collect()
    }
}
