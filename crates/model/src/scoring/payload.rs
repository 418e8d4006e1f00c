use crate::records::row::RowIndex;
use serde::Serialize;

/// Serialized request for one or more predictor rows.
///
/// `indices[i]` is the row whose predictor map sits at position `i` of the
/// envelope array, which is also the position of its entry in the response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreRequestPayload {
    pub indices: Vec<RowIndex>,
    pub body: serde_json::Value,
}

impl ScoreRequestPayload {
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn first_index(&self) -> Option<RowIndex> {
        self.indices.first().copied()
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        // Serializing a `serde_json::Value` into memory cannot fail.
        serde_json::to_vec(&self.body).unwrap_or_default()
    }
}
