use crate::error::{ProtocolError, ScoringError};
use async_trait::async_trait;
use connectors::http::client::{HttpEndpoint, HttpScoringClient};
use model::scoring::{
    payload::ScoreRequestPayload,
    response::{ScoreResponse, ScoredEntry},
};

/// Sends one request payload to a model and returns one entry per example,
/// tied back to the row index it was requested for.
#[async_trait]
pub trait Scorer: Send + Sync {
    async fn score(&self, payload: &ScoreRequestPayload) -> Result<Vec<ScoredEntry>, ScoringError>;
}

pub struct HttpScorer {
    client: HttpScoringClient,
}

impl HttpScorer {
    pub fn new(endpoint: HttpEndpoint) -> Result<Self, ScoringError> {
        Ok(Self {
            client: HttpScoringClient::new(endpoint)?,
        })
    }

    pub fn url(&self) -> &str {
        self.client.url()
    }
}

#[async_trait]
impl Scorer for HttpScorer {
    async fn score(&self, payload: &ScoreRequestPayload) -> Result<Vec<ScoredEntry>, ScoringError> {
        let reply = self.client.post_json(payload.to_bytes()).await?;
        let response = parse_response(reply, payload.len())?;
        Ok(response.pair_with(&payload.indices))
    }
}

/// Checks the reply envelope: a `results` array with one entry per example.
pub fn parse_response(
    reply: serde_json::Value,
    expected: usize,
) -> Result<ScoreResponse, ProtocolError> {
    if !reply.get("results").is_some_and(|r| r.is_array()) {
        return Err(ProtocolError::MissingResults);
    }
    let response: ScoreResponse =
        serde_json::from_value(reply).map_err(|e| ProtocolError::InvalidBody(e.to_string()))?;
    if response.results.len() != expected {
        return Err(ProtocolError::ResultCount {
            expected,
            actual: response.results.len(),
        });
    }
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_one_result_per_example() {
        let reply = json!({ "results": [[[0.9, 0.1], [0.1, 0.9]]] });
        let response = parse_response(reply, 1).unwrap();
        assert_eq!(response.results.len(), 1);
    }

    #[test]
    fn rejects_missing_results() {
        assert_eq!(
            parse_response(json!({ "predictions": [] }), 1).unwrap_err(),
            ProtocolError::MissingResults
        );
        assert_eq!(
            parse_response(json!({ "results": 3 }), 1).unwrap_err(),
            ProtocolError::MissingResults
        );
    }

    #[test]
    fn rejects_result_count_mismatch() {
        let reply = json!({ "results": [[[0.9], [0.1]], [[0.2], [0.8]]] });
        assert_eq!(
            parse_response(reply, 3).unwrap_err(),
            ProtocolError::ResultCount {
                expected: 3,
                actual: 2
            }
        );
    }
}
