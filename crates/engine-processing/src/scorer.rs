use crate::retry::classify_scoring_error;
use async_trait::async_trait;
use engine_core::{
    connectors::scorer::Scorer,
    error::ScoringError,
    metrics::Metrics,
    retry::{RetryError, RetryPolicy},
};
use model::scoring::{payload::ScoreRequestPayload, response::ScoredEntry};
use tracing::warn;

/// Wraps a scorer with the retry policy; only transport failures are retried.
pub struct RetryingScorer<S> {
    inner: S,
    policy: RetryPolicy,
    metrics: Metrics,
}

impl<S: Scorer> RetryingScorer<S> {
    pub fn new(inner: S, policy: RetryPolicy, metrics: Metrics) -> Self {
        Self {
            inner,
            policy,
            metrics,
        }
    }
}

#[async_trait]
impl<S: Scorer> Scorer for RetryingScorer<S> {
    async fn score(&self, payload: &ScoreRequestPayload) -> Result<Vec<ScoredEntry>, ScoringError> {
        let first = payload.first_index();
        self.policy
            .run_observed(
                || self.inner.score(payload),
                classify_scoring_error,
                |attempt, err, delay| {
                    self.metrics.increment_retries(1);
                    warn!(
                        index = ?first.map(|i| i.0),
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "Scoring request failed, retrying"
                    );
                },
            )
            .await
            .map_err(RetryError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine_core::error::ProtocolError;
    use model::records::row::RowIndex;
    use serde_json::json;
    use std::{
        sync::{
            Mutex,
            atomic::{AtomicUsize, Ordering},
        },
        time::Duration,
    };

    /// Replays queued outcomes, then succeeds.
    struct ScriptedScorer {
        script: Mutex<Vec<ScoringError>>,
        calls: AtomicUsize,
    }

    impl ScriptedScorer {
        fn new(mut failures: Vec<ScoringError>) -> Self {
            failures.reverse();
            Self {
                script: Mutex::new(failures),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Scorer for ScriptedScorer {
        async fn score(
            &self,
            payload: &ScoreRequestPayload,
        ) -> Result<Vec<ScoredEntry>, ScoringError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(err) = self.script.lock().unwrap().pop() {
                return Err(err);
            }
            Ok(payload
                .indices
                .iter()
                .map(|&index| ScoredEntry {
                    index,
                    result: json!([[0.9], [0.1]]),
                })
                .collect())
        }
    }

    fn payload() -> ScoreRequestPayload {
        ScoreRequestPayload {
            indices: vec![RowIndex(3)],
            body: json!({"examples": [{"LOAN": 1}]}),
        }
    }

    fn policy(max_attempts: usize) -> RetryPolicy {
        RetryPolicy::new(max_attempts, Duration::ZERO, Duration::ZERO)
    }

    #[tokio::test]
    async fn transport_failures_are_retried() {
        let inner = ScriptedScorer::new(vec![ScoringError::Transport("reset".into())]);
        let metrics = Metrics::new();
        let scorer = RetryingScorer::new(inner, policy(3), metrics.clone());

        let entries = scorer.score(&payload()).await.unwrap();

        assert_eq!(entries[0].index, RowIndex(3));
        assert_eq!(scorer.inner.calls.load(Ordering::SeqCst), 2);
        assert_eq!(metrics.snapshot().retry_count, 1);
    }

    #[tokio::test]
    async fn protocol_errors_are_not_retried() {
        let inner =
            ScriptedScorer::new(vec![ScoringError::Protocol(ProtocolError::MissingResults)]);
        let scorer = RetryingScorer::new(inner, policy(5), Metrics::new());

        let err = scorer.score(&payload()).await.unwrap_err();

        assert_eq!(err, ScoringError::Protocol(ProtocolError::MissingResults));
        assert_eq!(scorer.inner.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn single_attempt_by_default() {
        let inner = ScriptedScorer::new(vec![ScoringError::Transport("refused".into())]);
        let scorer = RetryingScorer::new(inner, RetryPolicy::default(), Metrics::new());

        assert!(scorer.score(&payload()).await.is_err());
        assert_eq!(scorer.inner.calls.load(Ordering::SeqCst), 1);
    }
}
