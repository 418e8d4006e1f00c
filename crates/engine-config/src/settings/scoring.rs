use serde::{Deserialize, Serialize};

/// What happens to the run when a file or a record fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Stop the whole run on the first failure.
    #[default]
    AbortRun,
    /// Abandon the failing file and continue with the next one.
    SkipFile,
    /// Skip the failing record; unreadable files are skipped whole.
    SkipRecord,
}

/// How the predicted class is derived from the two class probabilities.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DecisionRule {
    /// Class 1 when its probability is strictly larger; ties go to class 0.
    #[default]
    Argmax,
    /// Class 1 when its probability is strictly above `threshold`.
    Threshold { threshold: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScoringSettings {
    #[serde(default = "one")]
    pub records_per_request: usize,
    #[serde(default = "one")]
    pub max_in_flight: usize,
    #[serde(default)]
    pub failure_policy: FailurePolicy,
    /// Position inside each per-class pair that holds the probability.
    #[serde(default)]
    pub probability_slot: usize,
    #[serde(default)]
    pub decision_rule: DecisionRule,
}

fn one() -> usize {
    1
}

impl Default for ScoringSettings {
    fn default() -> Self {
        Self {
            records_per_request: 1,
            max_in_flight: 1,
            failure_policy: FailurePolicy::default(),
            probability_slot: 0,
            decision_rule: DecisionRule::default(),
        }
    }
}
