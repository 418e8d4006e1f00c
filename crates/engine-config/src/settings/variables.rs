use crate::settings::error::SettingsError;
use model::scoring::derived::OutputNames;
use serde::{Deserialize, Serialize};

/// Column roles of the scored dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VariableSchema {
    pub target: String,
    pub inputs: Vec<String>,
    /// prob-class-0, prob-class-1, selected probability, predicted class.
    pub outputs: Vec<String>,
}

impl VariableSchema {
    pub fn output_names(&self) -> Result<OutputNames, SettingsError> {
        OutputNames::from_list(&self.outputs).ok_or_else(|| {
            SettingsError::invalid(
                "variables.outputs",
                format!("expected exactly 4 names, got {}", self.outputs.len()),
            )
        })
    }
}
