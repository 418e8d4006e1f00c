use crate::settings::{
    Settings,
    error::SettingsError,
    scoring::DecisionRule,
    sink::{TimeLabel, parse_pattern},
};
use std::collections::HashSet;

impl Settings {
    /// Checks everything a scoring run relies on.
    pub fn validate(&self) -> Result<(), SettingsError> {
        let vars = &self.variables;
        if vars.target.trim().is_empty() {
            return Err(SettingsError::invalid("variables.target", "must not be empty"));
        }
        if vars.inputs.is_empty() {
            return Err(SettingsError::invalid("variables.inputs", "must not be empty"));
        }
        let outputs = vars.output_names()?;
        let distinct: HashSet<&str> = outputs.as_array().into_iter().collect();
        if distinct.len() != 4 {
            return Err(SettingsError::invalid(
                "variables.outputs",
                "names must be distinct",
            ));
        }
        if let Some(clash) = vars.inputs.iter().find(|c| outputs.contains(c.as_str())) {
            return Err(SettingsError::invalid(
                "variables.outputs",
                format!("'{clash}' is also an input column"),
            ));
        }

        if self.model_endpoint.host.trim().is_empty() {
            return Err(SettingsError::invalid("model_endpoint.host", "must not be empty"));
        }
        if !matches!(self.model_endpoint.schema.as_str(), "http" | "https") {
            return Err(SettingsError::invalid(
                "model_endpoint.schema",
                format!("expected http or https, got '{}'", self.model_endpoint.schema),
            ));
        }
        if self.model_endpoint.envelope_key.is_empty() {
            return Err(SettingsError::invalid(
                "model_endpoint.envelope_key",
                "must not be empty",
            ));
        }

        if self.model_endpoint.timeout_secs == 0 {
            return Err(SettingsError::invalid(
                "model_endpoint.timeout_secs",
                "must be at least 1",
            ));
        }

        if self.data.row_limit == Some(0) {
            return Err(SettingsError::invalid("data.row_limit", "must be at least 1"));
        }

        let scoring = &self.scoring;
        if scoring.records_per_request == 0 {
            return Err(SettingsError::invalid(
                "scoring.records_per_request",
                "must be at least 1",
            ));
        }
        if scoring.max_in_flight == 0 {
            return Err(SettingsError::invalid(
                "scoring.max_in_flight",
                "must be at least 1",
            ));
        }
        if scoring.probability_slot > 1 {
            return Err(SettingsError::invalid(
                "scoring.probability_slot",
                "must be 0 or 1",
            ));
        }
        if let DecisionRule::Threshold { threshold } = scoring.decision_rule
            && !(0.0..=1.0).contains(&threshold)
        {
            return Err(SettingsError::invalid(
                "scoring.decision_rule.threshold",
                format!("{threshold} is outside [0, 1]"),
            ));
        }

        if self.retry.max_attempts == 0 {
            return Err(SettingsError::invalid("retry.max_attempts", "must be at least 1"));
        }

        self.validate_table()
    }

    /// Checks what the log offload relies on, including the database section.
    pub fn validate_for_offload(&self, require_db: bool) -> Result<(), SettingsError> {
        self.validate_table()?;
        if self.retry.max_attempts == 0 {
            return Err(SettingsError::invalid("retry.max_attempts", "must be at least 1"));
        }
        if require_db {
            self.db_endpoint()?.check_driver()?;
        }
        Ok(())
    }

    fn validate_table(&self) -> Result<(), SettingsError> {
        let table = &self.table;
        if table.prefix.trim().is_empty() {
            return Err(SettingsError::invalid("table.prefix", "must not be empty"));
        }
        if table.chunk_size == 0 {
            return Err(SettingsError::invalid("table.chunk_size", "must be at least 1"));
        }
        if let TimeLabel::Pattern(pattern) = &table.time_label {
            parse_pattern(pattern)?;
        }
        Ok(())
    }
}
