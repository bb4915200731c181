//! Structural validation pipeline.
//!
//! A fixed, ordered list of independent rules runs against a config
//! snapshot; each rule is a pure function of the snapshot and the pipeline
//! concatenates their findings.  Errors block use of the graph, warnings
//! flag risk, optimizations are advisory.

mod advisory;
mod cycles;
mod structure;
mod types;

pub use advisory::LONG_TIMEOUT_MS;
pub use types::{
    Category, Findings, Impact, OptimizationSuggestion, Severity, ValidationError,
    ValidationResult, ValidationWarning,
};

use crate::model::WorkflowConfig;

/// Run every rule against the snapshot.  `valid` is true iff no rule
/// produced an error.
pub fn validate_config(config: &WorkflowConfig) -> ValidationResult {
    tracing::debug!(workflow = %config.id, steps = config.all_steps().len(), "validating workflow");

    let mut findings = Findings::default();
    findings.extend(structure::validate(config));
    findings.extend(cycles::validate(config));
    findings.extend(advisory::validate(config));

    ValidationResult {
        valid: findings.errors.is_empty(),
        errors: findings.errors,
        warnings: findings.warnings,
        optimizations: findings.optimizations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Step;
    use std::collections::HashMap;

    fn config(steps: Vec<Step>) -> WorkflowConfig {
        WorkflowConfig {
            id: "wf".into(),
            name: "Workflow".into(),
            description: String::new(),
            steps,
            timeout: None,
            retry_policy: None,
            metadata: HashMap::new(),
        }
    }

    #[test]
    fn test_empty_workflow_is_valid() {
        let result = validate_config(&config(vec![]));
        assert!(result.valid);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn test_valid_iff_no_errors() {
        // A missing timeout yields a suggestion and an empty name yields a
        // warning; neither affects validity.
        let step = Step::feature("a", "", "f", "op", HashMap::new());
        let result = validate_config(&config(vec![step]));
        assert!(result.valid);
        assert!(!result.warnings.is_empty());
        assert!(!result.optimizations.is_empty());
    }

    #[test]
    fn test_findings_concatenated_across_rules() {
        let mut bad = Step::feature("a", "A", "", "op", HashMap::new());
        bad.dependencies.push("a".into());
        let result = validate_config(&config(vec![bad]));
        assert!(!result.valid);
        let codes: Vec<&str> = result.errors.iter().map(|e| e.code.as_str()).collect();
        assert!(codes.contains(&"E103"));
        assert!(codes.contains(&"E102"));
    }
}
