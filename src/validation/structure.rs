//! Structural rules: identity, reference existence, feature completeness and
//! parameter template well-formedness.

use std::collections::HashSet;

use crate::model::{StepKind, WorkflowConfig};

use super::types::{Findings, Severity};

pub fn validate(config: &WorkflowConfig) -> Findings {
    let mut findings = Findings::default();
    let steps = config.all_steps();

    let mut ids: HashSet<&str> = HashSet::new();
    let mut duplicates: Vec<&str> = Vec::new();
    for step in &steps {
        if !ids.insert(step.id.as_str()) {
            duplicates.push(step.id.as_str());
        }
    }
    for dup in duplicates {
        findings.error(
            "E106",
            format!("Duplicate step id: {}", dup),
            Some(dup.to_string()),
            Some("id".into()),
        );
    }

    for step in &steps {
        // Dependency existence is a flat search across the whole config,
        // not scoped to the step's nesting level.
        for dep in &step.dependencies {
            if !ids.contains(dep.as_str()) {
                findings.error(
                    "E101",
                    format!("Step '{}' depends on non-existent step '{}'", step.id, dep),
                    Some(step.id.clone()),
                    Some("dependencies".into()),
                );
            }
        }

        if step.name.trim().is_empty() {
            findings.warn(
                "W202",
                format!("Step '{}' has an empty name", step.id),
                Some(step.id.clone()),
                Severity::Low,
            );
        }

        if let StepKind::Feature {
            feature,
            operation,
            params,
        } = &step.kind
        {
            if feature.trim().is_empty() {
                findings.error(
                    "E103",
                    format!("Feature step '{}' is missing a feature name", step.id),
                    Some(step.id.clone()),
                    Some("feature".into()),
                );
            }
            if operation.trim().is_empty() {
                findings.error(
                    "E104",
                    format!("Feature step '{}' is missing an operation name", step.id),
                    Some(step.id.clone()),
                    Some("operation".into()),
                );
            }

            // Unmatched-brace scan per serialized value, not a recursive
            // parse.  Each value is scanned on its own so a `{{` in one
            // cannot be closed by a `}}` in another, and sorted keys keep
            // the reported value stable across runs.
            let mut keys: Vec<&String> = params.keys().collect();
            keys.sort();
            for key in keys {
                if let Ok(serialized) = serde_json::to_string(&params[key]) {
                    if has_unmatched_open(&serialized) {
                        findings.error(
                            "E105",
                            format!(
                                "Step '{}' has an unclosed '{{{{' in parameter '{}'",
                                step.id, key
                            ),
                            Some(step.id.clone()),
                            Some("params".into()),
                        );
                    }
                }
            }
        }
    }

    findings
}

fn has_unmatched_open(text: &str) -> bool {
    let mut rest = text;
    while let Some(open) = rest.find("{{") {
        match rest[open + 2..].find("}}") {
            Some(close) => rest = &rest[open + 2 + close + 2..],
            None => return true,
        }
    }
    false
}
