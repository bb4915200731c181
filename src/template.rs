//! Reusable workflow templates.
//!
//! A template is a config whose feature parameters carry `{{name}}`
//! placeholder markers.  Export scans the graph for markers and records the
//! parameter names; instantiation substitutes concrete values and returns a
//! fresh pre-populated builder.  Instantiation never mutates an existing
//! graph, and it rejects a value map that leaves any parameter unbound.

use std::collections::HashMap;

use regex::Regex;
use serde_json::Value;

use crate::builder::WorkflowBuilder;
use crate::error::{WorkflowError, WorkflowResult};
use crate::model::{Step, StepKind, WorkflowConfig};

/// A parameterized workflow with its extractable parameter names.
#[derive(Debug, Clone)]
pub struct WorkflowTemplate {
    config: WorkflowConfig,
    parameters: Vec<String>,
}

impl WorkflowTemplate {
    /// Extract a template from a finished graph.  Parameter names are
    /// deduplicated in first-seen order (steps in document order, params
    /// within a step by key).
    pub fn from_config(config: &WorkflowConfig) -> Self {
        let mut parameters = Vec::new();
        scan_steps(&config.steps, &mut parameters);
        WorkflowTemplate {
            config: config.clone(),
            parameters,
        }
    }

    pub fn parameters(&self) -> &[String] {
        &self.parameters
    }

    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    /// Substitute every placeholder and return a builder holding the
    /// concrete graph.  Every extracted parameter must be bound; extra
    /// entries in `values` are ignored.
    pub fn instantiate(&self, values: &HashMap<String, String>) -> WorkflowResult<WorkflowBuilder> {
        for parameter in &self.parameters {
            if !values.contains_key(parameter) {
                return Err(WorkflowError::MissingTemplateParameter(parameter.clone()));
            }
        }

        let mut config = self.config.clone();
        substitute_steps(&mut config.steps, &placeholder_regex(), values);
        Ok(WorkflowBuilder::from_config(config))
    }
}

impl WorkflowBuilder {
    /// Export the current graph as a reusable template.
    pub fn export_as_template(&self) -> WorkflowTemplate {
        WorkflowTemplate::from_config(&self.build())
    }
}

fn placeholder_regex() -> Regex {
    Regex::new(r"\{\{\s*([A-Za-z0-9_.-]+)\s*\}\}").unwrap()
}

fn scan_steps(steps: &[Step], parameters: &mut Vec<String>) {
    let re = placeholder_regex();
    for step in steps {
        scan_step(step, &re, parameters);
    }
}

fn scan_step(step: &Step, re: &Regex, parameters: &mut Vec<String>) {
    if let StepKind::Feature { params, .. } = &step.kind {
        let mut keys: Vec<&String> = params.keys().collect();
        keys.sort();
        for key in keys {
            if let Ok(serialized) = serde_json::to_string(&params[key]) {
                for capture in re.captures_iter(&serialized) {
                    let name = capture[1].to_string();
                    if !parameters.contains(&name) {
                        parameters.push(name);
                    }
                }
            }
        }
    }
    for child in step.children() {
        scan_step(child, re, parameters);
    }
    if let Some(fallback) = &step.fallback {
        scan_step(fallback, re, parameters);
    }
}

fn substitute_steps(steps: &mut [Step], re: &Regex, values: &HashMap<String, String>) {
    for step in steps {
        substitute_step(step, re, values);
    }
}

fn substitute_step(step: &mut Step, re: &Regex, values: &HashMap<String, String>) {
    match &mut step.kind {
        StepKind::Feature { params, .. } => {
            for value in params.values_mut() {
                substitute_value(value, re, values);
            }
        }
        StepKind::Parallel { steps } | StepKind::Sequential { steps } => {
            substitute_steps(steps, re, values);
        }
        StepKind::Conditional {
            if_true, if_false, ..
        } => {
            substitute_steps(if_true, re, values);
            substitute_steps(if_false, re, values);
        }
    }
    if let Some(fallback) = &mut step.fallback {
        substitute_step(fallback, re, values);
    }
}

/// Case-sensitive substitution through strings, arrays and objects, driven
/// by the same regex extraction uses so both sides agree on marker syntax.
/// Markers whose name has no binding are left in place.  No escape syntax
/// for a literal `{{`.
fn substitute_value(value: &mut Value, re: &Regex, values: &HashMap<String, String>) {
    match value {
        Value::String(text) => {
            let replaced = re
                .replace_all(text, |caps: &regex::Captures<'_>| {
                    match values.get(&caps[1]) {
                        Some(bound) => bound.clone(),
                        None => caps[0].to_string(),
                    }
                })
                .into_owned();
            *text = replaced;
        }
        Value::Array(items) => {
            for item in items {
                substitute_value(item, re, values);
            }
        }
        Value::Object(map) => {
            for item in map.values_mut() {
                substitute_value(item, re, values);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_builder() -> WorkflowBuilder {
        let mut params = HashMap::new();
        params.insert("goal".to_string(), json!("{{goal}}"));
        params.insert("level".to_string(), json!("level is {{level}}"));
        let mut follow_up = HashMap::new();
        follow_up.insert("goal".to_string(), json!("{{goal}}"));
        WorkflowBuilder::new("wf", "Workflow")
            .add_feature_step("gen", "Generate", "workout", "generate_plan", params)
            .unwrap()
            .add_feature_step("adj", "Adjust", "workout", "adjust_plan", follow_up)
            .unwrap()
            .add_dependency("adj", "gen")
            .unwrap()
    }

    #[test]
    fn test_parameters_deduplicated_first_seen() {
        let template = sample_builder().export_as_template();
        assert_eq!(template.parameters(), &["goal", "level"]);
    }

    #[test]
    fn test_instantiate_substitutes_values() {
        let template = sample_builder().export_as_template();
        let mut values = HashMap::new();
        values.insert("goal".to_string(), "strength".to_string());
        values.insert("level".to_string(), "beginner".to_string());

        let config = template.instantiate(&values).unwrap().build();
        let gen = config.find_step("gen").unwrap();
        if let StepKind::Feature { params, .. } = &gen.kind {
            assert_eq!(params["goal"], json!("strength"));
            assert_eq!(params["level"], json!("level is beginner"));
        } else {
            panic!("expected feature step");
        }
    }

    #[test]
    fn test_instantiate_missing_parameter_fails() {
        let template = sample_builder().export_as_template();
        let mut values = HashMap::new();
        values.insert("goal".to_string(), "strength".to_string());
        let err = template.instantiate(&values).unwrap_err();
        assert!(matches!(err, WorkflowError::MissingTemplateParameter(p) if p == "level"));
    }

    #[test]
    fn test_instantiate_ignores_extra_values() {
        let template = sample_builder().export_as_template();
        let mut values = HashMap::new();
        values.insert("goal".to_string(), "strength".to_string());
        values.insert("level".to_string(), "beginner".to_string());
        values.insert("unused".to_string(), "x".to_string());
        assert!(template.instantiate(&values).is_ok());
    }

    #[test]
    fn test_round_trip_preserves_structure() {
        let source = sample_builder().build();
        let template = WorkflowTemplate::from_config(&source);
        let mut values = HashMap::new();
        values.insert("goal".to_string(), "strength".to_string());
        values.insert("level".to_string(), "beginner".to_string());

        let rebuilt = template.instantiate(&values).unwrap().build();
        assert_eq!(rebuilt.id, source.id);
        let source_ids: Vec<&str> = source.all_steps().iter().map(|s| s.id.as_str()).collect();
        let rebuilt_ids: Vec<&str> = rebuilt.all_steps().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(source_ids, rebuilt_ids);
        assert_eq!(
            rebuilt.find_step("adj").unwrap().dependencies,
            source.find_step("adj").unwrap().dependencies
        );
    }

    #[test]
    fn test_nested_and_fallback_params_scanned() {
        let mut inner_params = HashMap::new();
        inner_params.insert("city".to_string(), json!("{{city}}"));
        let mut fallback_params = HashMap::new();
        fallback_params.insert("region".to_string(), json!("{{region}}"));

        let builder = WorkflowBuilder::new("wf", "Workflow")
            .add_parallel_step(
                "par",
                "Par",
                vec![Step::feature("inner", "Inner", "geo", "lookup", inner_params)],
            )
            .unwrap()
            .add_fallback(
                "inner",
                Step::feature("alt", "Alt", "geo", "lookup_cached", fallback_params),
            )
            .unwrap();

        let template = builder.export_as_template();
        assert_eq!(template.parameters(), &["city", "region"]);
    }

    #[test]
    fn test_padded_marker_extracted_and_substituted() {
        // Extraction tolerates whitespace inside the braces; substitution
        // must honor the same syntax or the marker survives instantiation.
        let mut params = HashMap::new();
        params.insert("goal".to_string(), json!("target: {{ goal }}"));
        let builder = WorkflowBuilder::new("wf", "Workflow")
            .add_feature_step("gen", "Generate", "workout", "generate_plan", params)
            .unwrap();

        let template = builder.export_as_template();
        assert_eq!(template.parameters(), &["goal"]);

        let mut values = HashMap::new();
        values.insert("goal".to_string(), "strength".to_string());
        let config = template.instantiate(&values).unwrap().build();
        let gen = config.find_step("gen").unwrap();
        if let StepKind::Feature { params, .. } = &gen.kind {
            assert_eq!(params["goal"], json!("target: strength"));
        } else {
            panic!("expected feature step");
        }
    }

    #[test]
    fn test_unbound_marker_left_in_place() {
        // "unbound" never shows up in parameters() (it only exists in the
        // value map the caller passes), so markers for it stay literal.
        let mut params = HashMap::new();
        params.insert("goal".to_string(), json!("{{goal}}"));
        let builder = WorkflowBuilder::new("wf", "Workflow")
            .add_feature_step("gen", "Generate", "workout", "generate_plan", params)
            .unwrap();
        let template = builder.export_as_template();

        let mut values = HashMap::new();
        values.insert("goal".to_string(), "{{other}}".to_string());
        let config = template.instantiate(&values).unwrap().build();
        if let StepKind::Feature { params, .. } = &config.find_step("gen").unwrap().kind {
            assert_eq!(params["goal"], json!("{{other}}"));
        } else {
            panic!("expected feature step");
        }
    }

    #[test]
    fn test_no_placeholders_no_parameters() {
        let mut params = HashMap::new();
        params.insert("goal".to_string(), json!("fixed"));
        let builder = WorkflowBuilder::new("wf", "Workflow")
            .add_feature_step("a", "A", "f", "op", params)
            .unwrap();
        let template = builder.export_as_template();
        assert!(template.parameters().is_empty());
        let config = template.instantiate(&HashMap::new()).unwrap().build();
        assert_eq!(config.all_steps().len(), 1);
    }
}
