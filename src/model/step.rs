use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// One node in a workflow graph.
///
/// Every step carries an id (unique within the owning config), a display
/// name, declared dependencies on other step ids, optional timeout/retry
/// overrides, an optional fallback step, and the variant-specific payload
/// in [`StepKind`].
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Step {
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Step ids that must complete before this one.  Checked for existence
    /// and cycles at validation time, not at construction time.
    #[serde(default)]
    pub dependencies: Vec<String>,
    /// Per-step timeout override in milliseconds.
    #[serde(default)]
    pub timeout: Option<u64>,
    /// Per-step retry override.
    #[serde(default)]
    pub retries: Option<u32>,
    /// Alternate step to substitute when the primary capability is
    /// unavailable.  Interpreted by the executor, not by this crate.
    #[serde(default)]
    pub fallback: Option<Box<Step>>,
    #[serde(flatten)]
    pub kind: StepKind,
}

/// Variant payload of a [`Step`].  The `type` field discriminates.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StepKind {
    /// Leaf invocation of a named feature operation.  Parameter values may
    /// contain `{{placeholder}}` markers.
    Feature {
        feature: String,
        operation: String,
        #[serde(default)]
        params: HashMap<String, Value>,
    },
    /// Children execute independently of each other.
    Parallel { steps: Vec<Step> },
    /// Children execute one after another.
    Sequential { steps: Vec<Step> },
    /// One boolean condition selecting between two child sequences.
    Conditional {
        condition: Condition,
        if_true: Vec<Step>,
        #[serde(default)]
        if_false: Vec<Step>,
    },
}

/// Boolean-valued condition attached to a conditional step.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Condition {
    /// Path into prior step results, e.g. `"profile.level"`.
    pub field: String,
    pub operator: ComparisonOperator,
    #[serde(default)]
    pub value: Value,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonOperator {
    Equal,
    NotEqual,
    GreaterThan,
    LessThan,
    Contains,
    NotContains,
    Empty,
    NotEmpty,
}

impl Step {
    fn base(id: impl Into<String>, name: impl Into<String>, kind: StepKind) -> Self {
        Step {
            id: id.into(),
            name: name.into(),
            dependencies: Vec::new(),
            timeout: None,
            retries: None,
            fallback: None,
            kind,
        }
    }

    pub fn feature(
        id: impl Into<String>,
        name: impl Into<String>,
        feature: impl Into<String>,
        operation: impl Into<String>,
        params: HashMap<String, Value>,
    ) -> Self {
        Step::base(
            id,
            name,
            StepKind::Feature {
                feature: feature.into(),
                operation: operation.into(),
                params,
            },
        )
    }

    pub fn parallel(id: impl Into<String>, name: impl Into<String>, steps: Vec<Step>) -> Self {
        Step::base(id, name, StepKind::Parallel { steps })
    }

    pub fn sequential(id: impl Into<String>, name: impl Into<String>, steps: Vec<Step>) -> Self {
        Step::base(id, name, StepKind::Sequential { steps })
    }

    pub fn conditional(
        id: impl Into<String>,
        name: impl Into<String>,
        condition: Condition,
        if_true: Vec<Step>,
        if_false: Vec<Step>,
    ) -> Self {
        Step::base(
            id,
            name,
            StepKind::Conditional {
                condition,
                if_true,
                if_false,
            },
        )
    }

    /// Direct children of this step, in declaration order.  Feature steps
    /// have none; conditional steps yield `if_true` then `if_false`.
    /// Fallback steps are substitutes, not children, and are excluded.
    pub fn children(&self) -> Vec<&Step> {
        match &self.kind {
            StepKind::Feature { .. } => Vec::new(),
            StepKind::Parallel { steps } | StepKind::Sequential { steps } => steps.iter().collect(),
            StepKind::Conditional {
                if_true, if_false, ..
            } => if_true.iter().chain(if_false.iter()).collect(),
        }
    }

    pub fn is_feature(&self) -> bool {
        matches!(self.kind, StepKind::Feature { .. })
    }
}

/// Flatten a step list in document order: each step precedes its children.
/// Fallback steps do not participate in the id namespace and are skipped.
pub fn flatten(steps: &[Step]) -> Vec<&Step> {
    let mut out = Vec::new();
    collect(steps, &mut out);
    out
}

fn collect<'a>(steps: &'a [Step], out: &mut Vec<&'a Step>) {
    for step in steps {
        out.push(step);
        collect_children(step, out);
    }
}

fn collect_children<'a>(step: &'a Step, out: &mut Vec<&'a Step>) {
    match &step.kind {
        StepKind::Feature { .. } => {}
        StepKind::Parallel { steps } | StepKind::Sequential { steps } => collect(steps, out),
        StepKind::Conditional {
            if_true, if_false, ..
        } => {
            collect(if_true, out);
            collect(if_false, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(pairs: &[(&str, Value)]) -> HashMap<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_feature_step_shape() {
        let step = Step::feature("gen", "Generate", "workout", "generate_plan", params(&[]));
        assert!(step.is_feature());
        assert!(step.children().is_empty());
        assert!(step.dependencies.is_empty());
    }

    #[test]
    fn test_children_of_conditional() {
        let cond = Condition {
            field: "profile.level".into(),
            operator: ComparisonOperator::Equal,
            value: json!("advanced"),
        };
        let step = Step::conditional(
            "branch",
            "Branch",
            cond,
            vec![Step::feature("t", "T", "f", "op", params(&[]))],
            vec![Step::feature("f1", "F", "f", "op", params(&[]))],
        );
        let ids: Vec<&str> = step.children().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["t", "f1"]);
    }

    #[test]
    fn test_flatten_document_order() {
        let steps = vec![
            Step::sequential(
                "outer",
                "Outer",
                vec![
                    Step::feature("a", "A", "f", "op", params(&[])),
                    Step::parallel(
                        "par",
                        "Par",
                        vec![Step::feature("b", "B", "f", "op", params(&[]))],
                    ),
                ],
            ),
            Step::feature("c", "C", "f", "op", params(&[])),
        ];
        let ids: Vec<&str> = flatten(&steps).iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["outer", "a", "par", "b", "c"]);
    }

    #[test]
    fn test_flatten_skips_fallbacks() {
        let mut step = Step::feature("a", "A", "f", "op", params(&[]));
        step.fallback = Some(Box::new(Step::feature("alt", "Alt", "f", "op", params(&[]))));
        let ids: Vec<&str> = flatten(std::slice::from_ref(&step))
            .iter()
            .map(|s| s.id.as_str())
            .collect();
        assert_eq!(ids, vec!["a"]);
    }

    #[test]
    fn test_step_serde_tagged() {
        let step = Step::feature(
            "gen",
            "Generate",
            "workout",
            "generate_plan",
            params(&[("goal", json!("{{goal}}"))]),
        );
        let value = serde_json::to_value(&step).unwrap();
        assert_eq!(value["type"], "feature");
        assert_eq!(value["feature"], "workout");
        let back: Step = serde_json::from_value(value).unwrap();
        assert_eq!(back, step);
    }

    #[test]
    fn test_condition_serde() {
        let cond = Condition {
            field: "x".into(),
            operator: ComparisonOperator::GreaterThan,
            value: json!(3),
        };
        let json = serde_json::to_string(&cond).unwrap();
        assert!(json.contains("greater_than"));
        let back: Condition = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cond);
    }
}
