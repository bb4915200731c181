//! Validation finding types.

use serde::{Deserialize, Serialize};

/// Blocking finding: the graph is structurally unusable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    pub code: String,
    pub message: String,
    pub step_id: Option<String>,
    pub field: Option<String>,
}

/// Non-fatal risk signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationWarning {
    pub code: String,
    pub message: String,
    pub step_id: Option<String>,
    pub severity: Severity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// Advisory recommendation derived from static analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationSuggestion {
    pub message: String,
    pub impact: Impact,
    pub category: Category,
    pub implementation: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Impact {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Performance,
    Reliability,
    Maintainability,
}

/// Aggregated output of the validation pipeline.  `valid` is strictly
/// "no errors"; warnings and optimizations never affect it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
    pub optimizations: Vec<OptimizationSuggestion>,
}

/// Output of one validation rule, concatenated by the pipeline.
#[derive(Debug, Default)]
pub struct Findings {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
    pub optimizations: Vec<OptimizationSuggestion>,
}

impl Findings {
    pub fn error(
        &mut self,
        code: &str,
        message: impl Into<String>,
        step_id: Option<String>,
        field: Option<String>,
    ) {
        self.errors.push(ValidationError {
            code: code.to_string(),
            message: message.into(),
            step_id,
            field,
        });
    }

    pub fn warn(
        &mut self,
        code: &str,
        message: impl Into<String>,
        step_id: Option<String>,
        severity: Severity,
    ) {
        self.warnings.push(ValidationWarning {
            code: code.to_string(),
            message: message.into(),
            step_id,
            severity,
        });
    }

    pub fn suggest(
        &mut self,
        message: impl Into<String>,
        impact: Impact,
        category: Category,
        implementation: Option<String>,
    ) {
        self.optimizations.push(OptimizationSuggestion {
            message: message.into(),
            impact,
            category,
            implementation,
        });
    }

    pub fn extend(&mut self, other: Findings) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
        self.optimizations.extend(other.optimizations);
    }
}
