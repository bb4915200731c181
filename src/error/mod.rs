//! Error types for the workflow builder.
//!
//! Only fail-fast construction and template-instantiation failures surface as
//! `Err` values.  Structural validation findings are data
//! (see [`crate::validation::ValidationResult`]) and are never raised.

use thiserror::Error;

/// Errors raised by builder mutations and template instantiation.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("Duplicate step id: {0}")]
    DuplicateStepId(String),
    #[error("Step not found: {0}")]
    StepNotFound(String),
    #[error("Missing template parameter: {0}")]
    MissingTemplateParameter(String),
}

/// Convenience alias for builder-level results.
pub type WorkflowResult<T> = Result<T, WorkflowError>;
