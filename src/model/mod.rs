//! Typed workflow model: the config snapshot and the step variants.

mod config;
mod step;

pub use config::{BackoffStrategy, RetryPolicy, WorkflowConfig};
pub use step::{flatten, ComparisonOperator, Condition, Step, StepKind};
