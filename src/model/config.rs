use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::step::{flatten, Step};

/// Finished, immutable-once-built workflow descriptor.
///
/// Produced by [`crate::builder::WorkflowBuilder::build`] as a value
/// snapshot; safe to share read-only across threads.  Step insertion order
/// is preserved and used as the tie-break for independent-group discovery.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct WorkflowConfig {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub steps: Vec<Step>,
    /// Default step timeout in milliseconds, overridable per step.
    #[serde(default)]
    pub timeout: Option<u64>,
    #[serde(default)]
    pub retry_policy: Option<RetryPolicy>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl WorkflowConfig {
    /// Every step at every nesting depth, document order.
    pub fn all_steps(&self) -> Vec<&Step> {
        flatten(&self.steps)
    }

    /// Flat lookup by id across all nesting levels.
    pub fn find_step(&self, id: &str) -> Option<&Step> {
        self.all_steps().into_iter().find(|s| s.id == id)
    }

    /// Timeout that applies to a step: its own override, else the config
    /// default.
    pub fn effective_timeout(&self, step: &Step) -> Option<u64> {
        step.timeout.or(self.timeout)
    }
}

/// Declarative retry policy, passed through to the executor.  Nothing in
/// this crate retries anything.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    #[serde(default)]
    pub max_retries: u32,
    #[serde(default)]
    pub retry_interval_ms: u64,
    #[serde(default = "default_backoff")]
    pub backoff: BackoffStrategy,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum BackoffStrategy {
    Fixed,
    Exponential,
}

fn default_backoff() -> BackoffStrategy {
    BackoffStrategy::Fixed
}
