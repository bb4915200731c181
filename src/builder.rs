//! Incremental workflow construction.
//!
//! The builder is the single mutable owner of the step list.  Mutations are
//! fluent (`self -> Result<Self>`) and fail fast when they reference a step
//! id that does not exist.  Dependency *targets* are deliberately not
//! checked at add time so steps can be wired before their dependencies are
//! declared; unresolved targets surface from [`validate`](WorkflowBuilder::validate).

use std::collections::{HashMap, HashSet};

use crate::error::{WorkflowError, WorkflowResult};
use crate::model::{flatten, Condition, RetryPolicy, Step, StepKind, WorkflowConfig};
use crate::optimize::{self, OptimizedWorkflow};
use crate::validation::{self, ValidationResult};
use serde_json::Value;

/// Fluent builder for a [`WorkflowConfig`].
#[derive(Debug, Clone)]
pub struct WorkflowBuilder {
    id: String,
    name: String,
    description: String,
    steps: Vec<Step>,
    timeout: Option<u64>,
    retry_policy: Option<RetryPolicy>,
    metadata: HashMap<String, String>,
}

impl WorkflowBuilder {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        WorkflowBuilder {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            steps: Vec::new(),
            timeout: None,
            retry_policy: None,
            metadata: HashMap::new(),
        }
    }

    /// Load an existing snapshot back into a builder, e.g. one produced by
    /// template instantiation or deserialized from storage.
    pub fn from_config(config: WorkflowConfig) -> Self {
        WorkflowBuilder {
            id: config.id,
            name: config.name,
            description: config.description,
            steps: config.steps,
            timeout: config.timeout,
            retry_policy: config.retry_policy,
            metadata: config.metadata,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Default step timeout in milliseconds.
    pub fn default_timeout(mut self, ms: u64) -> Self {
        self.timeout = Some(ms);
        self
    }

    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = Some(policy);
        self
    }

    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn add_feature_step(
        self,
        id: impl Into<String>,
        name: impl Into<String>,
        feature: impl Into<String>,
        operation: impl Into<String>,
        params: HashMap<String, Value>,
    ) -> WorkflowResult<Self> {
        self.insert_step(Step::feature(id, name, feature, operation, params))
    }

    pub fn add_parallel_step(
        self,
        id: impl Into<String>,
        name: impl Into<String>,
        children: Vec<Step>,
    ) -> WorkflowResult<Self> {
        self.insert_step(Step::parallel(id, name, children))
    }

    pub fn add_sequential_step(
        self,
        id: impl Into<String>,
        name: impl Into<String>,
        children: Vec<Step>,
    ) -> WorkflowResult<Self> {
        self.insert_step(Step::sequential(id, name, children))
    }

    pub fn add_conditional_step(
        self,
        id: impl Into<String>,
        name: impl Into<String>,
        condition: Condition,
        if_true: Vec<Step>,
        if_false: Vec<Step>,
    ) -> WorkflowResult<Self> {
        self.insert_step(Step::conditional(id, name, condition, if_true, if_false))
    }

    /// Append a pre-built step.  Rejects any id in the incoming subtree that
    /// collides with an id already in the graph, or that repeats within the
    /// subtree itself.
    pub fn insert_step(mut self, step: Step) -> WorkflowResult<Self> {
        let mut seen: HashSet<String> = flatten(&self.steps)
            .into_iter()
            .map(|s| s.id.clone())
            .collect();
        for incoming in flatten(std::slice::from_ref(&step)) {
            if !seen.insert(incoming.id.clone()) {
                return Err(WorkflowError::DuplicateStepId(incoming.id.clone()));
            }
        }
        self.steps.push(step);
        Ok(self)
    }

    /// Declare that `step_id` must wait for `depends_on`.  `depends_on` is
    /// not checked for existence here; forward references are resolved at
    /// validation time.
    pub fn add_dependency(
        mut self,
        step_id: &str,
        depends_on: impl Into<String>,
    ) -> WorkflowResult<Self> {
        let step = find_step_mut(&mut self.steps, step_id)
            .ok_or_else(|| WorkflowError::StepNotFound(step_id.to_string()))?;
        step.dependencies.push(depends_on.into());
        Ok(self)
    }

    /// Declare several dependencies for one step in a single call.
    pub fn add_dependencies(mut self, step_id: &str, depends_on: &[&str]) -> WorkflowResult<Self> {
        let step = find_step_mut(&mut self.steps, step_id)
            .ok_or_else(|| WorkflowError::StepNotFound(step_id.to_string()))?;
        step.dependencies
            .extend(depends_on.iter().map(|d| d.to_string()));
        Ok(self)
    }

    pub fn add_fallback(mut self, step_id: &str, fallback: Step) -> WorkflowResult<Self> {
        let step = find_step_mut(&mut self.steps, step_id)
            .ok_or_else(|| WorkflowError::StepNotFound(step_id.to_string()))?;
        step.fallback = Some(Box::new(fallback));
        Ok(self)
    }

    pub fn set_timeout(mut self, step_id: &str, ms: u64) -> WorkflowResult<Self> {
        let step = find_step_mut(&mut self.steps, step_id)
            .ok_or_else(|| WorkflowError::StepNotFound(step_id.to_string()))?;
        step.timeout = Some(ms);
        Ok(self)
    }

    pub fn set_retries(mut self, step_id: &str, retries: u32) -> WorkflowResult<Self> {
        let step = find_step_mut(&mut self.steps, step_id)
            .ok_or_else(|| WorkflowError::StepNotFound(step_id.to_string()))?;
        step.retries = Some(retries);
        Ok(self)
    }

    /// Value snapshot of the current builder state.  The builder remains
    /// the single mutable owner; the snapshot is never shared back.
    pub fn build(&self) -> WorkflowConfig {
        WorkflowConfig {
            id: self.id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            steps: self.steps.clone(),
            timeout: self.timeout,
            retry_policy: self.retry_policy.clone(),
            metadata: self.metadata.clone(),
        }
    }

    /// Run the structural validation pipeline against the current snapshot.
    pub fn validate(&self) -> ValidationResult {
        validation::validate_config(&self.build())
    }

    /// Validate, then derive parallelization, caching and timeout analysis.
    pub fn optimize(&self) -> OptimizedWorkflow {
        optimize::analyze(&self.build())
    }
}

/// Mutable flat lookup across every nesting level.  Fallback steps are not
/// part of the id namespace and are not searched.
fn find_step_mut<'a>(steps: &'a mut [Step], id: &str) -> Option<&'a mut Step> {
    for step in steps {
        if step.id == id {
            return Some(step);
        }
        let found = match &mut step.kind {
            StepKind::Feature { .. } => None,
            StepKind::Parallel { steps } | StepKind::Sequential { steps } => {
                find_step_mut(steps, id)
            }
            StepKind::Conditional {
                if_true, if_false, ..
            } => find_step_mut(if_true, id).or_else(|| find_step_mut(if_false, id)),
        };
        if found.is_some() {
            return found;
        }
    }
    None
}
