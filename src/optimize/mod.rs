//! Static optimization analysis.
//!
//! Runs validation first (its suggestions are the baseline), then derives
//! parallelization groups, cache candidates and timeout recommendations
//! from the snapshot.  Everything here is advisory: nothing is executed or
//! measured, the speedup figures are idealized fan-out estimates.

mod analyzer;

pub use analyzer::analyze;

use serde::{Deserialize, Serialize};

use crate::model::WorkflowConfig;
use crate::validation::OptimizationSuggestion;

/// Steps that could run concurrently, with the idealized speedup of doing
/// so (sum of member timeouts over the max).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParallelGroup {
    pub step_ids: Vec<String>,
    pub estimated_speedup: f64,
}

/// A feature step whose result is worth caching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheCandidate {
    pub step_id: String,
    /// `feature-operation`, the two identifying strings joined with a hyphen.
    pub cache_key: String,
    pub ttl_ms: u64,
}

/// Recommended timeout for one step, derived from its operation and shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeoutRecommendation {
    pub step_id: String,
    pub recommended_ms: u64,
}

/// The analyzed graph: the unchanged snapshot plus derived structures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizedWorkflow {
    pub config: WorkflowConfig,
    pub parallel_groups: Vec<ParallelGroup>,
    pub cache_candidates: Vec<CacheCandidate>,
    pub timeout_recommendations: Vec<TimeoutRecommendation>,
    /// Every suggestion the validation pipeline produced.
    pub suggestions: Vec<OptimizationSuggestion>,
    /// High- and medium-impact suggestions, the ones worth acting on
    /// without review.  Low-impact ones are reported only.
    pub applied: Vec<OptimizationSuggestion>,
}
