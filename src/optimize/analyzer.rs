use crate::graph::DependencyGraph;
use crate::model::{Step, StepKind, WorkflowConfig};
use crate::validation::{self, Impact};

use super::{CacheCandidate, OptimizedWorkflow, ParallelGroup, TimeoutRecommendation};

/// Assumed duration for a step with no timeout when estimating speedups.
const DEFAULT_STEP_MS: u64 = 30_000;
/// Baseline duration of a feature invocation.
const FEATURE_BASE_MS: f64 = 15_000.0;
/// Recommended timeouts never exceed this.
const FEATURE_CAP_MS: u64 = 120_000;
/// Coordination margin added on top of a parallel step's slowest child.
const PARALLEL_MARGIN_MS: u64 = 5_000;
/// Baseline TTL for cached feature results.
const CACHE_TTL_MS: u64 = 3_600_000;

/// Validate, then derive the optimization structures for a snapshot.
pub fn analyze(config: &WorkflowConfig) -> OptimizedWorkflow {
    tracing::debug!(workflow = %config.id, "analyzing workflow");

    let report = validation::validate_config(config);
    let suggestions = report.optimizations;
    let applied = suggestions
        .iter()
        .filter(|s| matches!(s.impact, Impact::High | Impact::Medium))
        .cloned()
        .collect();

    OptimizedWorkflow {
        parallel_groups: parallel_groups(config),
        cache_candidates: cache_candidates(config),
        timeout_recommendations: timeout_recommendations(config),
        suggestions,
        applied,
        config: config.clone(),
    }
}

/// Greedy independent-group discovery in declaration order.  Singleton
/// groups carry no fan-out value and are dropped.
fn parallel_groups(config: &WorkflowConfig) -> Vec<ParallelGroup> {
    let graph = DependencyGraph::new(config);
    graph
        .independent_groups()
        .into_iter()
        .filter(|group| group.len() >= 2)
        .map(|group| {
            let timeouts: Vec<u64> = group
                .iter()
                .map(|s| config.effective_timeout(s).unwrap_or(DEFAULT_STEP_MS))
                .collect();
            let total: u64 = timeouts.iter().sum();
            // All-zero timeouts would otherwise divide 0 by 0.
            let max = timeouts
                .iter()
                .copied()
                .max()
                .unwrap_or(DEFAULT_STEP_MS)
                .max(1);
            ParallelGroup {
                step_ids: group.iter().map(|s| s.id.clone()).collect(),
                estimated_speedup: total as f64 / max as f64,
            }
        })
        .collect()
}

/// Every feature step, at any depth, is a caching candidate.
fn cache_candidates(config: &WorkflowConfig) -> Vec<CacheCandidate> {
    config
        .all_steps()
        .into_iter()
        .filter_map(|step| match &step.kind {
            StepKind::Feature {
                feature, operation, ..
            } => Some(CacheCandidate {
                step_id: step.id.clone(),
                cache_key: format!("{}-{}", feature, operation),
                ttl_ms: CACHE_TTL_MS,
            }),
            _ => None,
        })
        .collect()
}

fn timeout_recommendations(config: &WorkflowConfig) -> Vec<TimeoutRecommendation> {
    config
        .all_steps()
        .into_iter()
        .map(|step| TimeoutRecommendation {
            step_id: step.id.clone(),
            recommended_ms: recommend_timeout(step),
        })
        .collect()
}

/// Recursive per-step recommendation.  Feature steps scale a 15 s base by
/// complexity multipliers inferred from the operation name; containers
/// combine their children (max+margin for parallel, sum for sequential,
/// worst branch for conditional).  Fallback steps are not counted.
pub fn recommend_timeout(step: &Step) -> u64 {
    match &step.kind {
        StepKind::Feature { operation, .. } => {
            let mut ms = FEATURE_BASE_MS;
            if operation.contains("comprehensive") {
                ms *= 2.0;
            }
            if operation.contains("detailed") {
                ms *= 1.5;
            }
            if operation.contains("analysis") {
                ms *= 1.3;
            }
            (ms.round() as u64).min(FEATURE_CAP_MS)
        }
        StepKind::Parallel { steps } => {
            steps.iter().map(recommend_timeout).max().unwrap_or(0) + PARALLEL_MARGIN_MS
        }
        StepKind::Sequential { steps } => steps.iter().map(recommend_timeout).sum(),
        StepKind::Conditional {
            if_true, if_false, ..
        } => {
            let true_ms: u64 = if_true.iter().map(recommend_timeout).sum();
            let false_ms: u64 = if_false.iter().map(recommend_timeout).sum();
            true_ms.max(false_ms)
        }
    }
}
