//! Advisory rules: timeout sanity and parallelization opportunities.

use crate::graph::DependencyGraph;
use crate::model::WorkflowConfig;

use super::types::{Category, Findings, Impact, Severity};

/// Effective timeouts above this are flagged as a risk.
pub const LONG_TIMEOUT_MS: u64 = 300_000;

pub fn validate(config: &WorkflowConfig) -> Findings {
    let mut findings = Findings::default();
    timeout_sanity(config, &mut findings);
    parallelization(config, &mut findings);
    findings
}

fn timeout_sanity(config: &WorkflowConfig, findings: &mut Findings) {
    for step in config.all_steps() {
        match config.effective_timeout(step) {
            Some(timeout) if timeout > LONG_TIMEOUT_MS => {
                findings.warn(
                    "W201",
                    format!(
                        "Step '{}' has a very long timeout ({} ms)",
                        step.id, timeout
                    ),
                    Some(step.id.clone()),
                    Severity::Medium,
                );
            }
            _ => {}
        }

        if step.timeout.is_none() {
            findings.suggest(
                format!("Step '{}' has no explicit timeout", step.id),
                Impact::Low,
                Category::Reliability,
                Some(format!("Set a timeout for step '{}'", step.id)),
            );
        }
    }
}

fn parallelization(config: &WorkflowConfig, findings: &mut Findings) {
    let graph = DependencyGraph::new(config);
    for group in graph.independent_groups() {
        if group.len() < 2 {
            continue;
        }
        let ids: Vec<&str> = group.iter().map(|s| s.id.as_str()).collect();
        findings.suggest(
            format!("{} independent steps could run concurrently", group.len()),
            Impact::High,
            Category::Performance,
            Some(format!(
                "Group steps {} under a parallel step",
                ids.join(", ")
            )),
        );
    }
}
