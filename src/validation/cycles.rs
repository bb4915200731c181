//! Dependency cycle detection.
//!
//! Three-color depth-first search over the id adjacency of the flattened
//! step list.  Each top-level DFS invocation that hits a cycle records
//! exactly one error whose message spells the cycle path in discovery
//! order, e.g. `a -> b -> c -> a`.  Disjoint cycles are found by restarting
//! from unvisited roots.  The reported cycle is not a canonical form.

use std::collections::HashMap;

use crate::model::WorkflowConfig;

use super::types::Findings;

const WHITE: u8 = 0;
const GRAY: u8 = 1;
const BLACK: u8 = 2;

pub fn validate(config: &WorkflowConfig) -> Findings {
    let mut findings = Findings::default();
    let steps = config.all_steps();

    let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::new();
    for step in &steps {
        adjacency.entry(step.id.as_str()).or_default();
    }
    for step in &steps {
        let deps = adjacency.entry(step.id.as_str()).or_default();
        for dep in &step.dependencies {
            deps.push(dep.as_str());
        }
    }

    let mut state: HashMap<&str, u8> = HashMap::new();
    let mut path: Vec<&str> = Vec::new();

    for step in &steps {
        if state.get(step.id.as_str()).copied().unwrap_or(WHITE) == WHITE {
            if let Some(cycle) = visit(step.id.as_str(), &adjacency, &mut state, &mut path) {
                findings.error(
                    "E102",
                    format!("Circular dependency detected: {}", cycle.join(" -> ")),
                    cycle.first().map(|id| id.to_string()),
                    Some("dependencies".into()),
                );
            }
        }
    }

    findings
}

fn visit<'a>(
    node: &'a str,
    adjacency: &HashMap<&'a str, Vec<&'a str>>,
    state: &mut HashMap<&'a str, u8>,
    path: &mut Vec<&'a str>,
) -> Option<Vec<&'a str>> {
    state.insert(node, GRAY);
    path.push(node);

    if let Some(deps) = adjacency.get(node) {
        for &dep in deps {
            match state.get(dep).copied().unwrap_or(WHITE) {
                WHITE if adjacency.contains_key(dep) => {
                    if let Some(cycle) = visit(dep, adjacency, state, path) {
                        path.pop();
                        state.insert(node, BLACK);
                        return Some(cycle);
                    }
                }
                GRAY => {
                    // Back edge: the cycle is the path suffix from the
                    // first occurrence of the repeated id.
                    let pos = path.iter().position(|&n| n == dep).unwrap_or(0);
                    let mut cycle = path[pos..].to_vec();
                    cycle.push(dep);
                    path.pop();
                    state.insert(node, BLACK);
                    return Some(cycle);
                }
                _ => {}
            }
        }
    }

    path.pop();
    state.insert(node, BLACK);
    None
}
