//! Dependency-graph view over a config snapshot.
//!
//! Steps are kept as a flat list with string-id edges; this module
//! materializes a [`StableDiGraph`] plus an id→index map for neighbor
//! queries and independence analysis.  Edges point from a step to each of
//! its declared dependencies.  Unresolved dependency ids produce no edge
//! here; the validator reports them separately.

use std::collections::{HashMap, HashSet};

use petgraph::stable_graph::{NodeIndex, StableDiGraph};

use crate::model::{Step, WorkflowConfig};

pub struct DependencyGraph<'a> {
    graph: StableDiGraph<&'a Step, ()>,
    index: HashMap<&'a str, NodeIndex>,
    /// Document order of all steps, parents before children.
    order: Vec<NodeIndex>,
    /// For each step id, the ids of its enclosing container steps.
    ancestors: HashMap<&'a str, HashSet<&'a str>>,
}

impl<'a> DependencyGraph<'a> {
    pub fn new(config: &'a WorkflowConfig) -> Self {
        let mut graph = StableDiGraph::new();
        let mut index: HashMap<&'a str, NodeIndex> = HashMap::new();
        let mut order = Vec::new();
        let mut ancestors: HashMap<&'a str, HashSet<&'a str>> = HashMap::new();

        let mut chain: Vec<&'a str> = Vec::new();
        let mut flat: Vec<(&'a Step, HashSet<&'a str>)> = Vec::new();
        collect(&config.steps, &mut chain, &mut flat);

        for (step, enclosing) in flat {
            let idx = graph.add_node(step);
            // First occurrence wins on duplicate ids; the validator flags
            // the duplicate itself.
            index.entry(step.id.as_str()).or_insert(idx);
            order.push(idx);
            ancestors.insert(step.id.as_str(), enclosing);
        }

        for &idx in &order {
            let step = graph[idx];
            for dep in &step.dependencies {
                if let Some(&dep_idx) = index.get(dep.as_str()) {
                    graph.add_edge(idx, dep_idx, ());
                }
            }
        }

        DependencyGraph {
            graph,
            index,
            order,
            ancestors,
        }
    }

    /// All steps in document order.
    pub fn steps(&self) -> Vec<&'a Step> {
        self.order.iter().map(|&idx| self.graph[idx]).collect()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Ids this step declares a dependency on (resolved ones only).
    pub fn dependencies_of(&self, id: &str) -> Vec<&'a str> {
        self.neighbors(id, petgraph::Direction::Outgoing)
    }

    /// Ids that declare a dependency on this step.
    pub fn dependents_of(&self, id: &str) -> Vec<&'a str> {
        self.neighbors(id, petgraph::Direction::Incoming)
    }

    fn neighbors(&self, id: &str, dir: petgraph::Direction) -> Vec<&'a str> {
        match self.index.get(id) {
            Some(&idx) => self
                .graph
                .neighbors_directed(idx, dir)
                .map(|n| self.graph[n].id.as_str())
                .collect(),
            None => Vec::new(),
        }
    }

    /// Direct dependency edge between two steps, in either direction.
    pub fn has_edge(&self, a: &str, b: &str) -> bool {
        match (self.index.get(a), self.index.get(b)) {
            (Some(&ia), Some(&ib)) => {
                self.graph.find_edge(ia, ib).is_some() || self.graph.find_edge(ib, ia).is_some()
            }
            _ => false,
        }
    }

    /// One step nests inside the other.
    pub fn is_nested(&self, a: &str, b: &str) -> bool {
        self.ancestors.get(a).is_some_and(|set| set.contains(b))
            || self.ancestors.get(b).is_some_and(|set| set.contains(a))
    }

    /// Steps are independent when neither depends on the other and neither
    /// contains the other.
    pub fn independent(&self, a: &str, b: &str) -> bool {
        !self.has_edge(a, b) && !self.is_nested(a, b)
    }

    /// Greedy grouping of mutually independent steps, in document order:
    /// each unprocessed step seeds a group and absorbs every later
    /// unprocessed step independent of all current members.  Deterministic
    /// for a given snapshot, so repeated runs yield identical groups.
    pub fn independent_groups(&self) -> Vec<Vec<&'a Step>> {
        let steps = self.steps();
        let mut processed: HashSet<&str> = HashSet::new();
        let mut groups = Vec::new();

        for seed in &steps {
            if processed.contains(seed.id.as_str()) {
                continue;
            }
            processed.insert(seed.id.as_str());
            let mut group = vec![*seed];
            for candidate in &steps {
                if processed.contains(candidate.id.as_str()) {
                    continue;
                }
                if group
                    .iter()
                    .all(|member| self.independent(member.id.as_str(), candidate.id.as_str()))
                {
                    processed.insert(candidate.id.as_str());
                    group.push(*candidate);
                }
            }
            groups.push(group);
        }

        groups
    }
}

fn collect<'a>(
    steps: &'a [Step],
    chain: &mut Vec<&'a str>,
    out: &mut Vec<(&'a Step, HashSet<&'a str>)>,
) {
    for step in steps {
        out.push((step, chain.iter().copied().collect()));
        chain.push(step.id.as_str());
        for child_list in child_lists(step) {
            collect(child_list, chain, out);
        }
        chain.pop();
    }
}

fn child_lists(step: &Step) -> Vec<&[Step]> {
    use crate::model::StepKind;
    match &step.kind {
        StepKind::Feature { .. } => Vec::new(),
        StepKind::Parallel { steps } | StepKind::Sequential { steps } => vec![steps.as_slice()],
        StepKind::Conditional {
            if_true, if_false, ..
        } => vec![if_true.as_slice(), if_false.as_slice()],
    }
}
