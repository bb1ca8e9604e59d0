// Copyright 2021-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Builds a directed multigraph from a (post-filter, post-aggregation)
//! profile's samples (spec.md section 4.7).

pub mod trim;

use crate::model::ids::FxIndexMap;
use crate::model::{LocationId, Profile};
use std::collections::HashSet;

/// Identifies a graph node: the aggregated frame, optionally extended by
/// the full calling path in `call_tree` mode, in which case two
/// occurrences of the same frame reached via different callers are
/// distinct nodes (spec.md section 4.7).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeKey {
    pub location_id: LocationId,
    pub call_path: Option<Vec<LocationId>>,
}

#[derive(Clone, Debug)]
pub struct Node {
    pub key: NodeKey,
    pub flat: i64,
    pub cum: i64,
    pub name: String,
    pub file: String,
    /// True if this node's location folds more than one inlined line
    /// (spec.md section 4.9's "inlined-indicator" column).
    pub is_inlined: bool,
}

impl Node {
    fn new(key: NodeKey, profile: &Profile) -> Self {
        let location = profile.location(key.location_id);
        let (name, file, is_inlined) = match location.and_then(|l| l.lines.first().map(|line| (l, line))) {
            Some((location, line)) => {
                let function = profile.function(line.function_id);
                let name = function.map(|f| profile.string(f.name)).unwrap_or("").to_string();
                let file = function.map(|f| profile.string(f.filename)).unwrap_or("").to_string();
                (name, file, location.lines.len() > 1)
            }
            None => (String::new(), String::new(), false),
        };
        Self { key, flat: 0, cum: 0, name, file, is_inlined }
    }
}

#[derive(Clone, Debug)]
pub struct Edge {
    pub caller: NodeKey,
    pub callee: NodeKey,
    pub weight: i64,
    /// Set when this edge was synthesized by the trimmer to bridge a
    /// dropped node (spec.md section 4.7's residual edges / section 4.8).
    pub residual: bool,
}

#[derive(Clone, Debug, Default)]
pub struct Graph {
    /// Sorted by `(-|cum|, name, file)` (spec.md section 4.7).
    pub nodes: Vec<Node>,
    /// Sorted by `(-|weight|, callee, caller)` (spec.md section 4.7).
    pub edges: Vec<Edge>,
}

impl Graph {
    /// Sum of `|cum|` over every node (spec.md section 4.8's total `T`).
    pub fn total_cum(&self) -> i64 {
        self.nodes.iter().map(|n| n.cum.unsigned_abs() as i64).sum()
    }

    pub fn successors(&self, key: &NodeKey) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(move |e| &e.caller == key)
    }

    pub fn predecessors(&self, key: &NodeKey) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(move |e| &e.callee == key)
    }
}

fn tie_break_nodes(a: &Node, b: &Node) -> std::cmp::Ordering {
    a.cum
        .unsigned_abs()
        .cmp(&b.cum.unsigned_abs())
        .reverse()
        .then_with(|| a.name.cmp(&b.name))
        .then_with(|| a.file.cmp(&b.file))
}

fn tie_break_edges(a: &Edge, b: &Edge) -> std::cmp::Ordering {
    a.weight
        .unsigned_abs()
        .cmp(&b.weight.unsigned_abs())
        .reverse()
        .then_with(|| a.callee.cmp(&b.callee))
        .then_with(|| a.caller.cmp(&b.caller))
}

/// Builds the call graph for one sample-value dimension (spec.md section
/// 4.7). Node identity is the frame's location id; in `call_tree` mode it
/// is additionally keyed by the full caller path, so recursion no longer
/// collapses into a single node.
pub fn build(profile: &Profile, sample_index: usize, call_tree: bool) -> Graph {
    let mut nodes: FxIndexMap<NodeKey, Node> = FxIndexMap::default();
    let mut edges: FxIndexMap<(NodeKey, NodeKey), i64> = FxIndexMap::default();

    for sample in &profile.samples {
        let Some(&value) = sample.values.get(sample_index) else {
            continue;
        };
        if sample.location_ids.is_empty() {
            continue;
        }

        let keys: Vec<NodeKey> = sample
            .location_ids
            .iter()
            .enumerate()
            .map(|(i, &location_id)| NodeKey {
                location_id,
                call_path: if call_tree {
                    Some(sample.location_ids[i + 1..].to_vec())
                } else {
                    None
                },
            })
            .collect();

        let leaf_node = nodes
            .entry(keys[0].clone())
            .or_insert_with_key(|k| Node::new(k.clone(), profile));
        leaf_node.flat = leaf_node.flat.saturating_add(value);

        let mut seen: HashSet<NodeKey> = HashSet::new();
        for key in &keys {
            if seen.insert(key.clone()) {
                let node = nodes
                    .entry(key.clone())
                    .or_insert_with_key(|k| Node::new(k.clone(), profile));
                node.cum = node.cum.saturating_add(value);
            }
        }

        for i in 0..keys.len() - 1 {
            let caller = keys[i + 1].clone();
            let callee = keys[i].clone();
            let entry = edges.entry((caller, callee)).or_insert(0);
            *entry = entry.saturating_add(value);
        }
    }

    let mut node_vec: Vec<Node> = nodes.into_values().collect();
    node_vec.sort_by(tie_break_nodes);

    let mut edge_vec: Vec<Edge> = edges
        .into_iter()
        .map(|((caller, callee), weight)| Edge { caller, callee, weight, residual: false })
        .collect();
    edge_vec.sort_by(tie_break_edges);

    tracing::debug!(nodes = node_vec.len(), edges = edge_vec.len(), "built call graph");
    Graph { nodes: node_vec, edges: edge_vec }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Function, Line, Profile, Sample};

    /// spec.md section 8 scenario 1: F1,F2,F3, samples
    /// `{[F3,F2,F1]:100, [F2,F1]:200}`. Expected flat/cum:
    /// `(200,300,F2), (0,300,F1), (100,100,F3)`.
    fn three_function_profile() -> Profile {
        let mut p = Profile::new(vec![("cpu", "ms")]);
        let mut func = |p: &mut Profile, name: &str| {
            let n = p.intern(name);
            p.add_function(Function { name: n, ..Default::default() })
        };
        let f1 = func(&mut p, "F1");
        let f2 = func(&mut p, "F2");
        let f3 = func(&mut p, "F3");
        let loc1 = p.add_location(None, 0, vec![Line { function_id: f1, line: 1 }], false);
        let loc2 = p.add_location(None, 0, vec![Line { function_id: f2, line: 1 }], false);
        let loc3 = p.add_location(None, 0, vec![Line { function_id: f3, line: 1 }], false);
        p.add_sample(Sample::new(vec![100], vec![loc3, loc2, loc1], vec![])).unwrap();
        p.add_sample(Sample::new(vec![200], vec![loc2, loc1], vec![])).unwrap();
        p
    }

    #[test]
    fn matches_spec_scenario_one_flat_and_cum() {
        let p = three_function_profile();
        let graph = build(&p, 0, false);
        let by_name = |n: &str| graph.nodes.iter().find(|node| node.name == n).unwrap();
        assert_eq!((200, 300), (by_name("F2").flat, by_name("F2").cum));
        assert_eq!((0, 300), (by_name("F1").flat, by_name("F1").cum));
        assert_eq!((100, 100), (by_name("F3").flat, by_name("F3").cum));
    }

    #[test]
    fn nodes_are_tie_broken_by_cum_then_name() {
        let p = three_function_profile();
        let graph = build(&p, 0, false);
        let names: Vec<&str> = graph.nodes.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(vec!["F2", "F1", "F3"], names);
    }

    #[test]
    fn edges_sum_weight_along_adjacent_pairs() {
        let p = three_function_profile();
        let graph = build(&p, 0, false);
        assert_eq!(2, graph.edges.len());
        let total_edge_weight: i64 = graph.edges.iter().map(|e| e.weight).sum();
        assert_eq!(400, total_edge_weight);
    }
}
