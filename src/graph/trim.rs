// Copyright 2021-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Drops low-weight nodes/edges and reroutes the traffic that passed
//! through a dropped node into residual edges (spec.md section 4.8).

use crate::graph::{Edge, Graph, NodeKey};
use crate::model::ids::FxIndexMap;
use std::collections::HashSet;

#[derive(Clone, Debug)]
pub struct TrimOptions {
    pub node_fraction: f64,
    pub edge_fraction: f64,
    /// Negative means uncapped (spec.md section 4.8).
    pub node_count: i64,
    pub enabled: bool,
}

impl Default for TrimOptions {
    fn default() -> Self {
        Self {
            node_fraction: 0.0,
            edge_fraction: 0.0,
            node_count: -1,
            enabled: true,
        }
    }
}

/// Applies `options` to `graph`. A no-op (clone) when `options.enabled` is
/// `false`, matching spec.md section 4.8's carve-out for `trim = false`
/// and for commands that need the complete graph (`proto`, raw output,
/// `peek`) — those commands simply never call this function.
pub fn trim(graph: &Graph, options: &TrimOptions) -> Graph {
    if !options.enabled {
        return graph.clone();
    }

    let total = graph.total_cum().max(1) as f64;

    let mut candidates: Vec<&crate::graph::Node> = graph
        .nodes
        .iter()
        .filter(|n| (n.cum.unsigned_abs() as f64) / total >= options.node_fraction)
        .collect();
    // `graph.nodes` is already sorted by (-|cum|, name, file); preserve it.
    candidates.sort_by(|a, b| b.cum.unsigned_abs().cmp(&a.cum.unsigned_abs()));
    if options.node_count >= 0 {
        candidates.truncate(options.node_count as usize);
    }
    let survivors: HashSet<NodeKey> = candidates.iter().map(|n| n.key.clone()).collect();

    // Forward adjacency over the *original* graph, used to bridge dropped
    // nodes via transitive closure (spec.md section 4.7's residual edges).
    let mut successors: FxIndexMap<NodeKey, Vec<(NodeKey, i64)>> = FxIndexMap::default();
    for edge in &graph.edges {
        successors
            .entry(edge.caller.clone())
            .or_default()
            .push((edge.callee.clone(), edge.weight));
    }

    let mut final_edges: FxIndexMap<(NodeKey, NodeKey), (i64, bool)> = FxIndexMap::default();
    for survivor in &survivors {
        let Some(direct) = successors.get(survivor) else {
            continue;
        };
        for (callee, weight) in direct {
            if survivors.contains(callee) {
                let entry = final_edges.entry((survivor.clone(), callee.clone())).or_insert((0, false));
                entry.0 = entry.0.saturating_add(*weight);
            } else {
                for (target, bottleneck) in bridge_to_survivors(&successors, &survivors, callee, *weight) {
                    let entry = final_edges.entry((survivor.clone(), target)).or_insert((0, true));
                    entry.0 = entry.0.saturating_add(bottleneck);
                    entry.1 = true;
                }
            }
        }
    }

    let mut edges: Vec<Edge> = final_edges
        .into_iter()
        .filter(|(_, (weight, _))| (weight.unsigned_abs() as f64) / total >= options.edge_fraction)
        .map(|((caller, callee), (weight, residual))| Edge { caller, callee, weight, residual })
        .collect();
    edges.sort_by(|a, b| {
        a.weight
            .unsigned_abs()
            .cmp(&b.weight.unsigned_abs())
            .reverse()
            .then_with(|| a.callee.cmp(&b.callee))
            .then_with(|| a.caller.cmp(&b.caller))
    });

    let mut nodes: Vec<crate::graph::Node> = graph
        .nodes
        .iter()
        .filter(|n| survivors.contains(&n.key))
        .cloned()
        .collect();
    nodes.sort_by(|a, b| {
        a.cum
            .unsigned_abs()
            .cmp(&b.cum.unsigned_abs())
            .reverse()
            .then_with(|| a.name.cmp(&b.name))
            .then_with(|| a.file.cmp(&b.file))
    });

    tracing::debug!(
        nodes_before = graph.nodes.len(),
        nodes_after = nodes.len(),
        edges_after = edges.len(),
        "trimmed call graph"
    );
    Graph { nodes, edges }
}

/// Walks forward from a dropped node through other dropped nodes only,
/// collecting `(survivor, bottleneck_weight)` for every survivor reachable
/// without passing through another survivor first. The bottleneck for a
/// path is its minimum edge weight, approximating the through-traffic
/// carried along that path (spec.md section 4.7).
fn bridge_to_survivors(
    successors: &FxIndexMap<NodeKey, Vec<(NodeKey, i64)>>,
    survivors: &HashSet<NodeKey>,
    start: &NodeKey,
    incoming_weight: i64,
) -> Vec<(NodeKey, i64)> {
    let mut results = Vec::new();
    let mut stack = vec![(start.clone(), incoming_weight)];
    let mut visited: HashSet<NodeKey> = HashSet::new();

    while let Some((node, bottleneck)) = stack.pop() {
        if !visited.insert(node.clone()) {
            continue;
        }
        let Some(next) = successors.get(&node) else {
            continue;
        };
        for (succ, weight) in next {
            let new_bottleneck = bottleneck.min(*weight);
            if survivors.contains(succ) {
                results.push((succ.clone(), new_bottleneck));
            } else {
                stack.push((succ.clone(), new_bottleneck));
            }
        }
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::build;
    use crate::model::{Function, Line, Profile, Sample};
    use proptest::prelude::*;

    fn chain_profile() -> Profile {
        // main -> helper -> leaf on a small sample; separate large
        // single-frame samples give `main` and `leaf` enough cumulative
        // weight to survive nodefraction trimming while `helper` (whose
        // only weight comes from the small shared sample) gets dropped.
        let mut p = Profile::new(vec![("cpu", "ms")]);
        let mut func = |p: &mut Profile, name: &str| {
            let n = p.intern(name);
            p.add_function(Function { name: n, ..Default::default() })
        };
        let main = func(&mut p, "main");
        let helper = func(&mut p, "helper");
        let leaf = func(&mut p, "leaf");
        let loc_main = p.add_location(None, 0, vec![Line { function_id: main, line: 1 }], false);
        let loc_helper = p.add_location(None, 0, vec![Line { function_id: helper, line: 1 }], false);
        let loc_leaf = p.add_location(None, 0, vec![Line { function_id: leaf, line: 1 }], false);
        p.add_sample(Sample::new(vec![1], vec![loc_leaf, loc_helper, loc_main], vec![]))
            .unwrap();
        p.add_sample(Sample::new(vec![1000], vec![loc_main], vec![])).unwrap();
        p.add_sample(Sample::new(vec![400], vec![loc_leaf], vec![])).unwrap();
        p
    }

    #[test]
    fn dropped_node_produces_a_residual_edge_between_survivors() {
        let p = chain_profile();
        let graph = build(&p, 0, false);
        let options = TrimOptions {
            node_fraction: 0.01,
            edge_fraction: 0.0,
            node_count: -1,
            enabled: true,
        };
        let trimmed = trim(&graph, &options);
        assert!(!trimmed.nodes.iter().any(|n| n.name == "helper"));
        let residual = trimmed.edges.iter().find(|e| e.residual);
        assert!(residual.is_some());
        assert_eq!(1, residual.unwrap().weight);
    }

    #[test]
    fn disabled_trim_is_a_no_op() {
        let p = chain_profile();
        let graph = build(&p, 0, false);
        let trimmed = trim(&graph, &TrimOptions { enabled: false, ..Default::default() });
        assert_eq!(graph.nodes.len(), trimmed.nodes.len());
        assert_eq!(graph.edges.len(), trimmed.edges.len());
    }

    #[test]
    fn node_count_caps_survivors_to_largest_cum() {
        let p = chain_profile();
        let graph = build(&p, 0, false);
        let options = TrimOptions { node_fraction: 0.0, edge_fraction: 0.0, node_count: 1, enabled: true };
        let trimmed = trim(&graph, &options);
        assert_eq!(1, trimmed.nodes.len());
        assert_eq!("main", trimmed.nodes[0].name);
    }

    /// Builds `main -> mid_1 -> ... -> mid_n -> leaf`, all linked by one
    /// sample of weight `shared_weight`, plus big separate samples on
    /// `main` and `leaf` so they always survive nodefraction trimming
    /// while every `mid_i` always gets dropped.
    fn deep_chain_profile(middle_count: usize, shared_weight: i64) -> Profile {
        let mut p = Profile::new(vec![("cpu", "ms")]);
        let mut func = |p: &mut Profile, name: String| {
            let n = p.intern(&name);
            p.add_function(Function { name: n, ..Default::default() })
        };
        let main = func(&mut p, "main".to_string());
        let mids: Vec<_> = (0..middle_count)
            .map(|i| func(&mut p, format!("mid_{i}")))
            .collect();
        let leaf = func(&mut p, "leaf".to_string());

        let loc = |p: &mut Profile, f: crate::model::FunctionId| {
            p.add_location(None, 0, vec![Line { function_id: f, line: 1 }], false)
        };
        let loc_main = loc(&mut p, main);
        let loc_mids: Vec<_> = mids.iter().map(|&f| loc(&mut p, f)).collect();
        let loc_leaf = loc(&mut p, leaf);

        let mut chain = vec![loc_leaf];
        chain.extend(loc_mids.iter().rev().copied());
        chain.push(loc_main);
        p.add_sample(Sample::new(vec![shared_weight], chain, vec![])).unwrap();
        p.add_sample(Sample::new(vec![10_000], vec![loc_main], vec![])).unwrap();
        p.add_sample(Sample::new(vec![10_000], vec![loc_leaf], vec![])).unwrap();
        p
    }

    proptest! {
        /// spec.md section 8: trim preservation — surviving-node cum plus
        /// trimmed-node cum equals the pre-trim total, and for a chain of
        /// equal-weight edges the residual edge's through-weight equals
        /// that shared weight, matching spec.md section 4.7.
        #[test]
        fn trim_preserves_total_cum_and_residual_through_weight(
            middle_count in 1usize..5,
            shared_weight in 1i64..50,
        ) {
            let p = deep_chain_profile(middle_count, shared_weight);
            let graph = build(&p, 0, false);
            let options = TrimOptions { node_fraction: 0.01, edge_fraction: 0.0, node_count: -1, enabled: true };
            let trimmed = trim(&graph, &options);

            let cum_before: i64 = graph.nodes.iter().map(|n| n.cum).sum();
            let cum_survivors: i64 = trimmed.nodes.iter().map(|n| n.cum).sum();
            let dropped_names: std::collections::HashSet<_> =
                graph.nodes.iter().map(|n| n.name.clone())
                    .filter(|name| !trimmed.nodes.iter().any(|s| &s.name == name))
                    .collect();
            let cum_dropped: i64 = graph
                .nodes
                .iter()
                .filter(|n| dropped_names.contains(&n.name))
                .map(|n| n.cum)
                .sum();
            prop_assert_eq!(cum_before, cum_survivors + cum_dropped);

            prop_assert!(!trimmed.nodes.iter().any(|n| n.name.starts_with("mid_")));
            let residual = trimmed.edges.iter().find(|e| e.residual);
            prop_assert!(residual.is_some());
            prop_assert_eq!(shared_weight, residual.unwrap().weight);
        }
    }
}
