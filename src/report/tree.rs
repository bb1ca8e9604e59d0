// Copyright 2021-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! `tree`: for each node, its callers and callees with per-edge weights
//! (spec.md section 4.9).

use crate::graph::Graph;

#[derive(Clone, Debug, PartialEq)]
pub struct TreeEdgeView {
    pub name: String,
    pub weight: i64,
    pub residual: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TreeNodeView {
    pub name: String,
    pub flat: i64,
    pub cum: i64,
    pub callers: Vec<TreeEdgeView>,
    pub callees: Vec<TreeEdgeView>,
}

fn node_name(graph: &Graph, key: &crate::graph::NodeKey) -> String {
    graph
        .nodes
        .iter()
        .find(|n| &n.key == key)
        .map(|n| n.name.clone())
        .unwrap_or_default()
}

pub fn tree(graph: &Graph) -> Vec<TreeNodeView> {
    graph
        .nodes
        .iter()
        .map(|n| {
            let callers = graph
                .predecessors(&n.key)
                .map(|e| TreeEdgeView { name: node_name(graph, &e.caller), weight: e.weight, residual: e.residual })
                .collect();
            let callees = graph
                .successors(&n.key)
                .map(|e| TreeEdgeView { name: node_name(graph, &e.callee), weight: e.weight, residual: e.residual })
                .collect();
            TreeNodeView { name: n.name.clone(), flat: n.flat, cum: n.cum, callers, callees }
        })
        .collect()
}

/// `peek`: callers and callees of every node whose name matches `regex`
/// (spec.md section 4.9).
pub fn peek(graph: &Graph, regex: &regex::Regex) -> Vec<TreeNodeView> {
    tree(graph).into_iter().filter(|n| regex.is_match(&n.name)).collect()
}
