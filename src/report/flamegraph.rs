// Copyright 2021-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! `flamegraph`: a tree built by stack-prefix sharing, each node storing
//! cumulative value, emitted as nested JSON (spec.md section 4.9).

use crate::model::Profile;
use serde::Serialize;

#[derive(Clone, Debug, Default, Serialize, PartialEq)]
pub struct FlameNode {
    pub name: String,
    pub value: i64,
    pub children: Vec<FlameNode>,
}

impl FlameNode {
    fn insert(&mut self, path: &[&str], value: i64) {
        self.value = self.value.saturating_add(value);
        let Some((head, rest)) = path.split_first() else {
            return;
        };
        let child = match self.children.iter().position(|c| c.name == *head) {
            Some(idx) => &mut self.children[idx],
            None => {
                self.children.push(FlameNode { name: head.to_string(), value: 0, children: Vec::new() });
                self.children.last_mut().unwrap()
            }
        };
        child.insert(rest, value);
    }
}

fn frame_name(profile: &Profile, location_id: crate::model::LocationId) -> String {
    let Some(location) = profile.location(location_id) else {
        return String::new();
    };
    location
        .lines
        .first()
        .and_then(|line| profile.function(line.function_id))
        .map(|f| profile.string(f.name).to_string())
        .unwrap_or_default()
}

/// Builds the flamegraph tree for one sample-value dimension. Stacks are
/// inserted root-first (the reverse of `Sample::location_ids`'s leaf-first
/// order) so that shared callers share a subtree.
pub fn flamegraph(profile: &Profile, sample_index: usize) -> FlameNode {
    let mut root = FlameNode { name: "root".to_string(), value: 0, children: Vec::new() };
    for sample in &profile.samples {
        let Some(&value) = sample.values.get(sample_index) else {
            continue;
        };
        let names: Vec<String> = sample
            .location_ids
            .iter()
            .rev()
            .map(|&id| frame_name(profile, id))
            .collect();
        let path: Vec<&str> = names.iter().map(String::as_str).collect();
        root.insert(&path, value);
    }
    root
}

pub fn to_json(node: &FlameNode) -> serde_json::Result<String> {
    serde_json::to_string(node)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Function, Line, Sample};

    #[test]
    fn shared_prefix_is_merged_into_one_subtree() {
        let mut p = Profile::new(vec![("cpu", "ms")]);
        let mut func = |p: &mut Profile, name: &str| {
            let n = p.intern(name);
            p.add_function(Function { name: n, ..Default::default() })
        };
        let main = func(&mut p, "main");
        let a = func(&mut p, "a");
        let b = func(&mut p, "b");
        let loc_main = p.add_location(None, 0, vec![Line { function_id: main, line: 1 }], false);
        let loc_a = p.add_location(None, 0, vec![Line { function_id: a, line: 1 }], false);
        let loc_b = p.add_location(None, 0, vec![Line { function_id: b, line: 1 }], false);
        p.add_sample(Sample::new(vec![10], vec![loc_a, loc_main], vec![])).unwrap();
        p.add_sample(Sample::new(vec![20], vec![loc_b, loc_main], vec![])).unwrap();

        let tree = flamegraph(&p, 0);
        assert_eq!(30, tree.value);
        assert_eq!(1, tree.children.len());
        let main_node = &tree.children[0];
        assert_eq!("main", main_node.name);
        assert_eq!(30, main_node.value);
        assert_eq!(2, main_node.children.len());
    }
}
