// Copyright 2021-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! `top`/`text`: a flat list of nodes sorted by flat or cumulative weight
//! (spec.md section 4.9).

use crate::config::SortKey;
use crate::graph::Graph;

#[derive(Clone, Debug, PartialEq)]
pub struct TopRow {
    pub flat: i64,
    pub flat_pct: f64,
    /// Running total of `flat_pct` down the sorted list.
    pub sum_pct: f64,
    pub cum: i64,
    pub cum_pct: f64,
    pub name: String,
    pub is_inlined: bool,
}

fn percent(value: i64, base: i64) -> f64 {
    if base == 0 {
        0.0
    } else {
        100.0 * (value as f64) / (base as f64)
    }
}

/// Builds the `top`/`text` rows. `percentage_base` is whichever total
/// `relative_percentages` resolved to (spec.md section 4.5).
pub fn top(graph: &Graph, percentage_base: i64, sort: SortKey) -> Vec<TopRow> {
    let mut nodes: Vec<&crate::graph::Node> = graph.nodes.iter().collect();
    match sort {
        SortKey::Flat => nodes.sort_by(|a, b| b.flat.unsigned_abs().cmp(&a.flat.unsigned_abs())),
        SortKey::Cum => nodes.sort_by(|a, b| b.cum.unsigned_abs().cmp(&a.cum.unsigned_abs())),
    }

    let mut running = 0.0f64;
    nodes
        .into_iter()
        .map(|n| {
            let flat_pct = percent(n.flat, percentage_base);
            running += flat_pct;
            TopRow {
                flat: n.flat,
                flat_pct,
                sum_pct: running,
                cum: n.cum,
                cum_pct: percent(n.cum, percentage_base),
                name: n.name.clone(),
                is_inlined: n.is_inlined,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::AggregateOptions;
    use crate::filter::FilterOptions;
    use crate::graph::trim::TrimOptions;
    use crate::model::{Function, Line, Profile, Sample};
    use crate::report::pipeline;

    /// spec.md section 8 scenario 1.
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
    fn scenario_one_top_on_simple_profile() {
        let p = three_function_profile();
        let out = pipeline::run(
            &p,
            &FilterOptions::new(),
            &AggregateOptions::default(),
            Some(&TrimOptions::default()),
            0,
            true,
        );
        let rows = top(&out.result.graph, out.result.percentage_base, SortKey::Flat);
        let by_name = |n: &str| rows.iter().find(|r| r.name == n).unwrap();
        assert_eq!((200, 300), (by_name("F2").flat, by_name("F2").cum));
        assert_eq!((0, 300), (by_name("F1").flat, by_name("F1").cum));
        assert_eq!((100, 100), (by_name("F3").flat, by_name("F3").cum));
    }

    #[test]
    fn scenario_three_ignore_filter() {
        let p = three_function_profile();
        let mut opts = FilterOptions::new();
        opts.ignore = Some(regex::Regex::new("^F3$").unwrap());
        let out = pipeline::run(&p, &opts, &AggregateOptions::default(), Some(&TrimOptions::default()), 0, true);
        let rows = top(&out.result.graph, out.result.percentage_base, SortKey::Flat);
        assert_eq!(2, rows.len());
        let by_name = |n: &str| rows.iter().find(|r| r.name == n).unwrap();
        assert_eq!((200, 200), (by_name("F2").flat, by_name("F2").cum));
        assert_eq!((0, 200), (by_name("F1").flat, by_name("F1").cum));
    }
}
