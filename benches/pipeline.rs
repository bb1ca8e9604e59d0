// Copyright 2021-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pprof_core::aggregate::{self, AggregateOptions};
use pprof_core::graph;
use pprof_core::model::{Function, Line, Profile, Sample};
use pprof_core::ops;

/// A profile with `depth`-deep stacks repeated `samples` times, each stack
/// sharing a common suffix so the aggregator and graph builder both have
/// real collapsing work to do.
fn synthetic_profile(depth: usize, samples: usize) -> Profile {
    let mut profile = Profile::new(vec![("cpu", "nanoseconds")]);
    let locations: Vec<_> = (0..depth)
        .map(|i| {
            let name = profile.intern(&format!("frame_{i}"));
            let function = profile.add_function(Function { name, ..Default::default() });
            profile.add_location(None, 0, vec![Line { function_id: function, line: (i as i64) + 1 }], false)
        })
        .collect();

    for i in 0..samples {
        let stack: Vec<_> = locations.iter().rev().take(1 + i % depth).cloned().collect();
        profile.add_sample(Sample::new(vec![100], stack, vec![])).unwrap();
    }
    profile
}

fn bench_merge(c: &mut Criterion) {
    c.bench_function("merge two 5000-sample profiles", |b| {
        b.iter(|| {
            let a = synthetic_profile(16, 5_000);
            let b_profile = synthetic_profile(16, 5_000);
            black_box(ops::merge(vec![a, b_profile]).unwrap())
        })
    });
}

fn bench_aggregate(c: &mut Criterion) {
    let profile = synthetic_profile(16, 10_000);
    c.bench_function("aggregate 10000 samples at functions granularity", |b| {
        b.iter(|| black_box(aggregate::aggregate(&profile, &AggregateOptions::default())))
    });
}

fn bench_graph_build(c: &mut Criterion) {
    let profile = aggregate::aggregate(&synthetic_profile(16, 10_000), &AggregateOptions::default());
    c.bench_function("build graph from 10000 aggregated samples", |b| {
        b.iter(|| black_box(graph::build(&profile, 0, false)))
    });
}

criterion_group!(benches, bench_merge, bench_aggregate, bench_graph_build);
criterion_main!(benches);
