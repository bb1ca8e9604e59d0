// Copyright 2021-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Rewrites a profile's locations down to the significant attributes of a
//! chosen [`Granularity`], merging locations and samples that become
//! identical under that reduction (spec.md section 4.6).

pub mod granularity;

pub use granularity::Granularity;

use crate::model::ids::FxIndexMap;
use crate::model::{Function, Line, Location, LocationId, Profile, Sample};

#[derive(Clone, Debug)]
pub struct AggregateOptions {
    pub granularity: Granularity,
    /// Call-tree semantics (spec.md section 4.6): when set, the graph
    /// builder (section 4.7) keys nodes by their full caller path rather
    /// than by frame identity alone. The aggregator itself folds frames
    /// identically either way; this flag is threaded through unchanged for
    /// the graph-building stage to consume.
    pub call_tree: bool,
}

impl Default for AggregateOptions {
    fn default() -> Self {
        Self {
            granularity: Granularity::default(),
            call_tree: false,
        }
    }
}

/// Folds one `Location` down to `granularity`'s significant attributes and
/// interns the result into `dest`, which collapses content-identical
/// locations across the whole profile the same way the merger collapses
/// frames across profiles (see `crate::ops::merge::copy_tables`).
fn fold_location(dest: &mut Profile, src: &Profile, location: &Location, granularity: Granularity) -> LocationId {
    let address = if granularity.keeps_address() { location.address } else { 0 };
    let mapping_id = if granularity.keeps_address() {
        location.mapping_id.map(|id| {
            let m = src.mapping(id).expect("validated profile");
            let filename = dest.intern(src.string(m.filename));
            let build_id = dest.intern(src.string(m.build_id));
            dest.add_mapping(crate::model::Mapping {
                memory_start: m.memory_start,
                memory_limit: m.memory_limit,
                file_offset: m.file_offset,
                filename,
                build_id,
                has_functions: m.has_functions,
                has_filenames: m.has_filenames,
                has_line_numbers: m.has_line_numbers,
                has_inline_frames: m.has_inline_frames,
            })
        })
    } else {
        None
    };

    let source_lines: &[Line] = if granularity.keeps_only_outermost_line() {
        match location.outermost_line() {
            Some(line) => std::slice::from_ref(line),
            None => &[],
        }
    } else {
        &location.lines
    };

    let mut lines: Vec<Line> = source_lines
        .iter()
        .map(|line| {
            let f = src.function(line.function_id).expect("validated profile");
            let name = if granularity.keeps_function_name() {
                dest.intern(src.string(f.name))
            } else {
                crate::model::StringId::ZERO
            };
            let filename = if granularity.keeps_filename() {
                dest.intern(src.string(f.filename))
            } else {
                crate::model::StringId::ZERO
            };
            let function_id = dest.add_function(Function {
                name,
                system_name: crate::model::StringId::ZERO,
                filename,
                start_line: 0,
            });
            let line_number = if granularity.keeps_line_number() { line.line } else { 0 };
            Line { function_id, line: line_number }
        })
        .collect();
    lines.dedup();

    dest.add_location(mapping_id, address, lines, location.is_folded)
}

fn collapse_adjacent(stack: Vec<LocationId>) -> Vec<LocationId> {
    let mut out: Vec<LocationId> = Vec::with_capacity(stack.len());
    for id in stack {
        if out.last() != Some(&id) {
            out.push(id);
        }
    }
    out
}

/// Rewrites `profile` under `options.granularity`, merging samples whose
/// folded stacks (with order-independent labels) become equal, summing
/// their values (spec.md section 4.6).
pub fn aggregate(profile: &Profile, options: &AggregateOptions) -> Profile {
    let mut dest = Profile::new(vec![]);
    dest.sample_types = profile
        .sample_types
        .iter()
        .map(|vt| crate::model::ValueType {
            r#type: dest.intern(profile.string(vt.r#type)),
            unit: dest.intern(profile.string(vt.unit)),
        })
        .collect();
    dest.default_sample_type = profile.default_sample_type;
    dest.period = profile.period.clone().map(|(p, vt)| {
        (
            p,
            crate::model::ValueType {
                r#type: dest.intern(profile.string(vt.r#type)),
                unit: dest.intern(profile.string(vt.unit)),
            },
        )
    });
    dest.time_nanos = profile.time_nanos;
    dest.duration_nanos = profile.duration_nanos;

    let mut location_cache: FxIndexMap<LocationId, LocationId> = FxIndexMap::default();

    let mut sample_index: FxIndexMap<(Vec<LocationId>, Vec<crate::model::Label>), usize> = FxIndexMap::default();
    let mut merged_samples: Vec<Sample> = Vec::new();

    for sample in &profile.samples {
        let folded_stack: Vec<LocationId> = sample
            .location_ids
            .iter()
            .map(|&id| {
                if let Some(&cached) = location_cache.get(&id) {
                    return cached;
                }
                let loc = profile.location(id).expect("validated profile");
                let folded = fold_location(&mut dest, profile, loc, options.granularity);
                location_cache.insert(id, folded);
                folded
            })
            .collect();
        let folded_stack = collapse_adjacent(folded_stack);
        let labels: Vec<crate::model::Label> = sample
            .labels
            .iter()
            .map(|l| {
                let key = dest.intern(profile.string(l.key));
                match l.value {
                    crate::model::LabelValue::Str(s) => crate::model::Label::str(key, dest.intern(profile.string(s))),
                    crate::model::LabelValue::Num { num, num_unit } => {
                        crate::model::Label::num(key, num, dest.intern(profile.string(num_unit)))
                    }
                }
            })
            .collect();

        let new_sample = Sample::new(sample.values.clone(), folded_stack, labels);
        let key = new_sample.dedup_key();
        match sample_index.get(&key) {
            Some(&idx) => {
                for (acc, v) in merged_samples[idx].values.iter_mut().zip(sample.values.iter()) {
                    *acc = acc.saturating_add(*v);
                }
            }
            None => {
                sample_index.insert(key, merged_samples.len());
                merged_samples.push(new_sample);
            }
        }
    }

    dest.samples = merged_samples;
    tracing::debug!(
        granularity = ?options.granularity,
        samples_in = profile.samples.len(),
        samples_out = dest.samples.len(),
        "aggregated profile"
    );
    dest
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Sample;

    /// spec.md section 8 scenario 5: F1,F2,F3 in `a.c`, F4 in `b.c`, with
    /// sample `[F4,F2,F1]:50`. Aggregating by `files` should yield two
    /// distinct file nodes.
    fn files_scenario_profile() -> Profile {
        let mut p = Profile::new(vec![("cpu", "ms")]);
        let a_c = p.intern("a.c");
        let b_c = p.intern("b.c");
        let mut func = |p: &mut Profile, name: &str, file: crate::model::StringId| {
            let n = p.intern(name);
            p.add_function(Function { name: n, filename: file, ..Default::default() })
        };
        let f1 = func(&mut p, "F1", a_c);
        let f2 = func(&mut p, "F2", a_c);
        let f4 = func(&mut p, "F4", b_c);
        let loc1 = p.add_location(None, 0x1, vec![Line { function_id: f1, line: 10 }], false);
        let loc2 = p.add_location(None, 0x2, vec![Line { function_id: f2, line: 20 }], false);
        let loc4 = p.add_location(None, 0x4, vec![Line { function_id: f4, line: 40 }], false);
        p.add_sample(Sample::new(vec![50], vec![loc4, loc2, loc1], vec![])).unwrap();
        p
    }

    #[test]
    fn files_granularity_folds_to_two_nodes() {
        let p = files_scenario_profile();
        let out = aggregate(
            &p,
            &AggregateOptions { granularity: Granularity::Files, call_tree: false },
        );
        assert_eq!(1, out.samples.len());
        let stack = &out.samples[0].location_ids;
        assert_eq!(2, stack.len());
        let files: Vec<&str> = stack
            .iter()
            .map(|&id| {
                let loc = out.location(id).unwrap();
                let f = out.function(loc.lines[0].function_id).unwrap();
                out.string(f.filename)
            })
            .collect();
        assert_eq!(vec!["b.c", "a.c"], files);
    }

    #[test]
    fn functions_granularity_folds_line_and_address() {
        let mut p = Profile::new(vec![("cpu", "ms")]);
        let name = p.intern("f");
        let f = p.add_function(Function { name, ..Default::default() });
        let loc_a = p.add_location(None, 0x10, vec![Line { function_id: f, line: 1 }], false);
        let loc_b = p.add_location(None, 0x20, vec![Line { function_id: f, line: 2 }], false);
        p.add_sample(Sample::new(vec![10], vec![loc_a], vec![])).unwrap();
        p.add_sample(Sample::new(vec![20], vec![loc_b], vec![])).unwrap();

        let out = aggregate(
            &p,
            &AggregateOptions { granularity: Granularity::Functions, call_tree: false },
        );
        assert_eq!(1, out.samples.len());
        assert_eq!(30, out.samples[0].values[0]);
    }

    use proptest::prelude::*;
    use std::collections::HashSet;

    fn distinct_location_count(p: &Profile) -> usize {
        p.samples
            .iter()
            .flat_map(|s| s.location_ids.iter().copied())
            .collect::<HashSet<_>>()
            .len()
    }

    proptest! {
        /// spec.md section 8: coarser granularities never produce more
        /// distinct locations than finer ones for the same input —
        /// `addresses` refines `functions` refines `functionnameonly`.
        #[test]
        fn aggregation_granularity_is_monotonic(
            addresses in proptest::collection::vec(1u64..8, 1..6)
        ) {
            let mut p = Profile::new(vec![("cpu", "ms")]);
            let name = p.intern("f");
            let f = p.add_function(Function { name, ..Default::default() });
            for &addr in &addresses {
                let loc = p.add_location(None, addr, vec![Line { function_id: f, line: addr as i64 }], false);
                p.add_sample(Sample::new(vec![1], vec![loc], vec![])).unwrap();
            }

            let by_addresses = aggregate(&p, &AggregateOptions { granularity: Granularity::Addresses, call_tree: false });
            let by_functions = aggregate(&p, &AggregateOptions { granularity: Granularity::Functions, call_tree: false });
            let by_name_only = aggregate(&p, &AggregateOptions { granularity: Granularity::FunctionNameOnly, call_tree: false });

            prop_assert!(distinct_location_count(&by_addresses) >= distinct_location_count(&by_functions));
            prop_assert!(distinct_location_count(&by_functions) >= distinct_location_count(&by_name_only));
        }
    }
}
