// Copyright 2021-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Merges a list of compatible profiles into a single profile whose sample
//! values are the element-wise sum of the inputs (spec.md section 4.2).

use crate::model::ids::FxIndexMap;
use crate::model::{
    Function, FunctionId, Label, LabelValue, Line, Location, Mapping, MappingId, Profile, Sample,
    ValueType,
};
use crate::ops::error::OpsError;

/// The length of the common (type, unit) prefix shared by every profile's
/// `sample_type` list, compared by string content since ids differ across
/// profiles. Returns `OpsError::IncompatibleSampleTypes` if that prefix is
/// empty.
fn common_sample_type_prefix_len(profiles: &[Profile]) -> Result<usize, OpsError> {
    let Some(first) = profiles.first() else {
        return Ok(0);
    };
    let mut len = first.sample_types.len();
    for profile in &profiles[1..] {
        let shared = first
            .sample_types
            .iter()
            .zip(profile.sample_types.iter())
            .take_while(|(a, b)| {
                first.string(a.r#type) == profile.string(b.r#type)
                    && first.string(a.unit) == profile.string(b.unit)
            })
            .count();
        len = len.min(shared);
    }
    if len == 0 {
        return Err(OpsError::IncompatibleSampleTypes);
    }
    Ok(len)
}

/// Copies one input profile's function/mapping/location tables into `dest`,
/// relying on `dest`'s own interning to collapse frames that are equal in
/// content (even though their source ids differ profile to profile).
/// Returns per-table vectors translating a source offset to the id it now
/// has in `dest`.
fn copy_tables(dest: &mut Profile, src: &Profile) -> (Vec<FunctionId>, Vec<MappingId>, Vec<crate::model::LocationId>) {
    let functions: Vec<FunctionId> = src
        .functions
        .iter()
        .map(|f| {
            let name = dest.intern(src.string(f.name));
            let system_name = dest.intern(src.string(f.system_name));
            let filename = dest.intern(src.string(f.filename));
            dest.add_function(Function {
                name,
                system_name,
                filename,
                start_line: f.start_line,
            })
        })
        .collect();

    let mappings: Vec<MappingId> = src
        .mappings
        .iter()
        .map(|m| {
            let filename = dest.intern(src.string(m.filename));
            let build_id = dest.intern(src.string(m.build_id));
            dest.add_mapping(Mapping {
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
        .collect();

    let locations: Vec<crate::model::LocationId> = src
        .locations
        .iter()
        .map(|l| {
            let mapping_id = l.mapping_id.map(|id| mappings[id.to_offset()]);
            let lines: Vec<Line> = l
                .lines
                .iter()
                .map(|line| Line {
                    function_id: functions[line.function_id.to_offset()],
                    line: line.line,
                })
                .collect();
            dest.add_location(mapping_id, l.address, lines, l.is_folded)
        })
        .collect();

    (functions, mappings, locations)
}

fn copy_label(dest: &mut Profile, src: &Profile, label: &Label) -> Label {
    let key = dest.intern(src.string(label.key));
    match label.value {
        LabelValue::Str(s) => Label::str(key, dest.intern(src.string(s))),
        LabelValue::Num { num, num_unit } => {
            Label::num(key, num, dest.intern(src.string(num_unit)))
        }
    }
}

/// Merges `profiles` into one. Preserves the insertion order of first
/// occurrence for samples and for string-table entries.
pub fn merge(profiles: Vec<Profile>) -> Result<Profile, OpsError> {
    if profiles.len() == 1 {
        let mut only = profiles;
        return Ok(only.remove(0));
    }

    let common_len = common_sample_type_prefix_len(&profiles)?;
    let mut dest = Profile::new(vec![]);
    if let Some(first) = profiles.first() {
        dest.sample_types = first.sample_types[..common_len]
            .iter()
            .map(|vt| ValueType {
                r#type: dest.intern(first.string(vt.r#type)),
                unit: dest.intern(first.string(vt.unit)),
            })
            .collect();
    }

    let mut shared_period: Option<(i64, String, String)> = None;
    let mut min_time = i64::MAX;
    let mut max_end = i64::MIN;
    let mut sample_index: FxIndexMap<(Vec<crate::model::LocationId>, Vec<Label>), usize> =
        FxIndexMap::default();
    let mut merged_samples: Vec<Sample> = Vec::new();

    for src in &profiles {
        let (_functions, _mappings, locations) = copy_tables(&mut dest, src);

        if let Some((period, vt)) = &src.period {
            if *period != 0 {
                let type_str = src.string(vt.r#type).to_string();
                let unit_str = src.string(vt.unit).to_string();
                match &shared_period {
                    None => shared_period = Some((*period, type_str, unit_str)),
                    Some((shared, ty, unit)) => {
                        if *shared != *period || *ty != type_str || *unit != unit_str {
                            return Err(OpsError::IncompatiblePeriods);
                        }
                    }
                }
            }
        }

        if src.time_nanos != 0 {
            min_time = min_time.min(src.time_nanos);
            max_end = max_end.max(src.time_nanos.saturating_add(src.duration_nanos));
        }

        for sample in &src.samples {
            let translated_locations: Vec<_> = sample
                .location_ids
                .iter()
                .map(|id| locations[id.to_offset()])
                .collect();
            let translated_labels: Vec<Label> = sample
                .labels
                .iter()
                .map(|l| copy_label(&mut dest, src, l))
                .collect();
            let values: Vec<i64> = sample
                .values
                .iter()
                .take(common_len)
                .copied()
                .collect();

            let new_sample = Sample::new(values.clone(), translated_locations, translated_labels);
            let key = new_sample.dedup_key();

            match sample_index.get(&key) {
                Some(&idx) => {
                    for (acc, v) in merged_samples[idx].values.iter_mut().zip(values.iter()) {
                        *acc = acc.saturating_add(*v);
                    }
                }
                None => {
                    sample_index.insert(key, merged_samples.len());
                    merged_samples.push(new_sample);
                }
            }
        }
    }

    dest.samples = merged_samples;
    dest.period = shared_period.map(|(period, ty, unit)| {
        (
            period,
            ValueType {
                r#type: dest.intern(&ty),
                unit: dest.intern(&unit),
            },
        )
    });
    if min_time != i64::MAX {
        dest.time_nanos = min_time;
        dest.duration_nanos = (max_end - min_time).max(0);
    }

    tracing::debug!(
        inputs = profiles.len(),
        samples = dest.samples.len(),
        "merged profiles"
    );
    Ok(dest)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simple_profile(sample_value: i64) -> Profile {
        let mut p = Profile::new(vec![("cpu", "nanoseconds")]);
        let name = p.intern("f1");
        let f = p.add_function(Function {
            name,
            ..Default::default()
        });
        let loc = p.add_location(None, 0, vec![Line { function_id: f, line: 1 }], false);
        p.add_sample(Sample::new(vec![sample_value], vec![loc], vec![]))
            .unwrap();
        p
    }

    #[test]
    fn merge_sums_matching_samples() {
        let a = simple_profile(10);
        let b = simple_profile(20);
        let merged = merge(vec![a, b]).unwrap();
        assert_eq!(1, merged.samples.len());
        assert_eq!(30, merged.samples[0].values[0]);
    }

    #[test]
    fn merge_rejects_incompatible_sample_types() {
        let a = Profile::new(vec![("cpu", "nanoseconds")]);
        let b = Profile::new(vec![("space", "bytes")]);
        assert!(matches!(
            merge(vec![a, b]),
            Err(OpsError::IncompatibleSampleTypes)
        ));
    }

    #[test]
    fn merge_preserves_total() {
        let a = simple_profile(10);
        let b = simple_profile(20);
        let total_before = a.total(0) + b.total(0);
        let merged = merge(vec![a, b]).unwrap();
        assert_eq!(total_before, merged.total(0));
    }

    #[test]
    fn merge_is_a_no_op_for_a_single_profile() {
        let a = simple_profile(5);
        let expected_total = a.total(0);
        let merged = merge(vec![a]).unwrap();
        assert_eq!(expected_total, merged.total(0));
    }

    use proptest::prelude::*;

    proptest! {
        /// spec.md section 8: merging never loses or invents weight — the
        /// merged total equals the sum of the inputs' totals.
        #[test]
        fn merge_sum_preservation(a in -10_000i64..10_000, b in -10_000i64..10_000) {
            let profile_a = simple_profile(a);
            let profile_b = simple_profile(b);
            let total_before = profile_a.total(0) + profile_b.total(0);
            let merged = merge(vec![profile_a, profile_b]).unwrap();
            prop_assert_eq!(total_before, merged.total(0));
        }
    }
}
