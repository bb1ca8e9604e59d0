// Copyright 2021-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Converts between the prost-generated wire types (`crate::codec::pprof`)
//! and the interned in-memory model (`crate::model`). Decode validates every
//! invariant from spec.md section 3; encode interns in first-seen order and
//! compacts ids to dense, 1-based ranges (spec.md section 4.1).

use crate::codec::error::Error;
use crate::codec::pprof;
use crate::model::{
    Function, FunctionId, Id, Label, LabelValue, Line, Location, Mapping, MappingId, Profile,
    Sample, StringId, ValueType,
};
use std::collections::HashMap;

/// Resolves a raw wire string index through the wire-position -> dest
/// `StringId` translation table built up front, the same pattern
/// `function_ids`/`mapping_ids`/`location_ids` use below. Strings are
/// content-deduplicating on intern, so a wire table with a repeated entry
/// must still resolve every raw index correctly instead of desyncing
/// against a compacted table.
fn string_id(raw: i64, table: &[StringId]) -> Result<StringId, Error> {
    if raw < 0 || raw as usize >= table.len() {
        return Err(Error::StringIndexOutOfRange(raw, table.len()));
    }
    Ok(table[raw as usize])
}

pub fn decode_profile(wire: pprof::Profile) -> Result<Profile, Error> {
    if wire.string_table.first().map(String::as_str) != Some("") {
        return Err(Error::InconsistentProfile(
            crate::model::ModelError::FirstStringNotEmpty,
        ));
    }

    let mut profile = Profile::default();
    let string_ids: Vec<StringId> = wire
        .string_table
        .iter()
        .map(|s| profile.intern(s))
        .collect();

    profile.sample_types = wire
        .sample_type
        .iter()
        .map(|vt| {
            Ok(ValueType {
                r#type: string_id(vt.r#type, &string_ids)?,
                unit: string_id(vt.unit, &string_ids)?,
            })
        })
        .collect::<Result<_, Error>>()?;

    if let Some(pt) = wire.period_type {
        profile.period = Some((
            wire.period,
            ValueType {
                r#type: string_id(pt.r#type, &string_ids)?,
                unit: string_id(pt.unit, &string_ids)?,
            },
        ));
    }

    profile.time_nanos = wire.time_nanos;
    profile.duration_nanos = wire.duration_nanos;
    profile.comments = wire
        .comment
        .iter()
        .map(|&c| string_id(c, &string_ids))
        .collect::<Result<_, Error>>()?;
    if wire.drop_frames != 0 {
        profile.drop_frames = Some(string_id(wire.drop_frames, &string_ids)?);
    }
    if wire.keep_frames != 0 {
        profile.keep_frames = Some(string_id(wire.keep_frames, &string_ids)?);
    }
    if wire.default_sample_type != 0 {
        let name = string_id(wire.default_sample_type, &string_ids)?;
        profile.default_sample_type = profile
            .sample_types
            .iter()
            .position(|vt| vt.r#type == name);
    }

    // Functions: map wire id -> dense FunctionId, preserving first-seen order.
    let mut function_ids: HashMap<u64, FunctionId> = HashMap::with_capacity(wire.function.len());
    for f in &wire.function {
        let id = profile.add_function(Function {
            name: string_id(f.name, &string_ids)?,
            system_name: string_id(f.system_name, &string_ids)?,
            filename: string_id(f.filename, &string_ids)?,
            start_line: f.start_line,
        });
        function_ids.insert(f.id, id);
    }

    // Mappings: same pattern.
    let mut mapping_ids: HashMap<u64, MappingId> = HashMap::with_capacity(wire.mapping.len());
    for m in &wire.mapping {
        if m.memory_limit != 0 && m.memory_start >= m.memory_limit {
            return Err(Error::InconsistentProfile(
                crate::model::ModelError::InvalidMappingRange {
                    start: m.memory_start,
                    limit: m.memory_limit,
                },
            ));
        }
        let id = profile.add_mapping(Mapping {
            memory_start: m.memory_start,
            memory_limit: m.memory_limit,
            file_offset: m.file_offset,
            filename: string_id(m.filename, &string_ids)?,
            build_id: string_id(m.build_id, &string_ids)?,
            has_functions: m.has_functions,
            has_filenames: m.has_filenames,
            has_line_numbers: m.has_line_numbers,
            has_inline_frames: m.has_inline_frames,
        });
        mapping_ids.insert(m.id, id);
    }

    // Locations.
    let mut location_ids: HashMap<u64, crate::model::LocationId> =
        HashMap::with_capacity(wire.location.len());
    for l in &wire.location {
        let mapping_id = if l.mapping_id == 0 {
            None
        } else {
            Some(
                *mapping_ids
                    .get(&l.mapping_id)
                    .ok_or(Error::UnresolvedMappingId(l.mapping_id))?,
            )
        };
        let lines = l
            .line
            .iter()
            .map(|line| {
                let function_id = *function_ids
                    .get(&line.function_id)
                    .ok_or(Error::UnresolvedFunctionId(line.function_id))?;
                Ok(Line {
                    function_id,
                    line: line.line,
                })
            })
            .collect::<Result<Vec<_>, Error>>()?;
        let id = profile.add_location(mapping_id, l.address, lines, l.is_folded);
        location_ids.insert(l.id, id);
    }

    // Samples.
    for s in &wire.sample {
        let location_ids_resolved = s
            .location_id
            .iter()
            .map(|raw| {
                location_ids
                    .get(raw)
                    .copied()
                    .ok_or(Error::UnresolvedLocationId(*raw))
            })
            .collect::<Result<Vec<_>, Error>>()?;
        let labels = s
            .label
            .iter()
            .map(|l| decode_label(l, &string_ids))
            .collect::<Result<Vec<_>, Error>>()?;
        profile
            .add_sample(Sample::new(s.value.clone(), location_ids_resolved, labels))
            .map_err(Error::InconsistentProfile)?;
    }

    profile.validate().map_err(Error::InconsistentProfile)?;
    Ok(profile)
}

fn decode_label(label: &pprof::Label, string_ids: &[StringId]) -> Result<Label, Error> {
    let key = string_id(label.key, string_ids)?;
    let has_str = label.str != 0;
    let has_num = label.num != 0 || label.num_unit != 0;
    if has_str && has_num {
        return Err(Error::MalformedLabel);
    }
    if has_str {
        Ok(Label::str(key, string_id(label.str, string_ids)?))
    } else {
        Ok(Label::num(
            key,
            label.num,
            string_id(label.num_unit, string_ids)?,
        ))
    }
}

/// Encodes the model into the wire message, compacting every table to a
/// dense, 1-based id space in insertion order (spec.md section 4.1).
pub fn encode_profile(profile: &Profile) -> pprof::Profile {
    let sample_type = profile
        .sample_types
        .iter()
        .map(|vt| pprof::ValueType {
            r#type: vt.r#type.to_raw_id() as i64,
            unit: vt.unit.to_raw_id() as i64,
        })
        .collect();

    let function = profile
        .functions
        .iter()
        .enumerate()
        .map(|(offset, f)| pprof::Function {
            id: (offset + 1) as u64,
            name: f.name.to_raw_id() as i64,
            system_name: f.system_name.to_raw_id() as i64,
            filename: f.filename.to_raw_id() as i64,
            start_line: f.start_line,
        })
        .collect();

    let mapping = profile
        .mappings
        .iter()
        .enumerate()
        .map(|(offset, m)| pprof::Mapping {
            id: (offset + 1) as u64,
            memory_start: m.memory_start,
            memory_limit: m.memory_limit,
            file_offset: m.file_offset,
            filename: m.filename.to_raw_id() as i64,
            build_id: m.build_id.to_raw_id() as i64,
            has_functions: m.has_functions,
            has_filenames: m.has_filenames,
            has_line_numbers: m.has_line_numbers,
            has_inline_frames: m.has_inline_frames,
        })
        .collect();

    let location = profile
        .locations
        .iter()
        .enumerate()
        .map(|(offset, l)| pprof::Location {
            id: (offset + 1) as u64,
            mapping_id: l.mapping_id.map(|m| m.to_raw_id()).unwrap_or(0),
            address: l.address,
            line: l
                .lines
                .iter()
                .map(|line| pprof::Line {
                    function_id: line.function_id.to_raw_id(),
                    line: line.line,
                })
                .collect(),
            is_folded: l.is_folded,
        })
        .collect();

    let sample = profile
        .samples
        .iter()
        .map(|s| pprof::Sample {
            location_id: s.location_ids.iter().map(|id| id.to_raw_id()).collect(),
            value: s.values.clone(),
            label: s.labels.iter().map(encode_label).collect(),
        })
        .collect();

    let (period_type, period) = match &profile.period {
        Some((period, vt)) => (
            Some(pprof::ValueType {
                r#type: vt.r#type.to_raw_id() as i64,
                unit: vt.unit.to_raw_id() as i64,
            }),
            *period,
        ),
        None => (None, 0),
    };

    pprof::Profile {
        sample_type,
        sample,
        mapping,
        location,
        function,
        string_table: profile.strings.iter().map(String::from).collect(),
        drop_frames: profile.drop_frames.map(|id| id.to_raw_id() as i64).unwrap_or(0),
        keep_frames: profile.keep_frames.map(|id| id.to_raw_id() as i64).unwrap_or(0),
        time_nanos: profile.time_nanos,
        duration_nanos: profile.duration_nanos,
        period_type,
        period,
        comment: profile.comments.iter().map(|id| id.to_raw_id() as i64).collect(),
        default_sample_type: profile
            .default_sample_type
            .and_then(|idx| profile.sample_types.get(idx))
            .map(|vt| vt.r#type.to_raw_id() as i64)
            .unwrap_or(0),
    }
}

fn encode_label(label: &Label) -> pprof::Label {
    match label.value {
        LabelValue::Str(s) => pprof::Label {
            key: label.key.to_raw_id() as i64,
            str: s.to_raw_id() as i64,
            num: 0,
            num_unit: 0,
        },
        LabelValue::Num { num, num_unit } => pprof::Label {
            key: label.key.to_raw_id() as i64,
            str: 0,
            num,
            num_unit: num_unit.to_raw_id() as i64,
        },
    }
}
