// Copyright 2021-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::model::error::ModelError;
use crate::model::function::Function;
use crate::model::ids::{Dedup, FunctionId, Id, Item, LocationId, MappingId, StringId};
use crate::model::location::{Line, Location};
use crate::model::mapping::Mapping;
use crate::model::sample::Sample;
use crate::model::string_table::StringTable;
use crate::model::value_type::ValueType;
use indexmap::IndexSet;
use std::hash::BuildHasherDefault;

type FxIndexSet<K> = IndexSet<K, BuildHasherDefault<rustc_hash::FxHasher>>;

/// The canonical in-memory profile (spec.md section 3). Owns every table it
/// references; nothing outside a `Profile` may outlive it while holding ids
/// into it (tree-shaped ownership, per spec.md's Lifecycle row).
#[derive(Clone, Debug, Default)]
pub struct Profile {
    pub strings: StringTable,
    pub functions: FxIndexSet<Function>,
    pub locations: FxIndexSet<Location>,
    pub mappings: FxIndexSet<Mapping>,
    pub samples: Vec<Sample>,

    pub sample_types: Vec<ValueType>,
    pub default_sample_type: Option<usize>,
    pub period: Option<(i64, ValueType)>,
    pub time_nanos: i64,
    pub duration_nanos: i64,
    pub comments: Vec<StringId>,
    pub drop_frames: Option<StringId>,
    pub keep_frames: Option<StringId>,
}

impl Profile {
    /// Creates an empty profile declaring the given sample dimensions. Every
    /// profile must declare at least one sample type (spec.md section 3);
    /// this is checked by [`Profile::validate`], not by the constructor,
    /// so that callers can build up a profile incrementally.
    pub fn new(sample_types: Vec<(&str, &str)>) -> Self {
        let mut profile = Profile {
            strings: StringTable::new(),
            ..Default::default()
        };
        profile.sample_types = sample_types
            .into_iter()
            .map(|(ty, unit)| {
                let r#type = profile.strings.intern(ty);
                let unit = profile.strings.intern(unit);
                ValueType { r#type, unit }
            })
            .collect();
        profile
    }

    pub fn intern(&mut self, s: &str) -> StringId {
        self.strings.intern(s)
    }

    pub fn string(&self, id: StringId) -> &str {
        self.strings.get(id).unwrap_or("")
    }

    pub fn function(&self, id: FunctionId) -> Option<&Function> {
        self.functions.get_index(id.to_offset())
    }

    pub fn location(&self, id: LocationId) -> Option<&Location> {
        self.locations.get_index(id.to_offset())
    }

    pub fn mapping(&self, id: MappingId) -> Option<&Mapping> {
        self.mappings.get_index(id.to_offset())
    }

    pub fn add_function(&mut self, function: Function) -> FunctionId {
        self.functions.dedup(function)
    }

    pub fn add_mapping(&mut self, mapping: Mapping) -> MappingId {
        self.mappings.dedup(mapping)
    }

    pub fn add_location(
        &mut self,
        mapping_id: Option<MappingId>,
        address: u64,
        lines: Vec<Line>,
        is_folded: bool,
    ) -> LocationId {
        self.locations.dedup(Location {
            mapping_id,
            address,
            lines,
            is_folded,
        })
    }

    pub fn add_sample(&mut self, sample: Sample) -> Result<(), ModelError> {
        if sample.values.len() != self.sample_types.len() {
            return Err(ModelError::SampleArityMismatch {
                expected: self.sample_types.len(),
                actual: sample.values.len(),
            });
        }
        self.samples.push(sample);
        Ok(())
    }

    /// Total over all samples for one sample_type index.
    pub fn total(&self, sample_index: usize) -> i64 {
        self.samples
            .iter()
            .filter_map(|s| s.values.get(sample_index))
            .fold(0i64, |acc, v| acc.saturating_add(*v))
    }

    /// Checks every invariant from spec.md section 3 and section 8's
    /// boundary cases. Grounded on `datadog-profiling-validator`'s
    /// `validate_profile`: build id sets per table, then cross-reference.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.strings.get(StringId::from_offset(0)) != Some("") {
            return Err(ModelError::FirstStringNotEmpty);
        }
        if self.sample_types.is_empty() {
            return Err(ModelError::NoSampleTypes);
        }
        if let Some((period, _)) = self.period {
            if period < 0 {
                return Err(ModelError::NegativePeriod(period));
            }
        }
        for mapping in &self.mappings {
            if mapping.memory_start >= mapping.memory_limit && mapping.memory_limit != 0 {
                return Err(ModelError::InvalidMappingRange {
                    start: mapping.memory_start,
                    limit: mapping.memory_limit,
                });
            }
        }
        for location in &self.locations {
            if let Some(mapping_id) = location.mapping_id {
                if self.mapping(mapping_id).is_none() {
                    return Err(ModelError::DanglingMappingId(mapping_id.to_raw_id()));
                }
            }
            for line in &location.lines {
                if self.function(line.function_id).is_none() {
                    return Err(ModelError::DanglingFunctionId(line.function_id.to_raw_id()));
                }
            }
        }
        for sample in &self.samples {
            if sample.values.len() != self.sample_types.len() {
                return Err(ModelError::SampleArityMismatch {
                    expected: self.sample_types.len(),
                    actual: sample.values.len(),
                });
            }
            for &location_id in &sample.location_ids {
                if self.location(location_id).is_none() {
                    return Err(ModelError::DanglingLocationId(location_id.to_raw_id()));
                }
            }
        }
        Ok(())
    }

    /// Resolves `sample_index` from a config value, which may be a numeric
    /// string or a sample-type name (with legacy `inuse_` prefix accepted),
    /// per spec.md section 6's `sample_index` option.
    pub fn resolve_sample_index(&self, sample_index: &str) -> Option<usize> {
        if let Ok(n) = sample_index.parse::<usize>() {
            if n < self.sample_types.len() {
                return Some(n);
            }
        }
        let stripped = sample_index.strip_prefix("inuse_").unwrap_or(sample_index);
        self.sample_types
            .iter()
            .position(|vt| self.string(vt.r#type) == stripped || self.string(vt.r#type) == sample_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_profile() -> Profile {
        let mut p = Profile::new(vec![("cpu", "nanoseconds")]);
        let name = p.intern("main");
        let f = p.add_function(Function {
            name,
            ..Default::default()
        });
        let loc = p.add_location(None, 0, vec![Line { function_id: f, line: 1 }], false);
        p.add_sample(Sample::new(vec![10], vec![loc], vec![])).unwrap();
        p
    }

    #[test]
    fn validates_well_formed_profile() {
        let p = sample_profile();
        assert!(p.validate().is_ok());
    }

    #[test]
    fn rejects_sample_arity_mismatch() {
        let mut p = sample_profile();
        p.samples[0].values.push(5);
        assert!(matches!(
            p.validate(),
            Err(ModelError::SampleArityMismatch { .. })
        ));
    }

    #[test]
    fn rejects_dangling_location() {
        let mut p = sample_profile();
        p.samples[0].location_ids.push(LocationId::from_offset(99));
        assert!(matches!(
            p.validate(),
            Err(ModelError::DanglingLocationId(_))
        ));
    }

    #[test]
    fn rejects_negative_period() {
        let mut p = sample_profile();
        let unit = p.intern("nanoseconds");
        p.period = Some((-1, ValueType { r#type: unit, unit }));
        assert!(matches!(p.validate(), Err(ModelError::NegativePeriod(-1))));
    }
}
