// Copyright 2021-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Thin wrapper around the prost-generated `pprof` protobuf message types.
//! prost derives `PartialEq` but not `Hash` or `Eq`, so we add those by hand
//! for the messages this crate needs to dedup or put in a hash set.

#![allow(clippy::derive_partial_eq_without_eq)]

use std::hash::{Hash, Hasher};

include!(concat!(env!("OUT_DIR"), "/pprof.rs"));

impl Eq for ValueType {}
impl Hash for ValueType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.r#type.hash(state);
        self.unit.hash(state);
    }
}

impl Eq for Label {}
impl Hash for Label {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
        self.str.hash(state);
        self.num.hash(state);
        self.num_unit.hash(state);
    }
}

impl Eq for Line {}
impl Hash for Line {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.function_id.hash(state);
        self.line.hash(state);
    }
}

impl Eq for Location {}
impl Hash for Location {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
        self.mapping_id.hash(state);
        self.address.hash(state);
        self.line.hash(state);
        self.is_folded.hash(state);
    }
}

impl Eq for Function {}
impl Hash for Function {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
        self.name.hash(state);
        self.system_name.hash(state);
        self.filename.hash(state);
        self.start_line.hash(state);
    }
}

impl Eq for Mapping {}
impl Hash for Mapping {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
        self.memory_start.hash(state);
        self.memory_limit.hash(state);
        self.file_offset.hash(state);
        self.filename.hash(state);
        self.build_id.hash(state);
        self.has_functions.hash(state);
        self.has_filenames.hash(state);
        self.has_line_numbers.hash(state);
        self.has_inline_frames.hash(state);
    }
}
