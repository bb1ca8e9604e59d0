// Copyright 2021-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::model::ids::{Item, MappingId, StringId};

/// A loaded binary segment. Addresses in samples are only meaningful
/// relative to one of these (spec.md section 3).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Mapping {
    pub memory_start: u64,
    pub memory_limit: u64,
    pub file_offset: u64,
    pub filename: StringId,
    pub build_id: StringId,
    pub has_functions: bool,
    pub has_filenames: bool,
    pub has_line_numbers: bool,
    pub has_inline_frames: bool,
}

impl Default for Mapping {
    fn default() -> Self {
        Self {
            memory_start: 0,
            memory_limit: 0,
            file_offset: 0,
            filename: StringId::ZERO,
            build_id: StringId::ZERO,
            has_functions: false,
            has_filenames: false,
            has_line_numbers: false,
            has_inline_frames: false,
        }
    }
}

impl Item for Mapping {
    type Id = MappingId;
}
