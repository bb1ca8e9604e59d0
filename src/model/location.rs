// Copyright 2021-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::model::ids::{FunctionId, Item, LocationId, MappingId};

/// One inlined (or non-inlined) frame at a program point: a function plus a
/// line number within it. `Location::line` is ordered outermost-caller last,
/// per spec.md section 3 (the leaf/innermost inlined frame comes first).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Line {
    pub function_id: FunctionId,
    pub line: i64,
}

/// A program point referenced by samples. May resolve to zero, one
/// (non-inlined), or many (inlined chain) [`Line`]s.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Default)]
pub struct Location {
    pub mapping_id: Option<MappingId>,
    pub address: u64,
    pub lines: Vec<Line>,
    pub is_folded: bool,
}

impl Item for Location {
    type Id = LocationId;
}

impl Location {
    /// The outermost (least-inlined) line, i.e. the last entry of `lines`.
    /// This is the frame granularity `noinlines`/`addressnoinlines` keep.
    pub fn outermost_line(&self) -> Option<&Line> {
        self.lines.last()
    }

    /// The innermost (leaf-most, possibly inlined) line, i.e. the first
    /// entry of `lines`.
    pub fn innermost_line(&self) -> Option<&Line> {
        self.lines.first()
    }
}
