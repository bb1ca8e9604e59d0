// Copyright 2021-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::model::ids::{FunctionId, Item, StringId};

/// Represents a pprof `Function` with the id stored externally in the
/// owning table, matching the teacher's `internal::Function` layout.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Function {
    pub name: StringId,
    pub system_name: StringId,
    pub filename: StringId,
    pub start_line: i64,
}

impl Default for Function {
    fn default() -> Self {
        Self {
            name: StringId::ZERO,
            system_name: StringId::ZERO,
            filename: StringId::ZERO,
            start_line: 0,
        }
    }
}

impl Item for Function {
    type Id = FunctionId;
}
