// Copyright 2021-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::model::ids::StringId;

/// A (type, unit) pair describing one dimension of a sample's values, e.g.
/// ("cpu", "nanoseconds") or ("alloc_space", "bytes").
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct ValueType {
    pub r#type: StringId,
    pub unit: StringId,
}

impl ValueType {
    pub fn new(r#type: StringId, unit: StringId) -> Self {
        Self { r#type, unit }
    }
}
