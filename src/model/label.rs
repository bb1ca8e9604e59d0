// Copyright 2021-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::model::ids::StringId;

/// A single label entry has exactly one of a string or a numeric value
/// (spec.md section 3, Sample invariants).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum LabelValue {
    Str(StringId),
    Num { num: i64, num_unit: StringId },
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Label {
    pub key: StringId,
    pub value: LabelValue,
}

impl Label {
    pub fn str(key: StringId, value: StringId) -> Self {
        Self {
            key,
            value: LabelValue::Str(value),
        }
    }

    pub fn num(key: StringId, num: i64, num_unit: StringId) -> Self {
        Self {
            key,
            value: LabelValue::Num { num, num_unit },
        }
    }

    pub fn has_string_value(&self) -> bool {
        matches!(self.value, LabelValue::Str(_))
    }

    pub fn has_num_value(&self) -> bool {
        matches!(self.value, LabelValue::Num { .. })
    }
}

/// The synthetic label attached to every sample contributed by a diff base
/// after subtraction (spec.md section 3).
pub const DIFF_BASE_LABEL_KEY: &str = "pprof::base";
pub const DIFF_BASE_LABEL_VALUE: &str = "true";
