// Copyright 2021-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::model::ids::LocationId;
use crate::model::label::Label;

/// One observation: a stack trace (leaf first) plus a vector of measurements
/// parallel to the owning profile's `sample_type`.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Default)]
pub struct Sample {
    pub values: Vec<i64>,
    /// Leaf-first, matching spec.md section 3.
    pub location_ids: Vec<LocationId>,
    pub labels: Vec<Label>,
}

impl Sample {
    pub fn new(values: Vec<i64>, location_ids: Vec<LocationId>, labels: Vec<Label>) -> Self {
        Self {
            values,
            location_ids,
            labels,
        }
    }

    /// A key used by the merger to decide whether two samples from
    /// different inputs represent "the same" observation: same stack,
    /// same labels (order-independent for labels, per spec.md 4.2).
    pub fn dedup_key(&self) -> (Vec<LocationId>, Vec<Label>) {
        let mut labels = self.labels.clone();
        labels.sort_by(label_sort_key);
        (self.location_ids.clone(), labels)
    }

    pub fn label(&self, key_matches: impl Fn(&Label) -> bool) -> Option<&Label> {
        self.labels.iter().find(|l| key_matches(l))
    }
}

fn label_sort_key(a: &Label, b: &Label) -> std::cmp::Ordering {
    use crate::model::label::LabelValue;
    a.key.cmp(&b.key).then_with(|| {
        let rank = |v: &LabelValue| match v {
            LabelValue::Str(_) => 0u8,
            LabelValue::Num { .. } => 1u8,
        };
        rank(&a.value)
            .cmp(&rank(&b.value))
            .then_with(|| format!("{:?}", a.value).cmp(&format!("{:?}", b.value)))
    })
}
