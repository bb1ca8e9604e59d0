// Copyright 2021-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! `tags`: every label key/value pair seen across (post-filter) samples
//! with its occurrence count and total value. Has no dedicated subsection
//! in spec.md section 4.9; SPEC_FULL.md section 4.9 grounds it as a
//! straightforward projection over samples, the same way `top` aggregates
//! over samples.

use crate::model::{LabelValue, Profile};

#[derive(Clone, Debug, PartialEq)]
pub struct TagSummary {
    pub key: String,
    pub value: String,
    pub count: u64,
    pub total: i64,
}

pub fn tags(profile: &Profile, sample_index: usize) -> Vec<TagSummary> {
    let mut table: Vec<TagSummary> = Vec::new();
    for sample in &profile.samples {
        let Some(&value) = sample.values.get(sample_index) else {
            continue;
        };
        for label in &sample.labels {
            let key = profile.string(label.key).to_string();
            let value_str = match label.value {
                LabelValue::Str(s) => profile.string(s).to_string(),
                LabelValue::Num { num, num_unit } => format!("{num}{}", profile.string(num_unit)),
            };
            match table.iter_mut().find(|t| t.key == key && t.value == value_str) {
                Some(entry) => {
                    entry.count += 1;
                    entry.total = entry.total.saturating_add(value);
                }
                None => table.push(TagSummary { key, value: value_str, count: 1, total: value }),
            }
        }
    }
    table.sort_by(|a, b| a.key.cmp(&b.key).then_with(|| a.value.cmp(&b.value)));
    table
}
