// Copyright 2021-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! `traces`: each sample's stack verbatim with values (spec.md section
//! 4.9). Runs on a `Profile` directly (the post-filter, post-aggregation
//! profile that the report pipeline produced), not on the collapsed graph.

use crate::model::{LabelValue, Profile};

#[derive(Clone, Debug, PartialEq)]
pub struct TraceView {
    pub values: Vec<i64>,
    /// Leaf first, matching `Sample::location_ids`.
    pub frames: Vec<String>,
    /// `key=value` pairs, in the sample's own label order.
    pub labels: Vec<String>,
}

fn frame_name(profile: &Profile, location_id: crate::model::LocationId) -> String {
    let Some(location) = profile.location(location_id) else {
        return String::new();
    };
    location
        .lines
        .first()
        .and_then(|line| profile.function(line.function_id))
        .map(|f| profile.string(f.name).to_string())
        .unwrap_or_default()
}

fn label_text(profile: &Profile, label: &crate::model::Label) -> String {
    let key = profile.string(label.key);
    match label.value {
        LabelValue::Str(s) => format!("{key}={}", profile.string(s)),
        LabelValue::Num { num, num_unit } => format!("{key}={num}{}", profile.string(num_unit)),
    }
}

pub fn traces(profile: &Profile) -> Vec<TraceView> {
    profile
        .samples
        .iter()
        .map(|s| TraceView {
            values: s.values.clone(),
            frames: s.location_ids.iter().map(|&id| frame_name(profile, id)).collect(),
            labels: s.labels.iter().map(|l| label_text(profile, l)).collect(),
        })
        .collect()
}
