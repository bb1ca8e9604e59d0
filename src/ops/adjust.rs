// Copyright 2021-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Report-mode value adjustments applied ahead of the graph builder:
//! `drop_negative` and `mean` (spec.md section 6's configuration surface,
//! section 3's "mean" reporting mode note).

use crate::model::Profile;

/// Drops every sample whose value at `sample_index` is negative, in place.
/// Typically used after a diff, where negative values represent
/// regressions the `drop_negative` option hides.
pub fn drop_negative(profile: &mut Profile, sample_index: usize) {
    profile
        .samples
        .retain(|s| s.values.get(sample_index).copied().unwrap_or(0) >= 0);
}

/// Divides `sample_index`'s column by the count dimension (index 0) for
/// every sample where count > 0, in place (spec.md section 3).
pub fn mean(profile: &mut Profile, sample_index: usize) {
    for sample in &mut profile.samples {
        let count = sample.values.first().copied().unwrap_or(0);
        if count > 0 {
            if let Some(v) = sample.values.get_mut(sample_index) {
                *v /= count;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Function, Line, Sample};

    fn profile_with(values: &[(i64, i64)]) -> Profile {
        let mut p = Profile::new(vec![("count", "count"), ("sum", "ns")]);
        let name = p.intern("f");
        let f = p.add_function(Function { name, ..Default::default() });
        let loc = p.add_location(None, 0, vec![Line { function_id: f, line: 1 }], false);
        for &(count, sum) in values {
            p.add_sample(Sample::new(vec![count, sum], vec![loc], vec![])).unwrap();
        }
        p
    }

    #[test]
    fn drop_negative_discards_samples_below_zero() {
        let mut p = profile_with(&[(1, 10), (1, -5)]);
        drop_negative(&mut p, 1);
        assert_eq!(1, p.samples.len());
        assert_eq!(10, p.samples[0].values[1]);
    }

    #[test]
    fn mean_divides_by_count_when_positive() {
        let mut p = profile_with(&[(4, 100), (0, 50)]);
        mean(&mut p, 1);
        assert_eq!(25, p.samples[0].values[1]);
        assert_eq!(50, p.samples[1].values[1]);
    }
}
