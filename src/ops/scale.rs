// Copyright 2021-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Multiplies every sample's values by a rational scale factor (spec.md
//! section 4.3). Used for diff-base subtraction (`ratio = -1`), `divide_by`,
//! and normalization (section 4.4).

use crate::model::{Profile, DIFF_BASE_LABEL_KEY, DIFF_BASE_LABEL_VALUE};

/// Scales every value of every sample in `profile` by `ratio`, in place.
/// Values saturate at `i64::{MIN,MAX}` instead of overflowing (spec.md
/// section 4.3 and the `Overflow` error category in section 7, which is a
/// warning condition, not a hard failure).
pub fn scale(profile: &mut Profile, ratio: f64) {
    for sample in &mut profile.samples {
        for value in &mut sample.values {
            let scaled = (*value as f64) * ratio;
            *value = saturating_from_f64(scaled);
        }
    }
}

fn saturating_from_f64(value: f64) -> i64 {
    if value.is_nan() {
        0
    } else if value >= i64::MAX as f64 {
        i64::MAX
    } else if value <= i64::MIN as f64 {
        i64::MIN
    } else {
        value.round() as i64
    }
}

/// Prepares `profile` as a diff base: scales every value by `-1` and tags
/// every sample with the synthetic `pprof::base = "true"` label (spec.md
/// section 3's Diff-base semantics), ready to be merged with the subject.
pub fn negate_as_diff_base(mut profile: Profile) -> Profile {
    scale(&mut profile, -1.0);
    let key = profile.intern(DIFF_BASE_LABEL_KEY);
    let value = profile.intern(DIFF_BASE_LABEL_VALUE);
    for sample in &mut profile.samples {
        sample.labels.push(crate::model::Label::str(key, value));
    }
    profile
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Function, Line, Sample};

    fn simple_profile(value: i64) -> Profile {
        let mut p = Profile::new(vec![("cpu", "ns")]);
        let name = p.intern("f");
        let f = p.add_function(Function {
            name,
            ..Default::default()
        });
        let loc = p.add_location(None, 0, vec![Line { function_id: f, line: 1 }], false);
        p.add_sample(Sample::new(vec![value], vec![loc], vec![])).unwrap();
        p
    }

    #[test]
    fn scale_by_negative_one_negates_values() {
        let mut p = simple_profile(100);
        scale(&mut p, -1.0);
        assert_eq!(-100, p.samples[0].values[0]);
    }

    #[test]
    fn scale_saturates_instead_of_overflowing() {
        let mut p = simple_profile(i64::MAX);
        scale(&mut p, 2.0);
        assert_eq!(i64::MAX, p.samples[0].values[0]);
    }

    #[test]
    fn diff_base_cancels_with_its_source_after_merge() {
        // spec.md section 8: merge(P, scale(P, -1)) has every sample value
        // 0. The synthetic `pprof::base` label is bookkeeping for filtering
        // and is applied on top of this, not a precondition for it.
        let subject = simple_profile(50);
        let mut base = simple_profile(50);
        scale(&mut base, -1.0);
        let merged = crate::ops::merge::merge(vec![subject, base]).unwrap();
        for sample in &merged.samples {
            for value in &sample.values {
                assert_eq!(0, *value);
            }
        }
    }

    use proptest::prelude::*;

    proptest! {
        /// spec.md section 8: `merge(P, scale(P, -1))` cancels to zero for
        /// any sample value, not just the hand-picked one above.
        #[test]
        fn diff_base_cancellation_holds_for_any_value(value in -10_000i64..10_000) {
            let subject = simple_profile(value);
            let mut base = simple_profile(value);
            scale(&mut base, -1.0);
            let merged = crate::ops::merge::merge(vec![subject, base]).unwrap();
            for sample in &merged.samples {
                for v in &sample.values {
                    prop_assert_eq!(0, *v);
                }
            }
        }
    }
}
