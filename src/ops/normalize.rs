// Copyright 2021-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Rescales a diff base so its total absolute value matches the subject's,
//! making non-uniform sampling rates comparable before a diff (spec.md
//! section 4.4).

use crate::model::Profile;
use crate::ops::error::OpsError;
use crate::ops::scale::scale;

/// `scale = sum(|subject[sample_index]|) / sum(|base[sample_index]|)`,
/// applied to `base` in place. Fails with `EmptyBaseProfile` if the base's
/// total is zero (spec.md section 4.4).
pub fn normalize(subject: &Profile, base: &mut Profile, sample_index: usize) -> Result<(), OpsError> {
    if sample_index >= subject.sample_types.len() || sample_index >= base.sample_types.len() {
        return Err(OpsError::InvalidSampleIndex(sample_index));
    }
    let subject_total = abs_total(subject, sample_index);
    let base_total = abs_total(base, sample_index);
    if base_total == 0.0 {
        return Err(OpsError::EmptyBaseProfile(sample_index));
    }
    let factor = subject_total / base_total;
    scale(base, factor);
    Ok(())
}

fn abs_total(profile: &Profile, sample_index: usize) -> f64 {
    profile
        .samples
        .iter()
        .filter_map(|s| s.values.get(sample_index))
        .map(|v| (*v as f64).abs())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Function, Line, Sample};

    fn profile_with_values(values: &[i64]) -> Profile {
        let mut p = Profile::new(vec![("cpu", "ns")]);
        let name = p.intern("f");
        let f = p.add_function(Function {
            name,
            ..Default::default()
        });
        let loc = p.add_location(None, 0, vec![Line { function_id: f, line: 1 }], false);
        for &v in values {
            p.add_sample(Sample::new(vec![v], vec![loc], vec![])).unwrap();
        }
        p
    }

    #[test]
    fn normalize_rescales_base_to_match_subject_total() {
        let subject = profile_with_values(&[100]);
        let mut base = profile_with_values(&[10, 10]);
        normalize(&subject, &mut base, 0).unwrap();
        let total: i64 = base.samples.iter().map(|s| s.values[0]).sum();
        assert_eq!(100, total);
    }

    #[test]
    fn normalize_rejects_empty_base() {
        let subject = profile_with_values(&[100]);
        let mut base = profile_with_values(&[0]);
        assert!(matches!(
            normalize(&subject, &mut base, 0),
            Err(OpsError::EmptyBaseProfile(0))
        ));
    }
}
