// Copyright 2021-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! The filter pipeline (spec.md section 4.5): a fixed-order sequence of
//! frame- and label-based sample transforms. `drop_frames`/`keep_frames`
//! from the profile's own metadata run first, ahead of the user-supplied
//! `prune_from`, per spec.md section 4.5 item 3.

pub mod error;
pub mod frame;
pub mod tag;

pub use error::{FilterError, FilterOutcome, Warning};
pub use frame::{FrameFilter, FrameFilterKind};
pub use tag::{TagMatcher, TagSampleFilterKind, TagVisibilityKind};

use crate::model::Profile;
use regex::Regex;

/// The fixed set of stage-level parameters (spec.md section 6's config
/// surface). `None`/empty leaves that stage a no-op.
#[derive(Default)]
pub struct FilterOptions {
    pub focus: Option<Regex>,
    pub ignore: Option<Regex>,
    pub prune_from: Option<Regex>,
    pub hide: Option<Regex>,
    pub show: Option<Regex>,
    pub tagfocus: Vec<TagMatcher>,
    pub tagignore: Vec<TagMatcher>,
    pub tagshow: Vec<TagMatcher>,
    pub taghide: Vec<TagMatcher>,
    /// When `false`, report-time percentages are computed against the
    /// unfiltered total rather than the filtered one (spec.md section 4.5).
    pub relative_percentages: bool,
}

impl FilterOptions {
    pub fn new() -> Self {
        Self {
            relative_percentages: true,
            ..Default::default()
        }
    }
}

/// A filtered profile plus the per-sample-index totals the input profile
/// had before filtering, needed to compute report percentages when
/// `relative_percentages = false`.
pub struct FilteredProfile {
    pub profile: Profile,
    pub unfiltered_totals: Vec<i64>,
}

/// Runs the full pipeline, returning the filtered profile and any
/// `NoMatches` warnings raised by stages that matched nothing.
pub fn apply(profile: &Profile, opts: &FilterOptions) -> FilterOutcome<FilteredProfile> {
    let unfiltered_totals: Vec<i64> = (0..profile.sample_types.len()).map(|i| profile.total(i)).collect();
    let mut samples = profile.samples.clone();
    let mut warnings = Vec::new();

    if let Some(drop_id) = profile.drop_frames {
        if let Ok(re) = Regex::new(profile.string(drop_id)) {
            let filter = FrameFilter::new(FrameFilterKind::Hide, re);
            samples = frame::apply(profile, samples, &filter).0;
        }
    }
    if let Some(keep_id) = profile.keep_frames {
        if let Ok(re) = Regex::new(profile.string(keep_id)) {
            let filter = FrameFilter::new(FrameFilterKind::Show, re);
            samples = frame::apply(profile, samples, &filter).0;
        }
    }

    if let Some(re) = &opts.focus {
        let filter = FrameFilter::new(FrameFilterKind::Focus, re.clone());
        let (out, matched) = frame::apply(profile, samples, &filter);
        samples = out;
        if !matched {
            warnings.push(Warning::NoMatches { stage: "focus" });
        }
    }
    if let Some(re) = &opts.ignore {
        let filter = FrameFilter::new(FrameFilterKind::Ignore, re.clone());
        let (out, matched) = frame::apply(profile, samples, &filter);
        samples = out;
        if !matched {
            warnings.push(Warning::NoMatches { stage: "ignore" });
        }
    }
    if let Some(re) = &opts.prune_from {
        let filter = FrameFilter::new(FrameFilterKind::PruneFrom, re.clone());
        let (out, matched) = frame::apply(profile, samples, &filter);
        samples = out;
        if !matched {
            warnings.push(Warning::NoMatches { stage: "prune_from" });
        }
    }
    if let Some(re) = &opts.hide {
        let filter = FrameFilter::new(FrameFilterKind::Hide, re.clone());
        let (out, matched) = frame::apply(profile, samples, &filter);
        samples = out;
        if !matched {
            warnings.push(Warning::NoMatches { stage: "hide" });
        }
    }
    if let Some(re) = &opts.show {
        let filter = FrameFilter::new(FrameFilterKind::Show, re.clone());
        let (out, matched) = frame::apply(profile, samples, &filter);
        samples = out;
        if !matched {
            warnings.push(Warning::NoMatches { stage: "show" });
        }
    }

    for matcher in &opts.tagfocus {
        let (out, matched) = tag::apply_sample_filter(profile, samples, TagSampleFilterKind::Focus, matcher);
        samples = out;
        if !matched {
            warnings.push(Warning::NoMatches { stage: "tagfocus" });
        }
    }
    for matcher in &opts.tagignore {
        let (out, matched) = tag::apply_sample_filter(profile, samples, TagSampleFilterKind::Ignore, matcher);
        samples = out;
        if !matched {
            warnings.push(Warning::NoMatches { stage: "tagignore" });
        }
    }
    for matcher in &opts.tagshow {
        let (out, matched) = tag::apply_visibility_filter(profile, samples, TagVisibilityKind::Show, matcher);
        samples = out;
        if !matched {
            warnings.push(Warning::NoMatches { stage: "tagshow" });
        }
    }
    for matcher in &opts.taghide {
        let (out, matched) = tag::apply_visibility_filter(profile, samples, TagVisibilityKind::Hide, matcher);
        samples = out;
        if !matched {
            warnings.push(Warning::NoMatches { stage: "taghide" });
        }
    }

    let mut filtered = profile.clone();
    filtered.samples = samples;

    tracing::debug!(
        remaining_samples = filtered.samples.len(),
        warnings = warnings.len(),
        "filter pipeline complete"
    );

    FilterOutcome {
        result: FilteredProfile {
            profile: filtered,
            unfiltered_totals,
        },
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Function, Line, Sample};

    /// The three-function profile from spec.md section 8 scenario 1:
    /// `{[F3,F2,F1]:100, [F2,F1]:200}`, sample_type = (cpu, ms).
    fn three_function_profile() -> Profile {
        let mut p = Profile::new(vec![("cpu", "ms")]);
        let mut func = |p: &mut Profile, name: &str| {
            let n = p.intern(name);
            p.add_function(Function { name: n, ..Default::default() })
        };
        let f1 = func(&mut p, "F1");
        let f2 = func(&mut p, "F2");
        let f3 = func(&mut p, "F3");
        let loc1 = p.add_location(None, 0, vec![Line { function_id: f1, line: 1 }], false);
        let loc2 = p.add_location(None, 0, vec![Line { function_id: f2, line: 1 }], false);
        let loc3 = p.add_location(None, 0, vec![Line { function_id: f3, line: 1 }], false);
        p.add_sample(Sample::new(vec![100], vec![loc3, loc2, loc1], vec![])).unwrap();
        p.add_sample(Sample::new(vec![200], vec![loc2, loc1], vec![])).unwrap();
        p
    }

    #[test]
    fn focus_keeps_every_sample_containing_f2() {
        let p = three_function_profile();
        let mut opts = FilterOptions::new();
        opts.focus = Some(Regex::new("^F2$").unwrap());
        let outcome = apply(&p, &opts);
        assert!(outcome.warnings.is_empty());
        assert_eq!(2, outcome.result.profile.samples.len());
    }

    #[test]
    fn ignore_drops_the_sample_containing_f3() {
        let p = three_function_profile();
        let mut opts = FilterOptions::new();
        opts.ignore = Some(Regex::new("^F3$").unwrap());
        let outcome = apply(&p, &opts);
        assert!(outcome.warnings.is_empty());
        assert_eq!(1, outcome.result.profile.samples.len());
        assert_eq!(200, outcome.result.profile.samples[0].values[0]);
    }

    #[test]
    fn stage_with_no_matches_is_reported_as_a_warning_not_an_error() {
        let p = three_function_profile();
        let mut opts = FilterOptions::new();
        opts.focus = Some(Regex::new("^NoSuchFunction$").unwrap());
        let outcome = apply(&p, &opts);
        assert_eq!(0, outcome.result.profile.samples.len());
        assert_eq!(vec![Warning::NoMatches { stage: "focus" }], outcome.warnings);
    }

    use proptest::prelude::*;

    proptest! {
        /// spec.md section 8: filtering is idempotent — applying the same
        /// `focus` regex a second time to an already-filtered profile
        /// changes nothing further.
        #[test]
        fn focus_filter_is_idempotent(keep_f2 in any::<bool>()) {
            let p = three_function_profile();
            let pattern = if keep_f2 { "^F2$" } else { "^F1$" };
            let mut opts = FilterOptions::new();
            opts.focus = Some(Regex::new(pattern).unwrap());
            let once = apply(&p, &opts).result.profile;

            let mut opts_again = FilterOptions::new();
            opts_again.focus = Some(Regex::new(pattern).unwrap());
            let twice = apply(&once, &opts_again).result.profile;

            prop_assert_eq!(once.samples, twice.samples);
        }
    }
}
