// Copyright 2021-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Label-based filters: `tagfocus`/`tagignore` (spec.md section 4.5 item 6,
//! sample-level predicates) and `tagshow`/`taghide` (section 6's config
//! surface; label-level analogues of `hide`/`show`, per SPEC_FULL.md
//! section 4.5 — they decide which *labels* survive on a retained sample,
//! rather than whether the sample itself survives).

use crate::filter::error::FilterError;
use crate::model::{Label, LabelValue, Profile, Sample};
use crate::units::parse_quantity;
use regex::Regex;

#[derive(Debug)]
pub enum TagPredicate {
    /// Matched against a string label's value.
    Regex(Regex),
    /// Matched against a numeric label's value. `N` parses to `(Some(N),
    /// Some(N))`; `N:` to `(Some(N), None)`; `:N` to `(None, Some(N))`;
    /// `N:M` to `(Some(N), Some(M))` (spec.md section 4.5 item 6).
    Range { low: Option<f64>, high: Option<f64> },
}

pub struct TagMatcher {
    /// Restricts matching to labels with this key; `None` matches any key.
    pub key: Option<String>,
    pub predicate: TagPredicate,
}

impl TagMatcher {
    pub fn matches(&self, profile: &Profile, label: &Label) -> bool {
        if let Some(key) = &self.key {
            if profile.string(label.key) != key {
                return false;
            }
        }
        match (&self.predicate, label.value) {
            (TagPredicate::Regex(re), LabelValue::Str(s)) => re.is_match(profile.string(s)),
            (TagPredicate::Range { low, high }, LabelValue::Num { num, .. }) => {
                let v = num as f64;
                low.map_or(true, |lo| v >= lo) && high.map_or(true, |hi| v <= hi)
            }
            _ => false,
        }
    }
}

/// Parses a `key=expr` or bare `expr` tag filter argument. `expr` is
/// interpreted as a range if it parses cleanly as one (`N`, `N:`, `:N`,
/// `N:M`, with optional unit suffix like `4mb`), otherwise as a regex.
pub fn parse(expr: &str) -> Result<TagMatcher, FilterError> {
    let (key, rest) = match expr.split_once('=') {
        Some((k, v)) => (Some(k.to_string()), v),
        None => (None, expr),
    };
    let predicate = match try_parse_range(rest) {
        Some((low, high)) => TagPredicate::Range { low, high },
        None => TagPredicate::Regex(Regex::new(rest)?),
    };
    Ok(TagMatcher { key, predicate })
}

fn try_parse_range(s: &str) -> Option<(Option<f64>, Option<f64>)> {
    if let Some((a, b)) = s.split_once(':') {
        let low = if a.is_empty() { None } else { Some(parse_quantity(a)?.1) };
        let high = if b.is_empty() { None } else { Some(parse_quantity(b)?.1) };
        Some((low, high))
    } else if s.is_empty() {
        None
    } else {
        let (_, v) = parse_quantity(s)?;
        Some((Some(v), Some(v)))
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TagSampleFilterKind {
    Focus,
    Ignore,
}

/// `tagfocus`/`tagignore`: decides whether the sample survives.
pub fn apply_sample_filter(
    profile: &Profile,
    samples: Vec<Sample>,
    kind: TagSampleFilterKind,
    matcher: &TagMatcher,
) -> (Vec<Sample>, bool) {
    let mut matched_any = false;
    let out = samples
        .into_iter()
        .filter(|s| {
            let hit = s.labels.iter().any(|l| matcher.matches(profile, l));
            matched_any |= hit;
            match kind {
                TagSampleFilterKind::Focus => hit,
                TagSampleFilterKind::Ignore => !hit,
            }
        })
        .collect();
    (out, matched_any)
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TagVisibilityKind {
    Show,
    Hide,
}

/// `tagshow`/`taghide`: decides which labels survive on each sample.
pub fn apply_visibility_filter(
    profile: &Profile,
    samples: Vec<Sample>,
    kind: TagVisibilityKind,
    matcher: &TagMatcher,
) -> (Vec<Sample>, bool) {
    let mut matched_any = false;
    let out = samples
        .into_iter()
        .map(|mut s| {
            let before = s.labels.len();
            s.labels.retain(|l| {
                let hit = matcher.matches(profile, l);
                match kind {
                    TagVisibilityKind::Show => hit,
                    TagVisibilityKind::Hide => !hit,
                }
            });
            matched_any |= s.labels.len() != before;
            s
        })
        .collect();
    (out, matched_any)
}
