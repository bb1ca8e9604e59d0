// Copyright 2021-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Frame-level filters: `focus`, `ignore`, `prune_from`, `hide`, `show`
//! (spec.md section 4.5, items 1 through 5). All five share one matching
//! predicate and are expressed as a single `FrameFilter { kind, regex }`
//! sum type processed in one pass over each sample's stack, per spec.md
//! section 9's design note.

use crate::model::{LocationId, Profile, Sample};
use regex::Regex;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FrameFilterKind {
    Focus,
    Ignore,
    PruneFrom,
    Hide,
    Show,
}

pub struct FrameFilter {
    pub kind: FrameFilterKind,
    pub regex: Regex,
}

impl FrameFilter {
    pub fn new(kind: FrameFilterKind, regex: Regex) -> Self {
        Self { kind, regex }
    }
}

/// A frame matches if any of {function name, file path, mapping file name,
/// mapping build id, function system_name} matches the regex (spec.md
/// section 4.5's "Matching target strings"). A `Location` may carry several
/// inlined `Line`s; it counts as one frame for `hide`/`show`/`prune_from`
/// purposes if any of its lines matches — the aggregator is what later
/// splits inlined chains into individual graph nodes.
pub fn location_matches(profile: &Profile, location_id: LocationId, regex: &Regex) -> bool {
    let Some(location) = profile.location(location_id) else {
        return false;
    };
    if let Some(mapping_id) = location.mapping_id {
        if let Some(mapping) = profile.mapping(mapping_id) {
            if regex.is_match(profile.string(mapping.filename)) || regex.is_match(profile.string(mapping.build_id))
            {
                return true;
            }
        }
    }
    location.lines.iter().any(|line| {
        let Some(function) = profile.function(line.function_id) else {
            return false;
        };
        regex.is_match(profile.string(function.name))
            || regex.is_match(profile.string(function.system_name))
            || regex.is_match(profile.string(function.filename))
    })
}

fn stack_matches_any(profile: &Profile, stack: &[LocationId], regex: &Regex) -> bool {
    stack.iter().any(|&id| location_matches(profile, id, regex))
}

/// Removes adjacent duplicate location ids, produced when `hide`/`show`
/// strips a frame that sat between two occurrences of the same neighbor
/// (spec.md section 4.5 item 4).
fn collapse_adjacent(stack: Vec<LocationId>) -> Vec<LocationId> {
    let mut out: Vec<LocationId> = Vec::with_capacity(stack.len());
    for id in stack {
        if out.last() != Some(&id) {
            out.push(id);
        }
    }
    out
}

/// Truncates `stack` (leaf first) at the innermost (lowest-index) frame
/// matching `regex`, discarding that frame and every frame after it (the
/// callers). Returns the stack unchanged if nothing matches.
pub fn prune_from_stack(profile: &Profile, stack: &[LocationId], regex: &Regex) -> Vec<LocationId> {
    match stack.iter().position(|&id| location_matches(profile, id, regex)) {
        Some(index) => stack[..index].to_vec(),
        None => stack.to_vec(),
    }
}

/// Applies one `FrameFilter` to `samples`. Returns the transformed samples
/// and whether any sample was affected (kept, for `hide`/`show`/`prune_from`;
/// matched, for `focus`/`ignore`).
pub fn apply(profile: &Profile, samples: Vec<Sample>, filter: &FrameFilter) -> (Vec<Sample>, bool) {
    let mut matched_any = false;
    let out = match filter.kind {
        FrameFilterKind::Focus => samples
            .into_iter()
            .filter(|s| {
                let hit = stack_matches_any(profile, &s.location_ids, &filter.regex);
                matched_any |= hit;
                hit
            })
            .collect(),
        FrameFilterKind::Ignore => samples
            .into_iter()
            .filter(|s| {
                let hit = stack_matches_any(profile, &s.location_ids, &filter.regex);
                matched_any |= hit;
                !hit
            })
            .collect(),
        FrameFilterKind::PruneFrom => samples
            .into_iter()
            .map(|mut s| {
                let pruned = prune_from_stack(profile, &s.location_ids, &filter.regex);
                matched_any |= pruned.len() != s.location_ids.len();
                s.location_ids = pruned;
                s
            })
            .collect(),
        FrameFilterKind::Hide => samples
            .into_iter()
            .map(|mut s| {
                let before = s.location_ids.len();
                let kept: Vec<_> = s
                    .location_ids
                    .into_iter()
                    .filter(|&id| !location_matches(profile, id, &filter.regex))
                    .collect();
                matched_any |= kept.len() != before;
                s.location_ids = collapse_adjacent(kept);
                s
            })
            .collect(),
        FrameFilterKind::Show => samples
            .into_iter()
            .map(|mut s| {
                let before = s.location_ids.len();
                let kept: Vec<_> = s
                    .location_ids
                    .into_iter()
                    .filter(|&id| location_matches(profile, id, &filter.regex))
                    .collect();
                matched_any |= kept.len() != before;
                s.location_ids = collapse_adjacent(kept);
                s
            })
            .collect(),
    };
    (out, matched_any)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Function, Line};

    fn profile_with_stack(names: &[&str]) -> (Profile, Vec<LocationId>) {
        let mut p = Profile::new(vec![("cpu", "ns")]);
        let mut stack = Vec::new();
        for &name in names {
            let n = p.intern(name);
            let f = p.add_function(Function { name: n, ..Default::default() });
            let loc = p.add_location(None, 0, vec![Line { function_id: f, line: 1 }], false);
            stack.push(loc);
        }
        (p, stack)
    }

    #[test]
    fn prune_from_discards_match_and_callers() {
        let (p, stack) = profile_with_stack(&["leaf", "middle", "runtime.gc", "main"]);
        let regex = Regex::new("runtime").unwrap();
        let pruned = prune_from_stack(&p, &stack, &regex);
        assert_eq!(2, pruned.len());
    }

    #[test]
    fn hide_collapses_adjacent_duplicates() {
        let (p, stack) = profile_with_stack(&["a", "inline_wrapper", "a"]);
        let regex = Regex::new("inline_wrapper").unwrap();
        let filter = FrameFilter::new(FrameFilterKind::Hide, regex);
        let sample = Sample::new(vec![1], stack, vec![]);
        let (out, matched) = apply(&p, vec![sample], &filter);
        assert!(matched);
        assert_eq!(1, out[0].location_ids.len());
    }
}
