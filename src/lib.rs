// Copyright 2021-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! A pprof-format profile analysis engine: decode/encode the wire format,
//! merge and scale profiles, filter and aggregate their samples, build the
//! resulting call graph, and project it into report views. Rendering
//! (DOT/SVG/HTML) and symbolization are out of scope (spec.md section 1);
//! this crate stops at the [`render::Renderer`]/[`symbolize::Symbolizer`]
//! trait seams.
//!
//! There is no process-global mutable configuration. Every stage takes its
//! options by value, and [`analyze`] is the one place that assembles a
//! flat [`config::Options`] into the narrower per-stage option structs.

pub mod aggregate;
pub mod codec;
pub mod config;
pub mod error;
pub mod filter;
pub mod graph;
pub mod model;
pub mod ops;
pub mod render;
pub mod report;
pub mod symbolize;
pub mod units;

pub use error::{Error, Result};
pub use model::Profile;

use aggregate::AggregateOptions;
use filter::{FilterOptions, FilterOutcome};
use graph::trim::TrimOptions;
use regex::Regex;
use report::pipeline::PipelineOutput;

fn parse_regex(option: &'static str, pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| Error::InvalidOption { option, reason: e.to_string() })
}

fn build_filter_options(options: &config::Options) -> Result<FilterOptions> {
    let mut opts = FilterOptions::new();
    opts.focus = options.focus.as_deref().map(|p| parse_regex("focus", p)).transpose()?;
    opts.ignore = options.ignore.as_deref().map(|p| parse_regex("ignore", p)).transpose()?;
    opts.prune_from = options.prune_from.as_deref().map(|p| parse_regex("prune_from", p)).transpose()?;
    opts.hide = options.hide.as_deref().map(|p| parse_regex("hide", p)).transpose()?;
    opts.show = options.show.as_deref().map(|p| parse_regex("show", p)).transpose()?;
    opts.tagfocus = options
        .tagfocus
        .iter()
        .map(|e| filter::tag::parse(e))
        .collect::<std::result::Result<_, _>>()?;
    opts.tagignore = options
        .tagignore
        .iter()
        .map(|e| filter::tag::parse(e))
        .collect::<std::result::Result<_, _>>()?;
    opts.tagshow = options
        .tagshow
        .iter()
        .map(|e| filter::tag::parse(e))
        .collect::<std::result::Result<_, _>>()?;
    opts.taghide = options
        .taghide
        .iter()
        .map(|e| filter::tag::parse(e))
        .collect::<std::result::Result<_, _>>()?;
    opts.relative_percentages = options.relative_percentages;
    Ok(opts)
}

fn build_aggregate_options(options: &config::Options) -> AggregateOptions {
    AggregateOptions { granularity: options.granularity, call_tree: options.call_tree }
}

fn build_trim_options(options: &config::Options) -> TrimOptions {
    TrimOptions {
        node_fraction: options.nodefraction,
        edge_fraction: options.edgefraction,
        node_count: options.nodecount,
        enabled: options.trim,
    }
}

/// Runs the full filter -> aggregate -> graph -> trim pipeline against a
/// flat [`config::Options`], the one entry point a CLI or embedder needs.
pub fn analyze(profile: &Profile, options: &config::Options) -> Result<FilterOutcome<PipelineOutput>> {
    let filter_opts = build_filter_options(options)?;
    let agg_opts = build_aggregate_options(options);
    let trim_opts = build_trim_options(options);
    let sample_index = report::resolve_sample_index(profile, options.sample_index.as_deref());

    let owned;
    let profile = if options.divide_by.is_some() || options.drop_negative || options.mean {
        owned = apply_value_adjustments(profile, options, sample_index);
        &owned
    } else {
        profile
    };

    Ok(report::pipeline::run(
        profile,
        &filter_opts,
        &agg_opts,
        Some(&trim_opts),
        sample_index,
        options.relative_percentages,
    ))
}

/// Applies `divide_by`, `mean`, and `drop_negative` in that order, ahead of
/// filtering (spec.md section 6's configuration surface).
fn apply_value_adjustments(profile: &Profile, options: &config::Options, sample_index: usize) -> Profile {
    let mut owned = profile.clone();
    if let Some(divisor) = options.divide_by {
        if divisor != 0.0 {
            ops::scale(&mut owned, 1.0 / divisor);
        }
    }
    if options.mean {
        ops::mean(&mut owned, sample_index);
    }
    if options.drop_negative {
        ops::drop_negative(&mut owned, sample_index);
    }
    owned
}
