// Copyright 2021-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Glues the filter, aggregate, graph-build, and trim stages into the one
//! pipeline every report view is projected from (spec.md section 2's
//! overall stage order, feeding section 4.9).

use crate::aggregate::{self, AggregateOptions};
use crate::filter::{self, FilterOptions, FilterOutcome};
use crate::graph::{self, trim, Graph};
use crate::model::Profile;

pub struct PipelineOutput {
    pub profile: Profile,
    pub graph: Graph,
    /// The denominator reports should divide by for percentage columns,
    /// already resolved per `relative_percentages` (spec.md section 4.5).
    pub percentage_base: i64,
}

#[allow(clippy::too_many_arguments)]
pub fn run(
    profile: &Profile,
    filter_opts: &FilterOptions,
    agg_opts: &AggregateOptions,
    trim_opts: Option<&trim::TrimOptions>,
    sample_index: usize,
    relative_percentages: bool,
) -> FilterOutcome<PipelineOutput> {
    let filtered = filter::apply(profile, filter_opts);
    let aggregated = aggregate::aggregate(&filtered.result.profile, agg_opts);

    let percentage_base = if relative_percentages {
        aggregated.total(sample_index)
    } else {
        filtered
            .result
            .unfiltered_totals
            .get(sample_index)
            .copied()
            .unwrap_or(0)
    };

    let built = graph::build(&aggregated, sample_index, agg_opts.call_tree);
    let graph = match trim_opts {
        Some(opts) => trim::trim(&built, opts),
        None => built,
    };

    FilterOutcome {
        result: PipelineOutput { profile: aggregated, graph, percentage_base },
        warnings: filtered.warnings,
    }
}
