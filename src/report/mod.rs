// Copyright 2021-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Projects a filtered, aggregated profile into the report views spec.md
//! section 4.9 names: `top`/`text`, `tree`/`peek`, `traces`, `flamegraph`,
//! and `tags`. `pipeline` runs the shared filter -> aggregate -> graph ->
//! trim stages every view is built from.

pub mod flamegraph;
pub mod pipeline;
pub mod tags;
pub mod top;
pub mod traces;
pub mod tree;

use crate::config::OutputUnit;
use crate::model::Profile;
use crate::units;

/// Resolves an `OutputUnit` against a sample type's declared unit and a
/// column of raw values, producing one formatted string per value
/// (spec.md section 4.9).
pub fn format_column(values: &[i64], unit: &OutputUnit, sample_unit: &str) -> Vec<String> {
    match unit {
        OutputUnit::Auto => values.iter().map(|&v| units::format_auto(v as f64, sample_unit)).collect(),
        OutputUnit::Minimum => {
            let as_f64: Vec<f64> = values.iter().map(|&v| v as f64).collect();
            units::format_minimum(&as_f64, sample_unit)
        }
        OutputUnit::Explicit(target) => values
            .iter()
            .map(|&v| format_explicit(v as f64, sample_unit, target))
            .collect(),
    }
}

/// Rescales `value` (expressed in `sample_unit`) into `target` and prints
/// it with the target's label, for an explicitly requested output unit.
fn format_explicit(value: f64, sample_unit: &str, target: &str) -> String {
    let sample_base = units::base_multiplier(sample_unit).map(|(_, m)| m).unwrap_or(1.0);
    let target_base = units::base_multiplier(target).map(|(_, m)| m).unwrap_or(1.0);
    let in_base = value * sample_base;
    format!("{:.2}{}", in_base / target_base, target)
}

/// The sample-value dimension a report view operates on, resolved from
/// `config::Options::sample_index` against a profile's declared sample
/// types (spec.md section 4.1's "default to the last sample type").
pub fn resolve_sample_index(profile: &Profile, requested: Option<&str>) -> usize {
    requested
        .and_then(|s| profile.resolve_sample_index(s))
        .unwrap_or_else(|| profile.sample_types.len().saturating_sub(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputUnit;

    #[test]
    fn explicit_unit_rescales_from_the_sample_unit() {
        let out = format_column(&[1_000_000], &OutputUnit::Explicit("ms".to_string()), "ns");
        assert_eq!("1.00ms", out[0]);
    }

    #[test]
    fn auto_unit_formats_each_value_independently() {
        let out = format_column(&[1_500_000_000], &OutputUnit::Auto, "ns");
        assert_eq!("1.50s", out[0]);
    }
}
