// Copyright 2021-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Unit parsing and scaling shared by the tag-range filter (spec.md section
//! 4.5) and the report projector's output-unit resolution (spec.md section
//! 4.9). Time units: ns, us, ms, s, hrs, days, weeks, years. Byte units: B,
//! kB/KB, MB, GB, TB, PB, decimal (1000-based) unless the profile's own unit
//! string is one of the binary spellings (`ki`, `mi`, ...), in which case
//! 1024-based scaling is used.

const NS_PER_US: f64 = 1_000.0;
const NS_PER_MS: f64 = 1_000_000.0;
const NS_PER_S: f64 = 1_000_000_000.0;
const NS_PER_HR: f64 = NS_PER_S * 3600.0;
const NS_PER_DAY: f64 = NS_PER_HR * 24.0;
const NS_PER_WEEK: f64 = NS_PER_DAY * 7.0;
const NS_PER_YEAR: f64 = NS_PER_DAY * 365.25;

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Dimension {
    Time,
    Bytes,
    Other,
}

/// Converts one unit of `dimension` to its base unit (nanoseconds for time,
/// bytes for bytes), returning the multiplier, or `None` if unrecognized.
pub fn base_multiplier(unit: &str) -> Option<(Dimension, f64)> {
    let lower = unit.to_ascii_lowercase();
    let time = match lower.as_str() {
        "ns" | "nanoseconds" => Some(1.0),
        "us" | "microseconds" => Some(NS_PER_US),
        "ms" | "milliseconds" => Some(NS_PER_MS),
        "s" | "sec" | "seconds" => Some(NS_PER_S),
        "hrs" | "hours" => Some(NS_PER_HR),
        "days" => Some(NS_PER_DAY),
        "weeks" => Some(NS_PER_WEEK),
        "years" => Some(NS_PER_YEAR),
        _ => None,
    };
    if let Some(mult) = time {
        return Some((Dimension::Time, mult));
    }

    let bytes = match lower.as_str() {
        "b" | "bytes" => Some(1.0),
        "kb" => Some(1_000.0),
        "ki" | "kib" => Some(1024.0),
        "mb" => Some(1_000_000.0),
        "mi" | "mib" => Some(1024.0 * 1024.0),
        "gb" => Some(1_000_000_000.0),
        "gi" | "gib" => Some(1024.0 * 1024.0 * 1024.0),
        "tb" => Some(1_000_000_000_000.0),
        "ti" | "tib" => Some(1024.0 * 1024.0 * 1024.0 * 1024.0),
        "pb" => Some(1_000_000_000_000_000.0),
        "pi" | "pib" => Some(1024.0 * 1024.0 * 1024.0 * 1024.0 * 1024.0),
        _ => None,
    };
    bytes.map(|mult| (Dimension::Bytes, mult))
}

/// Parses a possibly-suffixed quantity like `"4mb"` or `"500"` into its
/// value expressed in the dimension's base unit. Bare numbers (no
/// recognized suffix) are returned unscaled with `Dimension::Other`.
pub fn parse_quantity(raw: &str) -> Option<(Dimension, f64)> {
    let raw = raw.trim();
    let split_at = raw
        .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == '-' || c == '+'))
        .unwrap_or(raw.len());
    let (number, suffix) = raw.split_at(split_at);
    let value: f64 = number.parse().ok()?;
    if suffix.is_empty() {
        return Some((Dimension::Other, value));
    }
    let (dim, mult) = base_multiplier(suffix)?;
    Some((dim, value * mult))
}

/// Formats `value` (already in the base unit for `unit`'s dimension) using
/// the largest unit for which the value is `>= 1` (the `auto` output-unit
/// mode, spec.md section 4.9).
pub fn format_auto(value: f64, unit: &str) -> String {
    match base_multiplier(unit) {
        Some((Dimension::Time, _)) => format_with_ladder(value, &TIME_LADDER),
        Some((Dimension::Bytes, _)) => format_with_ladder(value, &BYTE_LADDER),
        _ => format_significant(value, unit),
    }
}

struct LadderStep {
    threshold: f64,
    divisor: f64,
    label: &'static str,
}

const TIME_LADDER: [LadderStep; 8] = [
    LadderStep { threshold: NS_PER_YEAR, divisor: NS_PER_YEAR, label: "years" },
    LadderStep { threshold: NS_PER_WEEK, divisor: NS_PER_WEEK, label: "weeks" },
    LadderStep { threshold: NS_PER_DAY, divisor: NS_PER_DAY, label: "days" },
    LadderStep { threshold: NS_PER_HR, divisor: NS_PER_HR, label: "hrs" },
    LadderStep { threshold: NS_PER_S, divisor: NS_PER_S, label: "s" },
    LadderStep { threshold: NS_PER_MS, divisor: NS_PER_MS, label: "ms" },
    LadderStep { threshold: NS_PER_US, divisor: NS_PER_US, label: "us" },
    LadderStep { threshold: 0.0, divisor: 1.0, label: "ns" },
];

const BYTE_LADDER: [LadderStep; 6] = [
    LadderStep { threshold: 1e15, divisor: 1e15, label: "PB" },
    LadderStep { threshold: 1e12, divisor: 1e12, label: "TB" },
    LadderStep { threshold: 1e9, divisor: 1e9, label: "GB" },
    LadderStep { threshold: 1e6, divisor: 1e6, label: "MB" },
    LadderStep { threshold: 1e3, divisor: 1e3, label: "kB" },
    LadderStep { threshold: 0.0, divisor: 1.0, label: "B" },
];

fn format_with_ladder(value: f64, ladder: &[LadderStep]) -> String {
    let magnitude = value.abs();
    for step in ladder {
        if magnitude >= step.threshold {
            return format!("{}{}", format_significant_digits(value / step.divisor), step.label);
        }
    }
    format!("{}{}", format_significant_digits(value), ladder.last().map(|s| s.label).unwrap_or(""))
}

fn format_significant(value: f64, unit: &str) -> String {
    format!("{}{}", format_significant_digits(value), unit)
}

/// 4 significant digits for magnitudes < 10, 2 otherwise (spec.md 4.9).
fn format_significant_digits(value: f64) -> String {
    if value.abs() < 10.0 {
        format!("{value:.4}")
    } else {
        format!("{value:.2}")
    }
}

/// Formats a whole column under one shared unit: the largest unit such
/// that no (nonzero) value in the column drops below 1, applied uniformly
/// to every row (the `minimum` output-unit mode, spec.md section 4.9).
pub fn format_minimum(values: &[f64], unit: &str) -> Vec<String> {
    match base_multiplier(unit) {
        Some((Dimension::Time, _)) => format_column_with_ladder(values, &TIME_LADDER),
        Some((Dimension::Bytes, _)) => format_column_with_ladder(values, &BYTE_LADDER),
        _ => values.iter().map(|&v| format_significant(v, unit)).collect(),
    }
}

fn format_column_with_ladder(values: &[f64], ladder: &[LadderStep]) -> Vec<String> {
    let min_abs = values
        .iter()
        .map(|v| v.abs())
        .filter(|v| *v > 0.0)
        .fold(f64::INFINITY, f64::min);
    let step = ladder.iter().find(|s| min_abs >= s.threshold).unwrap_or_else(|| ladder.last().unwrap());
    values
        .iter()
        .map(|&v| format!("{}{}", format_significant_digits(v / step.divisor), step.label))
        .collect()
}
