// Copyright 2021-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! The flat configuration record and its radio-group enums (spec.md
//! section 6's configuration surface, section 9's design note: "no
//! process-global mutable configuration — every pipeline takes its
//! configuration by value").

use crate::aggregate::Granularity;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum SortKey {
    #[default]
    Flat,
    Cum,
}

impl SortKey {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "flat" => Some(SortKey::Flat),
            "cum" => Some(SortKey::Cum),
            _ => None,
        }
    }
}

/// `auto` and `minimum` are resolved per-report by `crate::units`; an
/// explicit unit (`ms`, `mb`, ...) is applied uniformly.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum OutputUnit {
    #[default]
    Auto,
    Minimum,
    Explicit(String),
}

impl OutputUnit {
    pub fn parse(s: &str) -> Self {
        match s {
            "auto" => OutputUnit::Auto,
            "minimum" => OutputUnit::Minimum,
            other => OutputUnit::Explicit(other.to_string()),
        }
    }
}

/// One flat, `Clone`-by-value snapshot of every option the engine
/// recognizes (spec.md section 6). Exclusive radio groups (`unit`,
/// `granularity`, `sort`) are modeled as single-valued enum fields rather
/// than a set of booleans, so setting one resets the others by
/// construction.
#[derive(Clone, Debug)]
pub struct Options {
    pub output: Option<String>,
    pub drop_negative: bool,
    pub positive_percentages: bool,
    pub call_tree: bool,
    pub relative_percentages: bool,
    pub unit: OutputUnit,
    pub compact_labels: bool,
    pub nodecount: i64,
    pub nodefraction: f64,
    pub edgefraction: f64,
    pub trim: bool,
    pub focus: Option<String>,
    pub ignore: Option<String>,
    pub hide: Option<String>,
    pub show: Option<String>,
    pub prune_from: Option<String>,
    pub tagfocus: Vec<String>,
    pub tagignore: Vec<String>,
    pub tagshow: Vec<String>,
    pub taghide: Vec<String>,
    pub divide_by: Option<f64>,
    pub mean: bool,
    pub sample_index: Option<String>,
    pub granularity: Granularity,
    pub sort: SortKey,
    pub normalize: bool,
    pub source_path: Option<String>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            output: None,
            drop_negative: false,
            positive_percentages: false,
            call_tree: false,
            relative_percentages: true,
            unit: OutputUnit::default(),
            compact_labels: false,
            nodecount: -1,
            nodefraction: 0.005,
            edgefraction: 0.001,
            trim: true,
            focus: None,
            ignore: None,
            hide: None,
            show: None,
            prune_from: None,
            tagfocus: Vec::new(),
            tagignore: Vec::new(),
            tagshow: Vec::new(),
            taghide: Vec::new(),
            divide_by: None,
            mean: false,
            sample_index: None,
            granularity: Granularity::default(),
            sort: SortKey::default(),
            normalize: false,
            source_path: None,
        }
    }
}
