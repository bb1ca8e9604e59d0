// Copyright 2021-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Command-line front end over the `pprof_core` library (spec.md section
//! 6's command surface). Reads a profile (and, for `diff`-style runs, a
//! base profile to subtract), applies the filter/aggregate/graph/trim
//! pipeline, and prints the requested report view.

use anyhow::Context;
use clap::Parser;
use pprof_core::config::{OutputUnit, Options};
use pprof_core::model::Profile;
use pprof_core::{ops, report};
use std::fs;
use std::io::Write;
use std::process::ExitCode;

/// Profile analysis engine: merge, filter, aggregate, and report
/// pprof-format profiles.
#[derive(Parser, Debug)]
#[command(name = "pprof-core", version)]
struct Cli {
    /// Report view to print.
    #[arg(value_enum)]
    command: Command,

    /// Path to the profile to analyze (gzip-wrapped pprof protobuf).
    profile: String,

    /// Path to a base profile to diff against (subtracted after normalization).
    #[arg(long)]
    base: Option<String>,

    /// Write the report to this file instead of stdout.
    #[arg(short, long)]
    output: Option<String>,

    #[arg(long)]
    focus: Option<String>,
    #[arg(long)]
    ignore: Option<String>,
    #[arg(long)]
    hide: Option<String>,
    #[arg(long)]
    show: Option<String>,
    #[arg(long = "prune-from")]
    prune_from: Option<String>,
    #[arg(long = "tagfocus")]
    tagfocus: Vec<String>,
    #[arg(long = "tagignore")]
    tagignore: Vec<String>,
    #[arg(long = "tagshow")]
    tagshow: Vec<String>,
    #[arg(long = "taghide")]
    taghide: Vec<String>,

    #[arg(long, default_value = "functions")]
    granularity: String,
    #[arg(long, default_value = "flat")]
    sort: String,
    #[arg(long, default_value = "auto")]
    unit: String,
    #[arg(long)]
    sample_index: Option<String>,

    #[arg(long)]
    call_tree: bool,
    #[arg(long)]
    mean: bool,
    #[arg(long)]
    normalize: bool,
    #[arg(long)]
    drop_negative: bool,
    #[arg(long = "no-relative-percentages")]
    no_relative_percentages: bool,
    #[arg(long)]
    positive_percentages: bool,
    #[arg(long)]
    compact_labels: bool,
    #[arg(long)]
    divide_by: Option<f64>,

    #[arg(long)]
    nodecount: Option<i64>,
    #[arg(long)]
    nodefraction: Option<f64>,
    #[arg(long)]
    edgefraction: Option<f64>,
    #[arg(long = "no-trim")]
    no_trim: bool,

    /// Bare tokens are ORed into `focus`; `-token` tokens are ORed into
    /// `ignore` (spec.md section 6's regex-argument shortcuts).
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    regex_args: Vec<String>,
}

#[derive(Copy, Clone, Debug, clap::ValueEnum)]
enum Command {
    Top,
    Tree,
    Text,
    Peek,
    List,
    Disasm,
    Traces,
    Tags,
    Dot,
    Callgrind,
    Proto,
    Raw,
    Flamegraph,
}

/// Renderer/symbolizer-backed commands have no implementation in this
/// crate; they are out of scope (spec.md section 1).
fn requires_external_collaborator(command: Command) -> Option<&'static str> {
    match command {
        Command::Dot => Some("dot rendering requires a caller-supplied render::Renderer"),
        Command::Callgrind => Some("callgrind rendering requires a caller-supplied render::Renderer"),
        Command::List | Command::Disasm => {
            Some("source/assembly listing requires a caller-supplied symbolize::Symbolizer")
        }
        _ => None,
    }
}

fn build_options(cli: &Cli) -> Result<Options, String> {
    let mut options = Options::default();

    let mut or_join = |existing: &Option<String>, extra: &str| -> String {
        match existing {
            Some(e) => format!("{e}|{extra}"),
            None => extra.to_string(),
        }
    };

    let mut focus_terms: Vec<String> = cli.focus.iter().cloned().collect();
    let mut ignore_terms: Vec<String> = cli.ignore.iter().cloned().collect();
    let mut output_override = cli.output.clone();

    for token in &cli.regex_args {
        if let Some(path) = token.strip_prefix('>') {
            output_override = Some(path.to_string());
        } else if let Some((key, value)) = token.split_once('=') {
            apply_assignment(&mut options, key, value)?;
        } else if let Some(term) = token.strip_prefix('-') {
            ignore_terms.push(term.to_string());
        } else {
            focus_terms.push(token.clone());
        }
    }

    options.focus = focus_terms.into_iter().reduce(|acc, t| or_join(&Some(acc), &t).to_string());
    options.ignore = ignore_terms.into_iter().reduce(|acc, t| or_join(&Some(acc), &t).to_string());
    options.hide = cli.hide.clone();
    options.show = cli.show.clone();
    options.prune_from = cli.prune_from.clone();
    options.tagfocus = cli.tagfocus.clone();
    options.tagignore = cli.tagignore.clone();
    options.tagshow = cli.tagshow.clone();
    options.taghide = cli.taghide.clone();

    options.granularity = pprof_core::aggregate::Granularity::parse(&cli.granularity)
        .ok_or_else(|| format!("unknown granularity {:?}", cli.granularity))?;
    options.sort = pprof_core::config::SortKey::parse(&cli.sort)
        .ok_or_else(|| format!("unknown sort key {:?}", cli.sort))?;
    options.unit = OutputUnit::parse(&cli.unit);
    options.sample_index = cli.sample_index.clone();

    options.call_tree = cli.call_tree;
    options.mean = cli.mean;
    options.normalize = cli.normalize;
    options.drop_negative = cli.drop_negative;
    options.relative_percentages = !cli.no_relative_percentages;
    options.positive_percentages = cli.positive_percentages;
    options.compact_labels = cli.compact_labels;
    options.divide_by = cli.divide_by;

    if let Some(n) = cli.nodecount {
        options.nodecount = n;
    }
    if let Some(f) = cli.nodefraction {
        options.nodefraction = f;
    }
    if let Some(f) = cli.edgefraction {
        options.edgefraction = f;
    }
    options.trim = !cli.no_trim;
    options.output = output_override;

    Ok(options)
}

fn apply_assignment(options: &mut Options, key: &str, value: &str) -> Result<(), String> {
    match key {
        "granularity" => {
            options.granularity = pprof_core::aggregate::Granularity::parse(value)
                .ok_or_else(|| format!("unknown granularity {value:?}"))?;
        }
        "sort" => {
            options.sort = pprof_core::config::SortKey::parse(value)
                .ok_or_else(|| format!("unknown sort key {value:?}"))?;
        }
        "unit" => options.unit = OutputUnit::parse(value),
        "nodecount" => options.nodecount = value.parse().map_err(|_| format!("bad nodecount {value:?}"))?,
        "nodefraction" => options.nodefraction = value.parse().map_err(|_| format!("bad nodefraction {value:?}"))?,
        "edgefraction" => options.edgefraction = value.parse().map_err(|_| format!("bad edgefraction {value:?}"))?,
        "sample_index" => options.sample_index = Some(value.to_string()),
        "source_path" => options.source_path = Some(value.to_string()),
        _ => return Err(format!("unrecognized variable {key:?}")),
    }
    Ok(())
}

/// Reads and decodes a profile off disk. Uses `anyhow::Context` to attach
/// the path to whichever stage fails, the way the teacher crate's own
/// fallible I/O seams do, then flattens to a plain message for the CLI's
/// exit-code plumbing.
fn load_profile(path: &str) -> Result<Profile, String> {
    (|| -> anyhow::Result<Profile> {
        let bytes = fs::read(path).with_context(|| format!("reading {path}"))?;
        pprof_core::codec::decode(&bytes).with_context(|| format!("decoding {path}"))
    })()
    .map_err(|e| format!("{e:#}"))
}

fn write_output(output: Option<&str>, text: &str) -> Result<(), String> {
    match output {
        Some(path) => fs::write(path, text).map_err(|e| format!("writing {path}: {e}")),
        None => {
            print!("{text}");
            std::io::stdout().flush().map_err(|e| e.to_string())
        }
    }
}

fn run() -> Result<(), (ExitCode, String)> {
    let cli = Cli::parse();

    if let Some(reason) = requires_external_collaborator(cli.command) {
        return Err((ExitCode::from(1), reason.to_string()));
    }

    let mut profile = load_profile(&cli.profile).map_err(|e| (ExitCode::from(2), e))?;

    if let Some(base_path) = &cli.base {
        let mut base = load_profile(base_path).map_err(|e| (ExitCode::from(2), e))?;
        let sample_index = report::resolve_sample_index(&profile, None);
        if cli.normalize {
            ops::normalize(&profile, &mut base, sample_index).map_err(|e| (ExitCode::from(1), e.to_string()))?;
        }
        let negated = ops::negate_as_diff_base(base);
        profile = ops::merge(vec![profile, negated]).map_err(|e| (ExitCode::from(1), e.to_string()))?;
    }

    let options = build_options(&cli).map_err(|e| (ExitCode::from(1), e))?;
    let outcome = pprof_core::analyze(&profile, &options).map_err(|e| (ExitCode::from(1), e.to_string()))?;
    for warning in &outcome.warnings {
        eprintln!("{warning:?}");
    }
    let output = outcome.result;

    let text = match cli.command {
        Command::Top | Command::Text => render_top(&output, &options),
        Command::Tree => render_tree(&report::tree::tree(&output.graph)),
        Command::Peek => {
            let pattern = cli.focus.as_deref().or(cli.regex_args.first().map(String::as_str)).unwrap_or("");
            let re = regex::Regex::new(pattern).map_err(|e| (ExitCode::from(1), e.to_string()))?;
            render_tree(&report::tree::peek(&output.graph, &re))
        }
        Command::Traces => render_traces(&report::traces::traces(&output.profile), options.compact_labels),
        Command::Tags => render_tags(&report::tags::tags(&output.profile, resolve_index(&output.profile, &options))),
        Command::Flamegraph => {
            let tree = report::flamegraph::flamegraph(&output.profile, resolve_index(&output.profile, &options));
            report::flamegraph::to_json(&tree).map_err(|e| (ExitCode::from(1), e.to_string()))?
        }
        Command::Proto => {
            let bytes = pprof_core::codec::encode(&output.profile).map_err(|e| (ExitCode::from(1), e.to_string()))?;
            return write_bytes(options.output.as_deref(), &bytes).map_err(|e| (ExitCode::from(1), e));
        }
        Command::Raw => format!("{:#?}", output.profile),
        Command::Dot | Command::Callgrind | Command::List | Command::Disasm => unreachable!(),
    };

    write_output(options.output.as_deref(), &text).map_err(|e| (ExitCode::from(1), e))
}

fn resolve_index(profile: &Profile, options: &Options) -> usize {
    report::resolve_sample_index(profile, options.sample_index.as_deref())
}

fn write_bytes(output: Option<&str>, bytes: &[u8]) -> Result<(), String> {
    match output {
        Some(path) => fs::write(path, bytes).map_err(|e| format!("writing {path}: {e}")),
        None => std::io::stdout().write_all(bytes).map_err(|e| e.to_string()),
    }
}

fn render_top(output: &report::pipeline::PipelineOutput, options: &Options) -> String {
    let rows = report::top::top(&output.graph, output.percentage_base, options.sort);
    let sign = |pct: f64| if options.positive_percentages { pct.abs() } else { pct };
    let mut out = String::from("flat\tflat%\tsum%\tcum\tcum%\tname\n");
    for row in rows {
        out.push_str(&format!(
            "{}\t{:.2}%\t{:.2}%\t{}\t{:.2}%\t{}{}\n",
            row.flat,
            sign(row.flat_pct),
            sign(row.sum_pct),
            row.cum,
            sign(row.cum_pct),
            row.name,
            if row.is_inlined { " (inline)" } else { "" }
        ));
    }
    out
}

fn render_tree(nodes: &[report::tree::TreeNodeView]) -> String {
    let mut out = String::new();
    for node in nodes {
        out.push_str(&format!("{} flat={} cum={}\n", node.name, node.flat, node.cum));
        for caller in &node.callers {
            out.push_str(&format!("  <- {} ({}{})\n", caller.name, caller.weight, if caller.residual { ", residual" } else { "" }));
        }
        for callee in &node.callees {
            out.push_str(&format!("  -> {} ({}{})\n", callee.name, callee.weight, if callee.residual { ", residual" } else { "" }));
        }
    }
    out
}

fn render_traces(traces: &[report::traces::TraceView], compact_labels: bool) -> String {
    let mut out = String::new();
    for trace in traces {
        out.push_str(&format!("{:?}\n", trace.values));
        for frame in &trace.frames {
            out.push_str(&format!("  {frame}\n"));
        }
        if !trace.labels.is_empty() {
            if compact_labels {
                out.push_str(&format!("  [{} labels]\n", trace.labels.len()));
            } else {
                out.push_str(&format!("  {{{}}}\n", trace.labels.join(", ")));
            }
        }
    }
    out
}

fn render_tags(tags: &[report::tags::TagSummary]) -> String {
    let mut out = String::new();
    for tag in tags {
        out.push_str(&format!("{}={}\tcount={}\ttotal={}\n", tag.key, tag.value, tag.count, tag.total));
    }
    out
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err((code, message)) => {
            eprintln!("{message}");
            code
        }
    }
}
