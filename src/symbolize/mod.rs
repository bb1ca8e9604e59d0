// Copyright 2021-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! The out-of-scope symbolization boundary (spec.md section 1 and section
//! 4.9's `weblist`/`disasm` commands): the report projector stops at
//! producing a [`ListingRequest`] per node and hands it to a
//! caller-supplied [`Symbolizer`] to resolve into annotated source or
//! assembly lines.

#[derive(Clone, Debug)]
pub struct ListingRequest {
    pub mapping_build_id: String,
    pub mapping_filename: String,
    pub address: u64,
    pub function_name: String,
}

#[derive(Clone, Debug)]
pub struct ListingLine {
    pub source_file: String,
    pub line_number: u32,
    pub text: String,
    /// The node's value attributed to this source/assembly line, if the
    /// symbolizer can attribute at that granularity.
    pub value: Option<i64>,
}

#[derive(Debug, thiserror::Error)]
pub enum SymbolizeError {
    #[error("symbolization failed for {0:?}: {1}")]
    Failed(ListingRequest, String),
}

/// Implemented by a caller that can map addresses to source lines or
/// disassembly. No implementation ships in this crate (spec.md section 1).
pub trait Symbolizer {
    fn resolve(&self, request: &ListingRequest) -> Result<Vec<ListingLine>, SymbolizeError>;
}
