// Copyright 2021-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! The out-of-scope rendering boundary (spec.md section 1 and section
//! 4.9's `flat` command): the report projector stops at producing a
//! `DotInput`, a plain `(nodes, edges, labels)` tuple, and hands it to a
//! caller-supplied [`Renderer`] to turn into DOT/SVG/HTML bytes.

#[derive(Clone, Debug)]
pub struct DotNode {
    pub id: String,
    pub label: String,
    pub flat: i64,
    pub cum: i64,
}

#[derive(Clone, Debug)]
pub struct DotEdge {
    pub from: String,
    pub to: String,
    pub weight: i64,
    pub residual: bool,
}

/// The renderer collaborator's input: a graph's nodes and edges plus
/// free-form legend lines (title, total, sample_type).
#[derive(Clone, Debug, Default)]
pub struct DotInput {
    pub nodes: Vec<DotNode>,
    pub edges: Vec<DotEdge>,
    pub labels: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("renderer failed: {0}")]
    Failed(String),
}

/// Implemented by a caller that can turn a [`DotInput`] into concrete
/// bytes (DOT text, an SVG, an HTML fragment). No implementation ships in
/// this crate; it is strictly out of scope (spec.md section 1).
pub trait Renderer {
    fn render(&self, input: &DotInput) -> Result<Vec<u8>, RenderError>;
}
