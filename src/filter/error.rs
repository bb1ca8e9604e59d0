// Copyright 2021-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

#[derive(Debug, thiserror::Error)]
pub enum FilterError {
    #[error("invalid regex in filter: {0}")]
    InvalidRegex(#[from] regex::Error),
    #[error("invalid tag range expression: {0}")]
    InvalidRange(String),
}

/// A stage's result plus any advisory conditions it encountered. Unlike
/// `FilterError`, a warning never aborts the pipeline (spec.md section 7:
/// `NoMatches` is a warning, not a hard failure).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// Stage `name` matched zero samples.
    NoMatches { stage: &'static str },
}

#[derive(Debug)]
pub struct FilterOutcome<T> {
    pub result: T,
    pub warnings: Vec<Warning>,
}

impl<T> FilterOutcome<T> {
    pub fn new(result: T) -> Self {
        Self {
            result,
            warnings: Vec::new(),
        }
    }

    pub fn push_if(&mut self, condition: bool, stage: &'static str) {
        if condition {
            self.warnings.push(Warning::NoMatches { stage });
        }
    }
}
