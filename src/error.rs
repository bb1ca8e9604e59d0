// Copyright 2021-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! The crate-wide error type (spec.md section 7), unifying each
//! subsystem's narrower error through `#[from]`, the way the teacher
//! crate layers `ProfileError` over its narrower `SetError`/
//! `TryReserveError` sources.

use crate::filter::FilterError;
use crate::model::ModelError;
use crate::ops::OpsError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Codec(#[from] crate::codec::Error),
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error(transparent)]
    Ops(#[from] OpsError),
    #[error(transparent)]
    Filter(#[from] FilterError),
    /// Bad regex, non-numeric value where one was expected, or a value
    /// outside its radio group's choices (spec.md section 7).
    #[error("invalid option {option}: {reason}")]
    InvalidOption { option: &'static str, reason: String },
}

pub type Result<T> = std::result::Result<T, Error>;
