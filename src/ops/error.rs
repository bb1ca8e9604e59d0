// Copyright 2021-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

#[derive(Debug, thiserror::Error)]
pub enum OpsError {
    #[error("profiles have no sample_type (type, unit) pairs in common")]
    IncompatibleSampleTypes,
    #[error("profiles declare incompatible, non-zero sampling periods")]
    IncompatiblePeriods,
    #[error("base profile's total for sample index {0} is zero; cannot normalize")]
    EmptyBaseProfile(usize),
    #[error("sample index {0} is out of range for this profile's sample types")]
    InvalidSampleIndex(usize),
}
