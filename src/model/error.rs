// Copyright 2021-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

/// Semantic (post-decode) invariant violations, spec.md section 7's
/// `InconsistentProfile` category.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("string table's first entry must be the empty string")]
    FirstStringNotEmpty,
    #[error("sample has {actual} values but profile declares {expected} sample types")]
    SampleArityMismatch { expected: usize, actual: usize },
    #[error("sample references location id {0} which does not exist")]
    DanglingLocationId(u64),
    #[error("location references function id {0} which does not exist")]
    DanglingFunctionId(u64),
    #[error("location references mapping id {0} which does not exist")]
    DanglingMappingId(u64),
    #[error("label on key {0:?} has neither a string nor a numeric value, or has both")]
    MalformedLabel(String),
    #[error("profile declares no sample types")]
    NoSampleTypes,
    #[error("period must not be negative, got {0}")]
    NegativePeriod(i64),
    #[error("mapping memory_start ({start}) must be less than memory_limit ({limit})")]
    InvalidMappingRange { start: u64, limit: u64 },
}
