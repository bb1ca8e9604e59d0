// Copyright 2021-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::model::ModelError;

/// Errors from decoding or encoding the wire format (spec.md sections 4.1
/// and 7).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to gunzip profile: {0}")]
    Gzip(#[source] std::io::Error),
    #[error("failed to decode pprof protobuf: {0}")]
    Protobuf(#[from] prost::DecodeError),
    #[error("failed to encode pprof protobuf: {0}")]
    ProtobufEncode(#[from] prost::EncodeError),
    #[error("profile violates an invariant: {0}")]
    InconsistentProfile(#[from] ModelError),
    #[error("sample references location id {0} which is not present in the wire profile")]
    UnresolvedLocationId(u64),
    #[error("location references function id {0} which is not present in the wire profile")]
    UnresolvedFunctionId(u64),
    #[error("location references mapping id {0} which is not present in the wire profile")]
    UnresolvedMappingId(u64),
    #[error("string index {0} is out of range for a string table of length {1}")]
    StringIndexOutOfRange(i64, usize),
    #[error("label has both a string and a numeric value, or neither")]
    MalformedLabel,
}
