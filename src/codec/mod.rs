// Copyright 2021-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Converts between the on-wire, gzip-wrapped pprof protobuf format and the
//! in-memory model (spec.md section 4.1 and section 6). Round-trip property:
//! `decode(encode(p))` is semantically equal to `p` modulo id renumbering and
//! string-table reordering.

mod convert;
mod error;
#[allow(clippy::all)]
pub mod pprof;

pub use error::Error;

use crate::model::Profile;
use flate2::write::GzEncoder;
use flate2::Compression;
use prost::Message;
use std::io::{Read, Write};

/// Decodes a gzip-wrapped pprof protobuf buffer into a [`Profile`].
#[tracing::instrument(skip_all, fields(bytes = data.len()))]
pub fn decode(data: &[u8]) -> Result<Profile, Error> {
    let mut gunzipped = Vec::new();
    flate2::read::GzDecoder::new(data)
        .read_to_end(&mut gunzipped)
        .map_err(Error::Gzip)?;
    let wire = pprof::Profile::decode(gunzipped.as_slice())?;
    let profile = convert::decode_profile(wire)?;
    tracing::debug!(samples = profile.samples.len(), "decoded profile");
    Ok(profile)
}

/// Encodes a [`Profile`] into a gzip-wrapped pprof protobuf buffer, interning
/// in first-seen order and compacting ids to dense ranges (spec.md 4.1).
#[tracing::instrument(skip_all, fields(samples = profile.samples.len()))]
pub fn encode(profile: &Profile) -> Result<Vec<u8>, Error> {
    let wire = convert::encode_profile(profile);
    let mut buf = Vec::with_capacity(wire.encoded_len());
    wire.encode(&mut buf)?;

    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&buf).map_err(Error::Gzip)?;
    encoder.finish().map_err(Error::Gzip)
}
