// Copyright 2021-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

fn main() -> Result<(), std::io::Error> {
    prost_build::compile_protos(&["src/codec/profile.proto"], &["src/codec"])?;
    Ok(())
}
