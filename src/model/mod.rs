// Copyright 2021-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! The canonical in-memory profile representation (spec.md section 3):
//! interned string/function/location/mapping tables plus the sample list
//! that references them.

pub mod error;
pub mod function;
pub mod ids;
pub mod label;
pub mod location;
pub mod mapping;
pub mod profile;
pub mod sample;
pub mod string_table;
pub mod value_type;

pub use error::ModelError;
pub use function::Function;
pub use ids::{Dedup, FunctionId, Id, Item, LocationId, MappingId, StringId};
pub use label::{Label, LabelValue, DIFF_BASE_LABEL_KEY, DIFF_BASE_LABEL_VALUE};
pub use location::{Line, Location};
pub use mapping::Mapping;
pub use profile::Profile;
pub use sample::Sample;
pub use string_table::StringTable;
pub use value_type::ValueType;
