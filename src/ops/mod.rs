// Copyright 2021-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! The merge/scale/normalization algebra over profiles (spec.md section 4.2
//! through 4.4).

pub mod adjust;
pub mod error;
pub mod merge;
pub mod normalize;
pub mod scale;

pub use adjust::{drop_negative, mean};
pub use error::OpsError;
pub use merge::merge;
pub use normalize::normalize;
pub use scale::{negate_as_diff_base, scale};
