// Copyright 2021-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! The exclusive granularity choice (spec.md section 4.6's table) and how
//! each one folds a `Location`'s address, mapping, and line entries.

/// Which frame attributes are significant for node identity. `Functions`
/// is the default, matching the teacher crate's own default aggregation
/// depth for its allocation/cpu profiles.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Granularity {
    Addresses,
    Lines,
    #[default]
    Functions,
    FunctionNameOnly,
    Files,
    NoInlines,
    AddressNoInlines,
}

impl Granularity {
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "addresses" => Granularity::Addresses,
            "lines" => Granularity::Lines,
            "functions" => Granularity::Functions,
            "functionnameonly" => Granularity::FunctionNameOnly,
            "files" => Granularity::Files,
            "noinlines" => Granularity::NoInlines,
            "addressnoinlines" => Granularity::AddressNoInlines,
            _ => return None,
        })
    }

    /// Whether this granularity keeps the location's address (and
    /// therefore its mapping) significant.
    pub fn keeps_address(self) -> bool {
        matches!(self, Granularity::Addresses | Granularity::AddressNoInlines)
    }

    /// Whether this granularity keeps only the outermost (least-inlined)
    /// line of a location, discarding the inlined chain.
    pub fn keeps_only_outermost_line(self) -> bool {
        matches!(self, Granularity::NoInlines | Granularity::AddressNoInlines)
    }

    /// Whether each retained line's number is significant.
    pub fn keeps_line_number(self) -> bool {
        matches!(self, Granularity::Addresses | Granularity::Lines)
    }

    /// Whether the function's filename is significant.
    pub fn keeps_filename(self) -> bool {
        matches!(
            self,
            Granularity::Lines
                | Granularity::Functions
                | Granularity::Files
                | Granularity::Addresses
                | Granularity::NoInlines
                | Granularity::AddressNoInlines
        )
    }

    /// Whether the function name is significant (as opposed to only its
    /// file, per `Files`).
    pub fn keeps_function_name(self) -> bool {
        !matches!(self, Granularity::Files)
    }
}
