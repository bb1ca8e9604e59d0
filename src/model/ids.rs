// Copyright 2021-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Dense, interned ids for the profile's tables. Identifier `0` is reserved
//! to mean "absent" (spec.md section 3); every other id is the table offset
//! plus one, so a freshly inserted item always gets the next dense id.

use std::hash::{BuildHasherDefault, Hash};
use std::num::NonZeroU32;

pub type FxIndexSet<K> = indexmap::IndexSet<K, BuildHasherDefault<rustc_hash::FxHasher>>;
pub type FxIndexMap<K, V> = indexmap::IndexMap<K, V, BuildHasherDefault<rustc_hash::FxHasher>>;

/// An interned, 1-based dense identifier. `to_raw_id()` is the wire-format
/// id; `to_offset()` is the table index.
pub trait Id: Copy + Eq + Hash {
    fn from_offset(offset: usize) -> Self;
    fn to_raw_id(&self) -> u64;
    fn to_offset(&self) -> usize {
        (self.to_raw_id() - 1) as usize
    }
}

/// A table entry type associated with an [`Id`].
pub trait Item: Eq + Hash {
    type Id: Id;
}

macro_rules! define_id {
    ($name:ident) => {
        #[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
        pub struct $name(NonZeroU32);

        impl Id for $name {
            fn from_offset(offset: usize) -> Self {
                Self(non_zero_dense_id(offset))
            }

            fn to_raw_id(&self) -> u64 {
                self.0.get() as u64
            }
        }

        impl $name {
            /// The reserved id meaning "absent". Only meaningful for ids that
            /// are optional on the wire (e.g. `MappingId`); dense collections
            /// never hand this one out.
            pub const ABSENT: u64 = 0;
        }
    };
}

define_id!(StringId);
define_id!(FunctionId);
define_id!(LocationId);
define_id!(MappingId);

impl StringId {
    pub const ZERO: StringId = StringId(match NonZeroU32::new(1) {
        Some(v) => v,
        None => unreachable!(),
    });
}

/// Converts a zero-based offset into a dense, 1-based id.
///
/// # Panics
/// Panics if `offset + 1` overflows a u32, which would require more than
/// four billion entries in a single table.
fn non_zero_dense_id(offset: usize) -> NonZeroU32 {
    let small: u32 = offset
        .try_into()
        .expect("table offset to fit into a u32 for id allocation");
    NonZeroU32::new(small.checked_add(1).expect("table offset to not overflow u32"))
        .expect("offset + 1 to be non-zero")
}

/// Deduplicates an [`Item`] into a dense [`FxIndexSet`], returning its id.
pub trait Dedup<T: Item> {
    fn dedup(&mut self, item: T) -> T::Id;
}

impl<T: Item> Dedup<T> for FxIndexSet<T> {
    fn dedup(&mut self, item: T) -> T::Id {
        let (offset, _) = self.insert_full(item);
        T::Id::from_offset(offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_one_based_and_dense() {
        assert_eq!(1, StringId::from_offset(0).to_raw_id());
        assert_eq!(2, StringId::from_offset(1).to_raw_id());
        assert_eq!(0, StringId::from_offset(0).to_offset());
    }
}
