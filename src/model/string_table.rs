// Copyright 2021-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Holds unique strings and hands out [`StringId`]s in first-seen insertion
//! order, the same interning discipline the teacher crate uses for function,
//! location, and mapping tables (`collections::identifiable::Dedup`). Unlike
//! the teacher's arena-backed `StringTable` (which leans on an internal
//! `datadog-alloc` sibling crate for custom allocation), this one simply owns
//! boxed strings in an [`indexmap::IndexSet`] — see DESIGN.md for why that
//! dependency was dropped.

use crate::model::ids::{Id, StringId};
use std::hash::BuildHasherDefault;

type FxIndexSet<K> = indexmap::IndexSet<K, BuildHasherDefault<rustc_hash::FxHasher>>;

#[derive(Clone, Debug)]
pub struct StringTable {
    strings: FxIndexSet<Box<str>>,
}

impl Default for StringTable {
    fn default() -> Self {
        Self::new()
    }
}

impl StringTable {
    /// Creates a new string table holding only the empty string at id 1
    /// (offset 0), matching spec.md's `strings[0] == ""` invariant once
    /// ids are viewed as 1-based.
    pub fn new() -> Self {
        let mut strings = FxIndexSet::default();
        strings.insert("".into());
        Self { strings }
    }

    pub fn intern(&mut self, s: &str) -> StringId {
        if let Some(offset) = self.strings.get_index_of(s) {
            return StringId::from_offset(offset);
        }
        let (offset, _) = self.strings.insert_full(s.into());
        StringId::from_offset(offset)
    }

    pub fn get(&self, id: StringId) -> Option<&str> {
        self.strings.get_index(id.to_offset()).map(|s| s.as_ref())
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        false // always holds at least the empty string
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.strings.iter().map(|s| s.as_ref())
    }

    pub fn into_vec(self) -> Vec<String> {
        self.strings.into_iter().map(String::from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_string_is_first() {
        let table = StringTable::new();
        assert_eq!(Some(""), table.get(StringId::from_offset(0)));
    }

    #[test]
    fn interning_dedups() {
        let mut table = StringTable::new();
        let a = table.intern("foo");
        let b = table.intern("foo");
        assert_eq!(a, b);
        assert_eq!(2, table.len());
    }
}
