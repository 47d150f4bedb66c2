//! Process-wide global name to index mapping (source spec §3 "Heap
//! Allocator").
//!
//! Every top-level `var`/`function`/`class` binding and every module export
//! lives in a flat, dense table of 16-bit indices rather than by name, so the
//! VM can address globals with a fixed-width operand instead of a string
//! lookup. The map is shared across every [`crate::context::Compiler`]
//! instance started within one compilation (a module graph compiles each of
//! its modules against the same [`GlobalIndexMap`]), which is what lets one
//! module's `GetGlobal` reach a binding registered while compiling another.

use rustc_hash::FxHashMap;

/// Dense, append-only name -> index table.
///
/// Indices are never reused or reassigned once handed out: a name looked up
/// twice always resolves to the same index for the lifetime of the map.
#[derive(Debug, Default)]
pub struct GlobalIndexMap {
    indices: FxHashMap<String, u16>,
    names: Vec<String>,
}

impl GlobalIndexMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up or create the index for `name`.
    ///
    /// # Panics
    /// Panics if more than `u16::MAX` distinct globals are registered across
    /// the whole compilation — the VM's `GetGlobal`/`SetGlobal` operand is a
    /// fixed 16 bits wide, so this is an internal invariant violation rather
    /// than a recoverable compile error.
    pub fn get_or_insert(&mut self, name: &str) -> u16 {
        if let Some(&idx) = self.indices.get(name) {
            return idx;
        }
        let idx = self.names.len();
        assert!(
            idx <= u16::MAX as usize,
            "global index map exhausted: more than {} distinct globals",
            u16::MAX as usize + 1
        );
        let idx = idx as u16;
        self.names.push(name.to_string());
        self.indices.insert(name.to_string(), idx);
        idx
    }

    /// Look up an existing index without creating one.
    pub fn get(&self, name: &str) -> Option<u16> {
        self.indices.get(name).copied()
    }

    pub fn name_of(&self, index: u16) -> Option<&str> {
        self.names.get(index as usize).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_name_same_index() {
        let mut map = GlobalIndexMap::new();
        let a = map.get_or_insert("foo");
        let b = map.get_or_insert("foo");
        assert_eq!(a, b);
    }

    #[test]
    fn distinct_names_distinct_indices() {
        let mut map = GlobalIndexMap::new();
        let a = map.get_or_insert("foo");
        let b = map.get_or_insert("bar");
        assert_ne!(a, b);
    }

    #[test]
    fn name_of_round_trips() {
        let mut map = GlobalIndexMap::new();
        let idx = map.get_or_insert("baz");
        assert_eq!(map.name_of(idx), Some("baz"));
    }

    #[test]
    fn get_without_insert_is_none() {
        let map = GlobalIndexMap::new();
        assert_eq!(map.get("missing"), None);
    }
}
