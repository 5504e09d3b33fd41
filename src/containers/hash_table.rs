//! Stand-in for the reference's open-addressing `dict`, backed by `indexmap::IndexMap` (kept
//! from the teacher's optional `indexmap` dependency in `examples/Diggsey-ijson/src/object.rs`,
//! which used the same crate as an alternate backing map). Used for the `HashTable` encoding of
//! Set and Hash, and for the dictionary portion of SortedSet's `SkipList` encoding.

use indexmap::IndexMap;

use super::Container;

#[derive(Debug, Clone, Default)]
pub struct HashTable<K, V> {
    map: IndexMap<K, V>,
}

impl<K: std::hash::Hash + Eq, V> HashTable<K, V> {
    pub fn new() -> Self {
        HashTable { map: IndexMap::new() }
    }

    pub fn insert(&mut self, key: K, value: V) {
        self.map.insert(key, value);
    }

    /// Number of hash-table slots, used for the `sizeof(bucket_ptr) * slot_count` term of
    /// `SPEC_FULL.md` §4.5. `IndexMap` doesn't expose raw bucket count, so this approximates it
    /// as the capacity, matching the reference's habit of over-provisioning slots versus live
    /// entries.
    pub fn slot_count(&self) -> usize {
        self.map.capacity().max(self.map.len())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.map.iter()
    }

    /// First `n` entries in insertion order, matching the reference's head-first sampling.
    pub fn sample(&self, n: usize) -> impl Iterator<Item = (&K, &V)> {
        self.map.iter().take(n)
    }
}

impl<K: std::hash::Hash + Eq, V> Container for HashTable<K, V> {
    fn element_count(&self) -> usize {
        self.map.len()
    }
}
