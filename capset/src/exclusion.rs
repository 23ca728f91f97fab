//! Exclusion index: which combinations of selected points XOR to a value.
//!
//! Buckets are keyed by value, then by combination length. Empty buckets are
//! dropped as soon as they empty out, so "does anything map to `v`" is a
//! single hash lookup.

use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Ascending tuple of the points in one combination.
pub type Combination = Box<[u32]>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionIndex {
    buckets: HashMap<u32, BTreeMap<usize, BTreeSet<Combination>>>,
}

impl ExclusionIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `combination` under `value`. Returns false if it was already
    /// present.
    pub fn insert(&mut self, value: u32, combination: Combination) -> bool {
        self.buckets
            .entry(value)
            .or_default()
            .entry(combination.len())
            .or_default()
            .insert(combination)
    }

    /// Drops `combination` from the bucket for `value`, pruning the bucket if
    /// it becomes empty. Returns false if it was not present.
    pub fn remove(&mut self, value: u32, combination: &[u32]) -> bool {
        let Some(by_length) = self.buckets.get_mut(&value) else {
            return false;
        };
        let Some(set) = by_length.get_mut(&combination.len()) else {
            return false;
        };
        if !set.remove(combination) {
            return false;
        }
        if set.is_empty() {
            by_length.remove(&combination.len());
            if by_length.is_empty() {
                self.buckets.remove(&value);
            }
        }
        true
    }

    /// Lengths with at least one combination for `value`, ascending.
    pub fn lengths(&self, value: u32) -> impl Iterator<Item = usize> + '_ {
        self.buckets
            .get(&value)
            .into_iter()
            .flat_map(|by_length| by_length.keys().copied())
    }

    #[inline]
    pub fn has_length(&self, value: u32, length: usize) -> bool {
        self.buckets
            .get(&value)
            .is_some_and(|by_length| by_length.contains_key(&length))
    }

    /// Combinations of `length` points that XOR to `value`, in ascending order.
    pub fn combinations(&self, value: u32, length: usize) -> impl Iterator<Item = &[u32]> + '_ {
        self.buckets
            .get(&value)
            .and_then(|by_length| by_length.get(&length))
            .into_iter()
            .flat_map(|set| set.iter().map(|c| &c[..]))
    }

    pub fn count(&self, value: u32, length: usize) -> usize {
        self.buckets
            .get(&value)
            .and_then(|by_length| by_length.get(&length))
            .map_or(0, BTreeSet::len)
    }

    /// Number of values with at least one combination.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Total number of stored combinations across all values and lengths.
    pub fn total_combinations(&self) -> usize {
        self.buckets
            .values()
            .flat_map(BTreeMap::values)
            .map(BTreeSet::len)
            .sum()
    }

    pub fn clear(&mut self) {
        self.buckets.clear();
    }
}
