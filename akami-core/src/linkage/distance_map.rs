//! Sparse per-cluster distance rows.
//!
//! Each active cluster owns a [`NeighbourMap`]: a small integer-keyed map
//! from neighbouring cluster ids to the current linkage distance. The merge
//! combinators implement the complete-, average-, and single-linkage update
//! rules; each runs in time proportional to the combined entry count of its
//! two inputs, which the builder relies on to stay sub-quadratic.

use std::collections::HashMap;
use std::collections::hash_map;

use thiserror::Error;

/// Error raised when a neighbour lookup misses.
///
/// A miss indicates a connectivity-propagation bug, never a recoverable
/// condition; the builder surfaces it as a fatal invariant violation.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
#[error("no stored distance for neighbour {key}")]
pub struct KeyNotFound {
    /// The cluster id that had no stored distance.
    pub key: usize,
}

/// Sparse row of distances from one cluster to its connectivity neighbours.
///
/// # Examples
/// ```
/// use akami_core::NeighbourMap;
///
/// let mut row = NeighbourMap::new();
/// row.insert(3, 0.5);
/// assert_eq!(row.get(3)?, 0.5);
/// assert_eq!(row.remove(3), Some(0.5));
/// assert!(row.is_empty());
/// # Ok::<(), akami_core::KeyNotFound>(())
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NeighbourMap {
    entries: HashMap<usize, f64>,
}

impl NeighbourMap {
    /// Creates an empty row.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty row sized for `capacity` neighbours.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: HashMap::with_capacity(capacity),
        }
    }

    /// Returns the stored distance to `key`.
    ///
    /// # Errors
    /// Returns [`KeyNotFound`] when no distance is stored for `key`.
    pub fn get(&self, key: usize) -> Result<f64, KeyNotFound> {
        self.entries.get(&key).copied().ok_or(KeyNotFound { key })
    }

    /// Stores the distance to `key`, replacing any previous value.
    pub fn insert(&mut self, key: usize, value: f64) {
        self.entries.insert(key, value);
    }

    /// Removes the entry for `key`, returning the stored distance if present.
    pub fn remove(&mut self, key: usize) -> Option<f64> {
        self.entries.remove(&key)
    }

    /// Returns whether a distance is stored for `key`.
    #[must_use]
    pub fn contains(&self, key: usize) -> bool {
        self.entries.contains_key(&key)
    }

    /// Returns the number of stored neighbours.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether the row has no neighbours.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over `(neighbour, distance)` pairs in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.entries.iter().map(|(&key, &value)| (key, value))
    }

    /// Iterates over neighbour ids in unspecified order.
    pub fn keys(&self) -> impl Iterator<Item = usize> + '_ {
        self.entries.keys().copied()
    }

    /// Combines two rows under the complete-linkage rule.
    ///
    /// The merged distance to a neighbour present in both rows is the larger
    /// of the two stored values; a neighbour present in only one row keeps
    /// that value. Neighbours whose id is not set in `mask` are dropped.
    /// The weights are unused by this rule but kept so all combinators share
    /// one signature.
    #[must_use]
    pub fn max_merge(a: &Self, b: &Self, mask: &[bool], _n_a: usize, _n_b: usize) -> Self {
        Self::combine(a, b, mask, f64::max)
    }

    /// Combines two rows under the weighted average-linkage rule.
    ///
    /// For a neighbour present in both rows the merged distance is
    /// `(n_a * a[j] + n_b * b[j]) / (n_a + n_b)`; a neighbour present in only
    /// one row keeps that value unchanged (the asymmetric fallback: the
    /// absent parent contributes no recorded pairs). Neighbours whose id is
    /// not set in `mask` are dropped.
    #[must_use]
    pub fn average_merge(a: &Self, b: &Self, mask: &[bool], n_a: usize, n_b: usize) -> Self {
        let weight_a = n_a as f64;
        let weight_b = n_b as f64;
        let total = weight_a + weight_b;
        let mut merged = Self::with_capacity(a.len() + b.len());
        for (key, value) in a.iter() {
            if mask.get(key).copied().unwrap_or(false) {
                merged.insert(key, value);
            }
        }
        for (key, value) in b.iter() {
            if !mask.get(key).copied().unwrap_or(false) {
                continue;
            }
            match merged.entries.entry(key) {
                hash_map::Entry::Occupied(mut entry) => {
                    let combined = (weight_a * *entry.get() + weight_b * value) / total;
                    entry.insert(combined);
                }
                hash_map::Entry::Vacant(entry) => {
                    entry.insert(value);
                }
            }
        }
        merged
    }

    /// Combines two rows under the single-linkage rule.
    ///
    /// The merged distance to a neighbour present in both rows is the smaller
    /// of the two stored values; a neighbour present in only one row keeps
    /// that value. Neighbours whose id is not set in `mask` are dropped.
    #[must_use]
    pub fn min_merge(a: &Self, b: &Self, mask: &[bool], _n_a: usize, _n_b: usize) -> Self {
        Self::combine(a, b, mask, f64::min)
    }

    fn combine(a: &Self, b: &Self, mask: &[bool], pick: fn(f64, f64) -> f64) -> Self {
        let mut merged = Self::with_capacity(a.len() + b.len());
        for (key, value) in a.iter() {
            if mask.get(key).copied().unwrap_or(false) {
                merged.insert(key, value);
            }
        }
        for (key, value) in b.iter() {
            if !mask.get(key).copied().unwrap_or(false) {
                continue;
            }
            match merged.entries.entry(key) {
                hash_map::Entry::Occupied(mut entry) => {
                    let combined = pick(*entry.get(), value);
                    entry.insert(combined);
                }
                hash_map::Entry::Vacant(entry) => {
                    entry.insert(value);
                }
            }
        }
        merged
    }
}

impl FromIterator<(usize, f64)> for NeighbourMap {
    fn from_iter<I: IntoIterator<Item = (usize, f64)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
