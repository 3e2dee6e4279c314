//! Result types for clustering operations.
//!
//! Provides structures to represent flat clustering results, including label
//! assignments and validation of label contiguity.

use std::collections::HashSet;
use thiserror::Error;

/// Represents the output of an [`crate::Agglomerative`] fit.
///
/// # Examples
/// ```
/// use akami_core::{ClusterId, ClusteringResult};
///
/// let result = ClusteringResult::try_from_assignments(
///     vec![ClusterId::new(0), ClusterId::new(1)],
/// )?;
/// assert_eq!(result.assignments().len(), 2);
/// assert_eq!(result.cluster_count(), 2);
/// # Ok::<(), akami_core::NonContiguousClusterIds>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusteringResult {
    assignments: Vec<ClusterId>,
    cluster_count: usize,
}

/// Error returned when cluster identifiers are not contiguous starting at zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum NonContiguousClusterIds {
    /// The assignments do not include cluster `0`.
    #[error("cluster identifiers must include 0")]
    MissingZero,
    /// The assignments skip identifiers.
    #[error("cluster identifiers must be contiguous without gaps")]
    Gap,
}

impl ClusteringResult {
    /// Attempts to build a result from per-sample label assignments.
    ///
    /// The labels must be contiguous starting at zero; the tree cutter
    /// guarantees this, so a violation here flags a caller-constructed
    /// result rather than an algorithm failure.
    ///
    /// An empty `assignments` vector is accepted and yields
    /// `cluster_count == 0`.
    ///
    /// # Errors
    /// Returns [`NonContiguousClusterIds::MissingZero`] when the assignments
    /// omit cluster `0` and [`NonContiguousClusterIds::Gap`] when identifiers
    /// skip values.
    pub fn try_from_assignments(
        assignments: Vec<ClusterId>,
    ) -> Result<Self, NonContiguousClusterIds> {
        if assignments.is_empty() {
            return Ok(Self {
                assignments,
                cluster_count: 0,
            });
        }

        let mut seen = HashSet::new();
        let mut max_id = 0usize;
        for id in &assignments {
            seen.insert(id.get());
            max_id = max_id.max(id.get());
        }

        if !seen.contains(&0) {
            return Err(NonContiguousClusterIds::MissingZero);
        }
        if seen.len() != max_id + 1 {
            return Err(NonContiguousClusterIds::Gap);
        }

        Ok(Self {
            assignments,
            cluster_count: seen.len(),
        })
    }

    /// Returns the assignments in sample order.
    #[must_use]
    pub fn assignments(&self) -> &[ClusterId] {
        &self.assignments
    }

    /// Counts how many distinct clusters exist within the assignments.
    #[must_use]
    pub fn cluster_count(&self) -> usize {
        self.cluster_count
    }
}

/// Identifier assigned to a flat cluster.
///
/// # Examples
/// ```
/// use akami_core::ClusterId;
///
/// let id = ClusterId::new(4);
/// assert_eq!(id.get(), 4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClusterId(usize);

impl ClusterId {
    /// Creates a new cluster identifier.
    #[must_use]
    pub const fn new(id: usize) -> Self {
        Self(id)
    }

    /// Returns the underlying numeric identifier.
    #[must_use]
    pub const fn get(self) -> usize {
        self.0
    }
}
