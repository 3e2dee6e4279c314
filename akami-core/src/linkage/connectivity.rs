//! Connectivity constraint graphs and merge-time neighbour propagation.
//!
//! A [`Connectivity`] is a symmetric adjacency relation over the original
//! samples; only pairs of clusters joined by at least one original edge may
//! merge. When two clusters dissolve into a parent, the parent's adjacency is
//! the union of both neighbour sets minus the dissolved ids, every
//! neighbour's back-edges are rewired to the parent, and the dissolved rows
//! are dropped so peak memory stays proportional to the live edge count.

use super::{LinkageError, distance_map::NeighbourMap, union_find::DisjointSet};

/// Symmetric connectivity constraint over `n` samples.
///
/// # Examples
/// ```
/// use akami_core::Connectivity;
///
/// let connectivity = Connectivity::from_edges(4, &[(0, 1), (1, 2), (2, 3)])?;
/// assert_eq!(connectivity.len(), 4);
/// assert_eq!(connectivity.component_count(), 1);
/// assert_eq!(connectivity.neighbours(1), &[0, 2]);
/// # Ok::<(), akami_core::LinkageError>(())
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Connectivity {
    neighbours: Vec<Vec<usize>>,
    components: usize,
}

impl Connectivity {
    /// Builds the complete graph over `n` samples (no constraint).
    #[must_use]
    pub fn full(n: usize) -> Self {
        let neighbours = (0..n)
            .map(|i| (0..n).filter(|&j| j != i).collect())
            .collect();
        Self {
            neighbours,
            components: usize::from(n > 0),
        }
    }

    /// Builds a constraint graph from an undirected edge list.
    ///
    /// Edges are symmetrised and deduplicated; self-loops are ignored.
    ///
    /// # Errors
    /// Returns [`LinkageError::InvalidEdge`] when an endpoint is outside
    /// `[0, n)`.
    pub fn from_edges(n: usize, edges: &[(usize, usize)]) -> Result<Self, LinkageError> {
        let mut neighbours: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut dsu = DisjointSet::new(n);
        for &(left, right) in edges {
            for node in [left, right] {
                if node >= n {
                    return Err(LinkageError::InvalidEdge { node, n_leaves: n });
                }
            }
            if left == right {
                continue;
            }
            neighbours[left].push(right);
            neighbours[right].push(left);
            dsu.union(left, right);
        }
        for row in &mut neighbours {
            row.sort_unstable();
            row.dedup();
        }
        Ok(Self {
            neighbours,
            components: dsu.component_count(),
        })
    }

    /// Builds a constraint graph from a dense row-major 0/1 (or weighted)
    /// matrix; any non-zero off-diagonal entry becomes an edge.
    ///
    /// # Errors
    /// Returns [`LinkageError::ShapeMismatch`] when the buffer is not an
    /// `n x n` square.
    pub fn from_dense(n: usize, values: &[f64]) -> Result<Self, LinkageError> {
        if values.len() != n * n {
            return Err(LinkageError::ShapeMismatch {
                rows: values.len().isqrt(),
                expected: n,
            });
        }
        let mut edges = Vec::new();
        for i in 0..n {
            for j in (i + 1)..n {
                if values[i * n + j] != 0.0 || values[j * n + i] != 0.0 {
                    edges.push((i, j));
                }
            }
        }
        Self::from_edges(n, &edges)
    }

    /// Returns the number of samples the graph covers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.neighbours.len()
    }

    /// Returns whether the graph covers no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.neighbours.is_empty()
    }

    /// Returns the sorted neighbour list of one sample.
    #[must_use]
    pub fn neighbours(&self, node: usize) -> &[usize] {
        &self.neighbours[node]
    }

    /// Returns the number of disjoint connected components.
    ///
    /// A count above one is not an error: the builder closes the gaps with
    /// forced top-level merges and reports the count alongside the tree.
    #[must_use]
    pub fn component_count(&self) -> usize {
        self.components
    }
}

/// Returns the adjacency of the cluster about to replace `dissolved`: the
/// union of both neighbour sets restricted to `mask`, in ascending order.
///
/// The dissolved ids exclude themselves because `mask` is already false for
/// both by the time this runs.
pub(crate) fn merged_adjacency(a: &NeighbourMap, b: &NeighbourMap, mask: &[bool]) -> Vec<usize> {
    let mut union: Vec<usize> = a
        .keys()
        .chain(b.keys())
        .filter(|&key| mask.get(key).copied().unwrap_or(false))
        .collect();
    union.sort_unstable();
    union.dedup();
    union
}

/// Rewires every neighbour of a freshly merged cluster: removes the stale
/// edges back to the dissolved children and records an edge to `new_id` with
/// the combined distance. O(degree) in the merged row size.
pub(crate) fn rewire_neighbours(
    rows: &mut [Option<NeighbourMap>],
    dissolved: (usize, usize),
    new_id: usize,
    merged: &NeighbourMap,
) -> Result<(), LinkageError> {
    let (a, b) = dissolved;
    for (neighbour, value) in merged.iter() {
        let row = rows
            .get_mut(neighbour)
            .and_then(Option::as_mut)
            .ok_or(LinkageError::InvariantViolation {
                invariant: "merged adjacency references a dissolved cluster",
                cluster: new_id,
                neighbour,
            })?;
        row.remove(a);
        row.remove(b);
        row.insert(new_id, value);
    }
    Ok(())
}
