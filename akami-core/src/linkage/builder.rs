//! Linkage-tree construction.
//!
//! One merge loop serves every criterion: a min-heap of candidate merges with
//! lazy deletion (stale candidates are discarded on pop rather than eagerly
//! invalidated, which keeps the loop sub-quadratic), per-cluster sparse
//! distance rows, and either Ward moments or a row combinator to price the
//! merged cluster against its remaining neighbours. The unconstrained path
//! runs the same loop over the complete graph, so structural equality with an
//! explicit all-ones connectivity holds by construction.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::num::NonZeroUsize;

use rayon::prelude::*;
use tracing::{info, instrument, warn};

use crate::distance::Affinity;
use crate::matrix::{DistanceMatrix, FeatureMatrix};

use super::connectivity::{merged_adjacency, rewire_neighbours};
use super::moments::WardMoments;
use super::{Connectivity, Linkage, LinkageError, LinkageTree, NeighbourMap, TreeAdvisory};

/// Input to [`build_tree`]: raw feature vectors with an affinity, or a
/// precomputed symmetric distance matrix.
#[derive(Clone, Copy, Debug)]
pub enum TreeInput<'a> {
    /// Raw samples; pairwise costs are computed with `affinity`.
    Features {
        /// Row-major sample matrix.
        matrix: &'a FeatureMatrix,
        /// Pairwise metric applied to the rows.
        affinity: Affinity,
    },
    /// Caller-supplied symmetric pairwise distances.
    Precomputed {
        /// Square distance matrix.
        matrix: &'a DistanceMatrix,
    },
}

impl TreeInput<'_> {
    /// Number of samples the input covers.
    #[must_use]
    pub fn n_leaves(&self) -> usize {
        match self {
            Self::Features { matrix, .. } => matrix.rows(),
            Self::Precomputed { matrix } => matrix.len(),
        }
    }

    /// Human-readable name of the underlying source.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Features { matrix, .. } => matrix.name(),
            Self::Precomputed { matrix } => matrix.name(),
        }
    }
}

/// A candidate merge of two active clusters.
///
/// Pairs are stored with `a < b` and ordered by `(cost, a, b)` using
/// `f64::total_cmp`, which is the deterministic tie-break for equal-cost
/// candidates: identical input always yields an identical tree.
#[derive(Clone, Copy, Debug)]
struct CandidateMerge {
    cost: f64,
    a: usize,
    b: usize,
}

impl CandidateMerge {
    fn new(cost: f64, x: usize, y: usize) -> Self {
        Self {
            cost,
            a: x.min(y),
            b: x.max(y),
        }
    }
}

impl PartialEq for CandidateMerge {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for CandidateMerge {}

impl PartialOrd for CandidateMerge {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CandidateMerge {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cost
            .total_cmp(&other.cost)
            .then_with(|| self.a.cmp(&other.a))
            .then_with(|| self.b.cmp(&other.b))
    }
}

type Combinator = fn(&NeighbourMap, &NeighbourMap, &[bool], usize, usize) -> NeighbourMap;

/// How merged clusters are priced against their neighbours.
enum CostModel {
    /// Ward moments; heights are `sqrt(2 * cost)`.
    Ward(WardMoments),
    /// Distance-row combinator; heights are the combined distances.
    Combine(Combinator),
}

/// Builds the agglomerative merge tree for `input` under `linkage`.
///
/// With a connectivity constraint only connected pairs may merge; a
/// disconnected graph is closed with forced top-level merges at the maximum
/// observed height and reported via [`LinkageTree::n_components`] and a
/// [`TreeAdvisory::Disconnected`]. Passing `None` runs the unconstrained
/// path (complete graph). A `n_clusters_hint` below the leaf count stops
/// construction once that many clusters remain, yielding a partial tree and
/// a [`TreeAdvisory::PartialTree`].
///
/// # Examples
/// ```
/// use akami_core::{Affinity, FeatureMatrix, Linkage, TreeInput, build_tree};
///
/// let matrix = FeatureMatrix::from_rows(
///     "toy",
///     vec![0.0, 0.0, 0.1, 0.0, 4.0, 4.0, 4.1, 4.0],
///     2,
/// )?;
/// let input = TreeInput::Features { matrix: &matrix, affinity: Affinity::Euclidean };
/// let tree = build_tree(input, None, Linkage::Ward, None)?;
/// assert_eq!(tree.children().len(), 3);
/// assert_eq!(tree.n_components(), 1);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
///
/// # Errors
/// Returns [`LinkageError::InsufficientSamples`] for fewer than two samples,
/// [`LinkageError::ShapeMismatch`] when the connectivity does not cover the
/// input, [`LinkageError::IncompatibleAffinity`] when Ward is paired with a
/// non-Euclidean affinity, and [`LinkageError::NonFiniteDistance`] when a
/// precomputed distance is NaN or infinite. All are detected before any
/// merge work begins.
#[instrument(
    name = "linkage.build_tree",
    err,
    skip(input, connectivity),
    fields(data_source = %input.name(), items = input.n_leaves(), linkage = %linkage),
)]
pub fn build_tree(
    input: TreeInput<'_>,
    connectivity: Option<&Connectivity>,
    linkage: Linkage,
    n_clusters_hint: Option<NonZeroUsize>,
) -> Result<LinkageTree, LinkageError> {
    let n_leaves = input.n_leaves();
    if n_leaves < 2 {
        return Err(LinkageError::InsufficientSamples { items: n_leaves });
    }
    if let Some(conn) = connectivity {
        if conn.len() != n_leaves {
            return Err(LinkageError::ShapeMismatch {
                rows: conn.len(),
                expected: n_leaves,
            });
        }
    }
    validate_affinity(&input, linkage)?;

    let owned_full;
    let conn = match connectivity {
        Some(conn) => conn,
        None => {
            owned_full = Connectivity::full(n_leaves);
            &owned_full
        }
    };
    let n_components = conn.component_count();

    let hinted = n_clusters_hint
        .map(NonZeroUsize::get)
        .filter(|&k| k < n_leaves);
    let target = n_leaves - hinted.unwrap_or(1);
    let n_nodes = n_leaves + target;

    let mut model = cost_model(&input, linkage);
    let rows_init = seed_rows(&input, conn, &model)?;

    let mut rows: Vec<Option<NeighbourMap>> = rows_init.into_iter().map(Some).collect();
    rows.resize_with(n_nodes, || None);

    let mut heap = BinaryHeap::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate().take(n_leaves) {
        let Some(row) = row else { continue };
        for (j, cost) in row.iter() {
            if j > i {
                heap.push(Reverse(CandidateMerge::new(cost, i, j)));
            }
        }
    }

    let mut active = vec![false; n_nodes];
    active[..n_leaves].fill(true);
    let mut leaf_counts = vec![1usize; n_nodes];
    let mut parents: Vec<usize> = (0..n_nodes).collect();
    let mut children: Vec<(usize, usize)> = Vec::with_capacity(target);
    let mut heights: Vec<f64> = Vec::with_capacity(target);
    let mut running_max = 0.0f64;

    while children.len() < target {
        let Some(Reverse(candidate)) = heap.pop() else {
            break;
        };
        // Lazy deletion: candidates referencing dissolved clusters are
        // discarded here instead of being scrubbed from the queue on merge.
        if !active[candidate.a] || !active[candidate.b] {
            continue;
        }
        let new_id = n_leaves + children.len();
        let (a, b) = (candidate.a, candidate.b);
        active[a] = false;
        active[b] = false;

        let row_a = take_row(&mut rows, a, b)?;
        let row_b = take_row(&mut rows, b, a)?;
        let merged = match &mut model {
            CostModel::Ward(moments) => {
                moments.merge(a, b, new_id);
                let mut merged =
                    NeighbourMap::with_capacity(row_a.len() + row_b.len());
                for j in merged_adjacency(&row_a, &row_b, &active) {
                    merged.insert(j, moments.cost(new_id, j));
                }
                merged
            }
            CostModel::Combine(combine) => {
                combine(&row_a, &row_b, &active, leaf_counts[a], leaf_counts[b])
            }
        };
        rewire_neighbours(&mut rows, (a, b), new_id, &merged)?;
        for (j, cost) in merged.iter() {
            heap.push(Reverse(CandidateMerge::new(cost, j, new_id)));
        }
        rows[new_id] = Some(merged);
        active[new_id] = true;

        let height = merge_height(&model, candidate.cost);
        // Monotonicity guard: clip rather than propagate an inversion.
        running_max = running_max.max(height);
        children.push((a, b));
        heights.push(running_max);
        leaf_counts[new_id] = leaf_counts[a] + leaf_counts[b];
        parents[a] = new_id;
        parents[b] = new_id;
    }

    if children.len() < target {
        force_component_merges(ForcedMergeState {
            rows: &mut rows,
            active: &mut active,
            leaf_counts: &mut leaf_counts,
            parents: &mut parents,
            children: &mut children,
            heights: &mut heights,
            model: &mut model,
            n_leaves,
            target,
            height: running_max,
        })?;
    }

    let mut advisories = Vec::new();
    if n_components > 1 {
        warn!(
            components = n_components,
            "connectivity graph is disconnected; closing gaps with forced merges"
        );
        advisories.push(TreeAdvisory::Disconnected {
            components: n_components,
        });
    }
    if let Some(n_clusters) = hinted {
        warn!(
            n_clusters,
            "stopping early; the partial tree only supports this cluster count"
        );
        advisories.push(TreeAdvisory::PartialTree { n_clusters });
    }

    info!(
        merges = children.len(),
        components = n_components,
        "linkage tree construction completed"
    );
    Ok(LinkageTree::new(
        n_leaves,
        children,
        heights,
        leaf_counts,
        parents,
        n_components,
        advisories,
    ))
}

fn validate_affinity(input: &TreeInput<'_>, linkage: Linkage) -> Result<(), LinkageError> {
    let affinity = match input {
        TreeInput::Features { affinity, .. } => *affinity,
        TreeInput::Precomputed { .. } => Affinity::Precomputed,
    };
    if linkage == Linkage::Ward && !affinity.is_euclidean() {
        return Err(LinkageError::IncompatibleAffinity { affinity, linkage });
    }
    if matches!(input, TreeInput::Features { .. }) && affinity == Affinity::Precomputed {
        return Err(LinkageError::IncompatibleAffinity { affinity, linkage });
    }
    Ok(())
}

fn cost_model(input: &TreeInput<'_>, linkage: Linkage) -> CostModel {
    match linkage {
        Linkage::Ward => {
            match input {
                TreeInput::Features { matrix, .. } => CostModel::Ward(WardMoments::from_samples(
                    matrix.data(),
                    matrix.rows(),
                    matrix.dimension(),
                )),
                // Unreachable in practice: validate_affinity rejects Ward
                // over precomputed input before this runs.
                TreeInput::Precomputed { .. } => CostModel::Combine(NeighbourMap::max_merge),
            }
        }
        Linkage::Complete => CostModel::Combine(NeighbourMap::max_merge),
        Linkage::Average => CostModel::Combine(NeighbourMap::average_merge),
        Linkage::Single => CostModel::Combine(NeighbourMap::min_merge),
    }
}

fn merge_height(model: &CostModel, cost: f64) -> f64 {
    match model {
        CostModel::Ward(_) => (2.0 * cost).sqrt(),
        CostModel::Combine(_) => cost,
    }
}

/// Seeds one sparse distance row per leaf from the adjacency-restricted
/// pairwise costs. Rows are independent, so this phase runs in parallel.
fn seed_rows(
    input: &TreeInput<'_>,
    conn: &Connectivity,
    model: &CostModel,
) -> Result<Vec<NeighbourMap>, LinkageError> {
    (0..conn.len())
        .into_par_iter()
        .map(|i| {
            let mut row = NeighbourMap::with_capacity(conn.neighbours(i).len());
            for &j in conn.neighbours(i) {
                row.insert(j, initial_cost(input, model, i, j)?);
            }
            Ok(row)
        })
        .collect()
}

fn initial_cost(
    input: &TreeInput<'_>,
    model: &CostModel,
    i: usize,
    j: usize,
) -> Result<f64, LinkageError> {
    if let CostModel::Ward(moments) = model {
        return Ok(moments.cost(i, j));
    }
    let cost = match input {
        TreeInput::Features { matrix, affinity } => {
            let kernel = affinity.kernel().ok_or(LinkageError::IncompatibleAffinity {
                affinity: *affinity,
                linkage: Linkage::Complete,
            })?;
            let dim = matrix.dimension();
            let data = matrix.data();
            kernel(&data[i * dim..(i + 1) * dim], &data[j * dim..(j + 1) * dim])
                .map_err(|source| LinkageError::Distance { source })?
        }
        TreeInput::Precomputed { matrix } => {
            matrix
                .get(i, j)
                .map_err(|_| LinkageError::InvariantViolation {
                    invariant: "connectivity references a sample outside the distance matrix",
                    cluster: i,
                    neighbour: j,
                })?
        }
    };
    if !cost.is_finite() {
        return Err(LinkageError::NonFiniteDistance {
            left: i.min(j),
            right: i.max(j),
        });
    }
    Ok(cost)
}

fn take_row(
    rows: &mut [Option<NeighbourMap>],
    id: usize,
    other: usize,
) -> Result<NeighbourMap, LinkageError> {
    rows.get_mut(id)
        .and_then(Option::take)
        .ok_or(LinkageError::InvariantViolation {
            invariant: "active cluster has no distance row",
            cluster: id,
            neighbour: other,
        })
}

struct ForcedMergeState<'a> {
    rows: &'a mut Vec<Option<NeighbourMap>>,
    active: &'a mut Vec<bool>,
    leaf_counts: &'a mut Vec<usize>,
    parents: &'a mut Vec<usize>,
    children: &'a mut Vec<(usize, usize)>,
    heights: &'a mut Vec<f64>,
    model: &'a mut CostModel,
    n_leaves: usize,
    target: usize,
    height: f64,
}

/// Closes a disconnected constraint graph: the surviving component roots are
/// merged in ascending-id order, left-folded, each at the maximum height
/// observed during the regular merges. Deterministic by construction.
fn force_component_merges(state: ForcedMergeState<'_>) -> Result<(), LinkageError> {
    let remaining: Vec<usize> = (0..state.n_leaves + state.children.len())
        .filter(|&id| state.active[id])
        .collect();
    let mut accumulated = match remaining.first() {
        Some(&first) => first,
        None => return Ok(()),
    };
    for &next in remaining.iter().skip(1) {
        if state.children.len() >= state.target {
            break;
        }
        let new_id = state.n_leaves + state.children.len();
        let (a, b) = (accumulated.min(next), accumulated.max(next));
        state.active[a] = false;
        state.active[b] = false;

        let row_a = take_row(state.rows, a, b)?;
        let row_b = take_row(state.rows, b, a)?;
        let merged = match state.model {
            CostModel::Ward(moments) => {
                moments.merge(a, b, new_id);
                let mut merged = NeighbourMap::with_capacity(row_a.len() + row_b.len());
                for j in merged_adjacency(&row_a, &row_b, state.active) {
                    merged.insert(j, moments.cost(new_id, j));
                }
                merged
            }
            CostModel::Combine(combine) => combine(
                &row_a,
                &row_b,
                state.active,
                state.leaf_counts[a],
                state.leaf_counts[b],
            ),
        };
        rewire_neighbours(state.rows, (a, b), new_id, &merged)?;
        state.rows[new_id] = Some(merged);
        state.active[new_id] = true;

        state.children.push((a, b));
        state.heights.push(state.height);
        state.leaf_counts[new_id] = state.leaf_counts[a] + state.leaf_counts[b];
        state.parents[a] = new_id;
        state.parents[b] = new_id;
        accumulated = new_id;
    }
    Ok(())
}
