//! Hierarchical agglomerative linkage-tree construction.
//!
//! The builder maintains one sparse distance row per active cluster, a
//! priority queue of candidate merges with lazy deletion, and (for Ward)
//! per-cluster sufficient statistics, then repeatedly merges the globally
//! cheapest connected pair. Disconnected constraint graphs are closed with
//! forced top-level merges rather than rejected; the pre-forced component
//! count is reported on the resulting [`LinkageTree`].

mod builder;
mod connectivity;
mod cut;
mod distance_map;
mod moments;
mod union_find;

#[cfg(test)]
mod tests;

use core::fmt;
use std::str::FromStr;

use crate::distance::{Affinity, DistanceError};

pub use self::builder::{TreeInput, build_tree};
pub use self::connectivity::Connectivity;
pub use self::distance_map::{KeyNotFound, NeighbourMap};

/// Errors returned by tree construction and cutting.
#[derive(Clone, Debug, thiserror::Error, PartialEq)]
#[non_exhaustive]
pub enum LinkageError {
    /// Tree construction requires at least two samples.
    #[error("linkage requires at least 2 samples, got {items}")]
    InsufficientSamples {
        /// Number of samples supplied.
        items: usize,
    },
    /// The connectivity structure does not cover the sample set.
    #[error("connectivity covers {rows} samples but the input has {expected}")]
    ShapeMismatch {
        /// Samples covered by the connectivity structure.
        rows: usize,
        /// Samples present in the input.
        expected: usize,
    },
    /// The requested linkage criterion name is unknown.
    #[error("unknown linkage criterion `{name}`; expected ward, complete, average, or single")]
    UnsupportedCriterion {
        /// The unrecognised criterion name.
        name: String,
    },
    /// Ward linkage is only defined for Euclidean geometry.
    #[error("{linkage} linkage is incompatible with the {affinity} affinity")]
    IncompatibleAffinity {
        /// The affinity that was requested.
        affinity: Affinity,
        /// The linkage criterion it clashes with.
        linkage: Linkage,
    },
    /// A pairwise distance was NaN or infinite.
    #[error("non-finite distance between samples {left} and {right}")]
    NonFiniteDistance {
        /// First sample of the offending pair.
        left: usize,
        /// Second sample of the offending pair.
        right: usize,
    },
    /// A distance kernel rejected its input.
    #[error("distance computation failed: {source}")]
    Distance {
        /// Underlying kernel failure.
        #[source]
        source: DistanceError,
    },
    /// A connectivity edge referenced a sample outside the input.
    #[error("connectivity edge references node {node}, but there are {n_leaves} samples")]
    InvalidEdge {
        /// The out-of-range node id.
        node: usize,
        /// Number of samples in the input.
        n_leaves: usize,
    },
    /// The requested flat cluster count is outside `[1, n_leaves]`.
    #[error("cannot cut {n_leaves} leaves into {requested} clusters")]
    InvalidClusterCount {
        /// The requested cluster count.
        requested: usize,
        /// Number of leaves in the tree.
        n_leaves: usize,
    },
    /// A partial tree only supports cuts at or above its frontier size.
    #[error("partial tree has {available} top-level clusters; cannot cut into {requested}")]
    PartialTreeCut {
        /// The requested cluster count.
        requested: usize,
        /// Top-level clusters available in the partial tree.
        available: usize,
    },
    /// An internal invariant was violated, indicating a propagation bug.
    #[error("linkage invariant violated: {invariant} (cluster {cluster}, neighbour {neighbour})")]
    InvariantViolation {
        /// Name of the violated invariant to assist debugging.
        invariant: &'static str,
        /// Cluster id involved in the violation.
        cluster: usize,
        /// Neighbour id involved in the violation.
        neighbour: usize,
    },
}

impl LinkageError {
    /// Returns a stable, machine-readable error code for the variant.
    #[must_use]
    pub const fn code(&self) -> LinkageErrorCode {
        match self {
            Self::InsufficientSamples { .. } => LinkageErrorCode::InsufficientSamples,
            Self::ShapeMismatch { .. } => LinkageErrorCode::ShapeMismatch,
            Self::UnsupportedCriterion { .. } => LinkageErrorCode::UnsupportedCriterion,
            Self::IncompatibleAffinity { .. } => LinkageErrorCode::IncompatibleAffinity,
            Self::NonFiniteDistance { .. } => LinkageErrorCode::NonFiniteDistance,
            Self::Distance { .. } => LinkageErrorCode::DistanceFailure,
            Self::InvalidEdge { .. } => LinkageErrorCode::InvalidEdge,
            Self::InvalidClusterCount { .. } => LinkageErrorCode::InvalidClusterCount,
            Self::PartialTreeCut { .. } => LinkageErrorCode::PartialTreeCut,
            Self::InvariantViolation { .. } => LinkageErrorCode::InvariantViolation,
        }
    }
}

/// Machine-readable error codes for [`LinkageError`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum LinkageErrorCode {
    /// Tree construction requires at least two samples.
    InsufficientSamples,
    /// The connectivity structure does not cover the sample set.
    ShapeMismatch,
    /// The requested linkage criterion name is unknown.
    UnsupportedCriterion,
    /// Ward linkage is only defined for Euclidean geometry.
    IncompatibleAffinity,
    /// A pairwise distance was NaN or infinite.
    NonFiniteDistance,
    /// A distance kernel rejected its input.
    DistanceFailure,
    /// A connectivity edge referenced a sample outside the input.
    InvalidEdge,
    /// The requested flat cluster count is outside `[1, n_leaves]`.
    InvalidClusterCount,
    /// A partial tree only supports cuts at or above its frontier size.
    PartialTreeCut,
    /// An internal invariant was violated.
    InvariantViolation,
}

impl LinkageErrorCode {
    /// Returns the symbolic identifier for logging and metrics surfaces.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InsufficientSamples => "INSUFFICIENT_SAMPLES",
            Self::ShapeMismatch => "SHAPE_MISMATCH",
            Self::UnsupportedCriterion => "UNSUPPORTED_CRITERION",
            Self::IncompatibleAffinity => "INCOMPATIBLE_AFFINITY",
            Self::NonFiniteDistance => "NON_FINITE_DISTANCE",
            Self::DistanceFailure => "DISTANCE_FAILURE",
            Self::InvalidEdge => "INVALID_EDGE",
            Self::InvalidClusterCount => "INVALID_CLUSTER_COUNT",
            Self::PartialTreeCut => "PARTIAL_TREE_CUT",
            Self::InvariantViolation => "INVARIANT_VIOLATION",
        }
    }
}

/// Linkage criterion: the rule for computing the cost of merging two
/// clusters.
///
/// # Examples
/// ```
/// use akami_core::Linkage;
///
/// let linkage: Linkage = "average".parse()?;
/// assert_eq!(linkage, Linkage::Average);
/// assert!("foo".parse::<Linkage>().is_err());
/// # Ok::<(), akami_core::LinkageError>(())
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Linkage {
    /// Minimise the within-cluster variance increase (Euclidean only).
    Ward,
    /// Maximum pairwise distance between cluster members.
    Complete,
    /// Mean pairwise distance between cluster members.
    Average,
    /// Minimum pairwise distance between cluster members.
    Single,
}

impl fmt::Display for Linkage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ward => f.write_str("ward"),
            Self::Complete => f.write_str("complete"),
            Self::Average => f.write_str("average"),
            Self::Single => f.write_str("single"),
        }
    }
}

impl FromStr for Linkage {
    type Err = LinkageError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "ward" => Ok(Self::Ward),
            "complete" => Ok(Self::Complete),
            "average" => Ok(Self::Average),
            "single" => Ok(Self::Single),
            other => Err(LinkageError::UnsupportedCriterion {
                name: other.to_owned(),
            }),
        }
    }
}

/// Non-fatal advisory attached to a completed tree.
///
/// The operation succeeded and the result is usable, but with reduced
/// guarantees the caller should know about.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum TreeAdvisory {
    /// The constraint graph was disconnected; the gaps were closed with
    /// forced top-level merges at the maximum observed height.
    Disconnected {
        /// Number of disjoint components before the forced merges.
        components: usize,
    },
    /// Construction stopped early at the requested cluster count; the
    /// partial tree cannot derive flat clusterings below that count.
    PartialTree {
        /// The cluster count construction stopped at.
        n_clusters: usize,
    },
}

impl fmt::Display for TreeAdvisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected { components } => write!(
                f,
                "connectivity had {components} components; forced merges closed the gaps"
            ),
            Self::PartialTree { n_clusters } => write!(
                f,
                "tree construction stopped early at {n_clusters} clusters"
            ),
        }
    }
}

/// Binary merge tree produced by [`build_tree`].
///
/// Node ids `[0, n_leaves)` denote the original samples; internal nodes are
/// numbered from `n_leaves` in creation order, and merge heights are weakly
/// non-decreasing in that order.
#[derive(Clone, Debug, PartialEq)]
pub struct LinkageTree {
    n_leaves: usize,
    children: Vec<(usize, usize)>,
    heights: Vec<f64>,
    leaf_counts: Vec<usize>,
    parents: Vec<usize>,
    n_components: usize,
    advisories: Vec<TreeAdvisory>,
}

impl LinkageTree {
    pub(crate) fn new(
        n_leaves: usize,
        children: Vec<(usize, usize)>,
        heights: Vec<f64>,
        leaf_counts: Vec<usize>,
        parents: Vec<usize>,
        n_components: usize,
        advisories: Vec<TreeAdvisory>,
    ) -> Self {
        Self {
            n_leaves,
            children,
            heights,
            leaf_counts,
            parents,
            n_components,
            advisories,
        }
    }

    /// Number of original samples (leaves).
    #[must_use]
    pub fn n_leaves(&self) -> usize {
        self.n_leaves
    }

    /// Total number of nodes, leaves plus internal.
    #[must_use]
    pub fn n_nodes(&self) -> usize {
        self.n_leaves + self.children.len()
    }

    /// Child pairs of the internal nodes in creation order; entry `i`
    /// describes the node with id `n_leaves + i`.
    #[must_use]
    pub fn children(&self) -> &[(usize, usize)] {
        &self.children
    }

    /// Merge heights parallel to [`Self::children`].
    #[must_use]
    pub fn heights(&self) -> &[f64] {
        &self.heights
    }

    /// Leaf counts for every node, leaves included.
    #[must_use]
    pub fn leaf_counts(&self) -> &[usize] {
        &self.leaf_counts
    }

    /// Parent pointers for every node; roots point at themselves.
    #[must_use]
    pub fn parents(&self) -> &[usize] {
        &self.parents
    }

    /// Number of disjoint connectivity components before forced merges.
    #[must_use]
    pub fn n_components(&self) -> usize {
        self.n_components
    }

    /// Advisories accumulated during construction.
    #[must_use]
    pub fn advisories(&self) -> &[TreeAdvisory] {
        &self.advisories
    }

    /// Whether construction stopped before reaching a single root.
    #[must_use]
    pub fn is_partial(&self) -> bool {
        self.children.len() + 1 < self.n_leaves
    }

    /// Cuts the tree into exactly `k` flat clusters.
    ///
    /// Labels are `[0, k)`; the `k` surviving subtree roots are sorted
    /// ascending and labelled in that order, so `k == n_leaves` assigns every
    /// leaf its own index.
    ///
    /// # Errors
    /// Returns [`LinkageError::InvalidClusterCount`] when `k` is outside
    /// `[1, n_leaves]` and [`LinkageError::PartialTreeCut`] when the tree was
    /// stopped early and `k` is below its frontier size.
    pub fn cut(&self, k: usize) -> Result<Vec<usize>, LinkageError> {
        cut::cut(k, self)
    }
}
