//! Agglomerative clustering orchestration.
//!
//! Provides the [`Agglomerative`] estimator entry point: builds the linkage
//! tree for the configured criterion, cuts it at the configured cluster
//! count, and wraps failures with the originating data source name.

use std::{num::NonZeroUsize, sync::Arc};

use tracing::{info, instrument};

use crate::{
    Result,
    distance::Affinity,
    error::AgglomerativeError,
    linkage::{Connectivity, Linkage, LinkageError, LinkageTree, TreeInput, build_tree},
    matrix::{DistanceMatrix, FeatureMatrix},
    result::{ClusterId, ClusteringResult},
};

/// Entry point for running constrained agglomerative clustering.
///
/// # Examples
/// ```
/// use akami_core::{AgglomerativeBuilder, FeatureMatrix};
///
/// let matrix = FeatureMatrix::from_rows(
///     "toy",
///     vec![0.0, 0.0, 0.1, 0.0, 5.0, 5.0, 5.1, 5.0],
///     2,
/// )?;
/// let estimator = AgglomerativeBuilder::new()
///     .with_n_clusters(2)
///     .build()?;
/// let result = estimator.fit(&matrix)?;
/// assert_eq!(result.assignments().len(), 4);
/// assert_eq!(result.cluster_count(), 2);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct Agglomerative {
    n_clusters: NonZeroUsize,
    linkage: Linkage,
    affinity: Affinity,
    connectivity: Option<Connectivity>,
    compute_full_tree: bool,
}

impl Agglomerative {
    pub(crate) fn new(
        n_clusters: NonZeroUsize,
        linkage: Linkage,
        affinity: Affinity,
        connectivity: Option<Connectivity>,
        compute_full_tree: bool,
    ) -> Self {
        Self {
            n_clusters,
            linkage,
            affinity,
            connectivity,
            compute_full_tree,
        }
    }

    /// Returns the configured flat cluster count.
    #[must_use]
    pub fn n_clusters(&self) -> NonZeroUsize {
        self.n_clusters
    }

    /// Returns the configured linkage criterion.
    #[must_use]
    pub fn linkage(&self) -> Linkage {
        self.linkage
    }

    /// Returns the configured affinity.
    #[must_use]
    pub fn affinity(&self) -> Affinity {
        self.affinity
    }

    /// Clusters raw feature vectors.
    ///
    /// # Errors
    /// Returns [`AgglomerativeError::Linkage`] wrapping the underlying
    /// [`LinkageError`] when validation or tree construction fails; see
    /// [`build_tree`] for the precondition taxonomy.
    pub fn fit(&self, matrix: &FeatureMatrix) -> Result<ClusteringResult> {
        self.run(TreeInput::Features {
            matrix,
            affinity: self.affinity,
        })
    }

    /// Clusters samples described by a precomputed symmetric distance matrix.
    ///
    /// Ward linkage is rejected on this path: it needs Euclidean feature
    /// geometry, not bare distances.
    ///
    /// # Errors
    /// Returns [`AgglomerativeError::Linkage`] wrapping the underlying
    /// [`LinkageError`] when validation or tree construction fails.
    pub fn fit_precomputed(&self, matrix: &DistanceMatrix) -> Result<ClusteringResult> {
        self.run(TreeInput::Precomputed { matrix })
    }

    /// Builds and returns the raw linkage tree without cutting it.
    ///
    /// # Errors
    /// Same failure modes as [`Agglomerative::fit`].
    pub fn fit_tree(&self, matrix: &FeatureMatrix) -> Result<LinkageTree> {
        let input = TreeInput::Features {
            matrix,
            affinity: self.affinity,
        };
        let name: Arc<str> = Arc::from(input.name());
        build_tree(input, self.connectivity.as_ref(), self.linkage, self.hint())
            .map_err(|error| wrap_linkage_error(&name, error))
    }

    #[instrument(
        name = "core.fit",
        err,
        skip(self, input),
        fields(
            data_source = %input.name(),
            items = input.n_leaves(),
            n_clusters = %self.n_clusters,
            linkage = %self.linkage,
        ),
    )]
    fn run(&self, input: TreeInput<'_>) -> Result<ClusteringResult> {
        let name: Arc<str> = Arc::from(input.name());
        let tree = build_tree(input, self.connectivity.as_ref(), self.linkage, self.hint())
            .map_err(|error| wrap_linkage_error(&name, error))?;
        let labels = tree
            .cut(self.n_clusters.get())
            .map_err(|error| wrap_linkage_error(&name, error))?;

        let assignments = labels.into_iter().map(ClusterId::new).collect();
        let result = ClusteringResult::try_from_assignments(assignments).map_err(|_| {
            wrap_linkage_error(
                &name,
                LinkageError::InvariantViolation {
                    invariant: "tree cut produced non-contiguous labels",
                    cluster: self.n_clusters.get(),
                    neighbour: tree.n_leaves(),
                },
            )
        })?;
        info!(clusters = result.cluster_count(), "clustering completed");
        Ok(result)
    }

    fn hint(&self) -> Option<NonZeroUsize> {
        if self.compute_full_tree {
            None
        } else {
            Some(self.n_clusters)
        }
    }
}

fn wrap_linkage_error(name: &Arc<str>, error: LinkageError) -> AgglomerativeError {
    AgglomerativeError::Linkage {
        data_source: Arc::clone(name),
        error,
    }
}
