//! Builder utilities for configuring the agglomerative estimator.
//!
//! Exposes the clustering parameter surface and builder validation used
//! before constructing [`Agglomerative`] instances.

use std::num::NonZeroUsize;

use crate::{
    Result,
    agglomerative::Agglomerative,
    distance::Affinity,
    error::AgglomerativeError,
    linkage::{Connectivity, Linkage},
};

/// Configures and constructs [`Agglomerative`] instances.
///
/// # Examples
/// ```
/// use akami_core::{AgglomerativeBuilder, Linkage};
///
/// let estimator = AgglomerativeBuilder::new()
///     .with_n_clusters(3)
///     .with_linkage(Linkage::Average)
///     .build()
///     .expect("builder configuration is valid");
/// assert_eq!(estimator.n_clusters().get(), 3);
/// assert_eq!(estimator.linkage(), Linkage::Average);
/// ```
#[derive(Debug, Clone)]
pub struct AgglomerativeBuilder {
    n_clusters: usize,
    linkage: Linkage,
    affinity: Affinity,
    connectivity: Option<Connectivity>,
    compute_full_tree: bool,
}

impl Default for AgglomerativeBuilder {
    fn default() -> Self {
        Self {
            n_clusters: 2,
            linkage: Linkage::Ward,
            affinity: Affinity::Euclidean,
            connectivity: None,
            compute_full_tree: true,
        }
    }
}

impl AgglomerativeBuilder {
    /// Creates a builder populated with default parameters.
    ///
    /// # Examples
    /// ```
    /// use akami_core::{AgglomerativeBuilder, Linkage};
    ///
    /// let builder = AgglomerativeBuilder::new();
    /// assert_eq!(builder.n_clusters(), 2);
    /// assert_eq!(builder.linkage(), Linkage::Ward);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the number of flat clusters to extract.
    #[must_use]
    pub fn with_n_clusters(mut self, n_clusters: usize) -> Self {
        self.n_clusters = n_clusters;
        self
    }

    /// Returns the configured flat cluster count.
    #[must_use]
    pub fn n_clusters(&self) -> usize {
        self.n_clusters
    }

    /// Sets the linkage criterion.
    #[must_use]
    pub fn with_linkage(mut self, linkage: Linkage) -> Self {
        self.linkage = linkage;
        self
    }

    /// Returns the configured linkage criterion.
    #[must_use]
    pub fn linkage(&self) -> Linkage {
        self.linkage
    }

    /// Sets the pairwise affinity used for raw feature input.
    #[must_use]
    pub fn with_affinity(mut self, affinity: Affinity) -> Self {
        self.affinity = affinity;
        self
    }

    /// Returns the configured affinity.
    #[must_use]
    pub fn affinity(&self) -> Affinity {
        self.affinity
    }

    /// Constrains merges to the given connectivity graph.
    #[must_use]
    pub fn with_connectivity(mut self, connectivity: Connectivity) -> Self {
        self.connectivity = Some(connectivity);
        self
    }

    /// Controls whether the full tree is built even when only `n_clusters`
    /// flat clusters are needed. Disabling this stops construction early and
    /// yields a partial tree that supports no other cluster count.
    #[must_use]
    pub fn with_compute_full_tree(mut self, compute_full_tree: bool) -> Self {
        self.compute_full_tree = compute_full_tree;
        self
    }

    /// Returns whether the full tree will be built.
    #[must_use]
    pub fn compute_full_tree(&self) -> bool {
        self.compute_full_tree
    }

    /// Validates the configuration and constructs an [`Agglomerative`]
    /// instance.
    ///
    /// # Examples
    /// ```
    /// use akami_core::AgglomerativeBuilder;
    ///
    /// let estimator = AgglomerativeBuilder::new().build().expect("configuration is valid");
    /// assert_eq!(estimator.n_clusters().get(), 2);
    /// ```
    ///
    /// # Errors
    /// Returns [`AgglomerativeError::InvalidClusterTarget`] when `n_clusters`
    /// is zero.
    pub fn build(self) -> Result<Agglomerative> {
        let n_clusters = NonZeroUsize::new(self.n_clusters).ok_or(
            AgglomerativeError::InvalidClusterTarget {
                got: self.n_clusters,
            },
        )?;

        Ok(Agglomerative::new(
            n_clusters,
            self.linkage,
            self.affinity,
            self.connectivity,
            self.compute_full_tree,
        ))
    }
}
