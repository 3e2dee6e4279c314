//! Akami core library.
//!
//! Constrained hierarchical agglomerative clustering: Ward, complete,
//! average, and single linkage over raw feature matrices or precomputed
//! distance matrices, with optional connectivity constraints.
#![cfg_attr(docsrs, feature(doc_cfg))]

mod agglomerative;
mod builder;
mod distance;
mod error;
mod linkage;
mod matrix;
mod result;

pub use crate::{
    agglomerative::Agglomerative,
    builder::AgglomerativeBuilder,
    distance::{
        Affinity, DistanceError, Vector, VectorKind, cosine_distance, euclidean_distance,
        manhattan_distance, squared_euclidean_distance,
    },
    error::{AgglomerativeError, AgglomerativeErrorCode, Result},
    linkage::{
        Connectivity, KeyNotFound, Linkage, LinkageError, LinkageErrorCode, LinkageTree,
        NeighbourMap, TreeAdvisory, TreeInput, build_tree,
    },
    matrix::{DistanceMatrix, FeatureMatrix, MatrixError},
    result::{ClusterId, ClusteringResult, NonContiguousClusterIds},
};
