//! Distance primitives for built-in numeric metrics.
//!
//! Scalar implementations for the Euclidean, Manhattan, and cosine metrics.
//! These routines validate their inputs and surface detailed errors so
//! callers can react appropriately before tree construction begins.

mod cosine;
mod euclidean;
mod helpers;
mod manhattan;
mod types;

use core::fmt;

pub use self::cosine::cosine_distance;
pub use self::euclidean::{euclidean_distance, squared_euclidean_distance};
pub use self::manhattan::manhattan_distance;
pub use self::types::{DistanceError, Result, Vector, VectorKind};

/// Pairwise affinity used to derive merge costs from raw features.
///
/// `Precomputed` signals that the caller supplies a ready-made symmetric
/// distance matrix instead of feature vectors.
///
/// # Examples
/// ```
/// use akami_core::Affinity;
///
/// assert!(Affinity::Euclidean.is_euclidean());
/// assert!(Affinity::Precomputed.kernel().is_none());
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Affinity {
    /// Euclidean (L2) distance.
    Euclidean,
    /// Manhattan (L1) distance.
    Manhattan,
    /// Cosine distance.
    Cosine,
    /// Distances supplied by the caller as a precomputed matrix.
    Precomputed,
}

impl Affinity {
    /// Returns whether this affinity is the Euclidean metric.
    #[must_use]
    pub const fn is_euclidean(self) -> bool {
        matches!(self, Self::Euclidean)
    }

    /// Returns the scalar kernel for this affinity, or `None` for
    /// [`Affinity::Precomputed`].
    #[must_use]
    pub fn kernel(self) -> Option<fn(&[f64], &[f64]) -> Result<f64>> {
        match self {
            Self::Euclidean => Some(euclidean_distance),
            Self::Manhattan => Some(manhattan_distance),
            Self::Cosine => Some(cosine_distance),
            Self::Precomputed => None,
        }
    }
}

impl fmt::Display for Affinity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Euclidean => f.write_str("euclidean"),
            Self::Manhattan => f.write_str("manhattan"),
            Self::Cosine => f.write_str("cosine"),
            Self::Precomputed => f.write_str("precomputed"),
        }
    }
}
