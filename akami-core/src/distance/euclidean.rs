use crate::distance::helpers::validate_dimensions;
use crate::distance::types::{Result, Vector, VectorKind};

/// Computes the Euclidean distance between two vectors.
///
/// # Examples
///
/// ```
/// use akami_core::{DistanceError, euclidean_distance};
///
/// fn main() -> Result<(), DistanceError> {
///     let distance = euclidean_distance(&[1.0, 2.0, 3.0], &[4.0, 6.0, 8.0])?;
///     assert!((distance - 7.071_067_811_865_475).abs() < 1e-12);
///     Ok(())
/// }
/// ```
///
/// # Errors
///
/// - [`DistanceError::ZeroLength`] when any input is empty.
/// - [`DistanceError::DimensionMismatch`] when input lengths differ.
/// - [`DistanceError::NonFinite`] when a value is NaN or infinite.
///
/// [`DistanceError::ZeroLength`]: crate::DistanceError::ZeroLength
/// [`DistanceError::DimensionMismatch`]: crate::DistanceError::DimensionMismatch
/// [`DistanceError::NonFinite`]: crate::DistanceError::NonFinite
pub fn euclidean_distance(left: &[f64], right: &[f64]) -> Result<f64> {
    Ok(squared_euclidean_distance(left, right)?.sqrt())
}

/// Computes the squared Euclidean distance between two vectors.
///
/// Ward merge costs are expressed in squared units, so the square root is
/// deferred to callers that need the metric itself.
///
/// # Errors
///
/// Same validation failures as [`euclidean_distance`].
pub fn squared_euclidean_distance(left: &[f64], right: &[f64]) -> Result<f64> {
    let left = Vector::new(left, VectorKind::Left)?;
    let right = Vector::new(right, VectorKind::Right)?;
    validate_dimensions(&left, &right)?;

    let mut sum = 0.0f64;
    for (&l, &r) in left.iter().zip(right.iter()) {
        let diff = l - r;
        sum += diff * diff;
    }

    Ok(sum)
}
