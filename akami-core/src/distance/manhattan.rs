use crate::distance::helpers::validate_dimensions;
use crate::distance::types::{Result, Vector, VectorKind};

/// Computes the Manhattan (city-block) distance between two vectors.
///
/// # Examples
///
/// ```
/// use akami_core::{DistanceError, manhattan_distance};
///
/// fn main() -> Result<(), DistanceError> {
///     let distance = manhattan_distance(&[1.0, 2.0], &[4.0, 6.0])?;
///     assert!((distance - 7.0).abs() < 1e-12);
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
pub fn manhattan_distance(left: &[f64], right: &[f64]) -> Result<f64> {
    let left = Vector::new(left, VectorKind::Left)?;
    let right = Vector::new(right, VectorKind::Right)?;
    validate_dimensions(&left, &right)?;

    let mut sum = 0.0f64;
    for (&l, &r) in left.iter().zip(right.iter()) {
        sum += (l - r).abs();
    }

    Ok(sum)
}
