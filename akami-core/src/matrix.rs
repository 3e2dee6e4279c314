//! Dense matrix inputs for tree construction.
//!
//! [`FeatureMatrix`] holds raw samples in a contiguous row-major buffer;
//! [`DistanceMatrix`] holds a caller-supplied symmetric pairwise distance
//! matrix for the precomputed affinity path.

use thiserror::Error;

/// Errors raised while constructing matrix inputs.
#[derive(Clone, Debug, Error, PartialEq)]
#[non_exhaustive]
pub enum MatrixError {
    /// The supplied buffer length did not match `rows * dimension`.
    #[error("buffer has {len} values but {rows} rows of dimension {dimension} need {expected}")]
    BufferLengthMismatch {
        /// Length of the supplied buffer.
        len: usize,
        /// Declared number of rows.
        rows: usize,
        /// Declared row dimensionality.
        dimension: usize,
        /// Required buffer length.
        expected: usize,
    },
    /// Rows must have positive dimension.
    #[error("matrix rows must have positive dimension")]
    ZeroDimension,
    /// A distance matrix must be square.
    #[error("distance matrix is {rows}x{cols}, expected a square matrix")]
    NotSquare {
        /// Declared number of rows.
        rows: usize,
        /// Number of columns implied by the buffer.
        cols: usize,
    },
    /// A requested row was outside the matrix bounds.
    #[error("row {index} is out of bounds for {rows} rows")]
    RowOutOfBounds {
        /// The requested row.
        index: usize,
        /// The number of rows available.
        rows: usize,
    },
}

/// Row-major matrix of raw feature vectors (samples by features).
///
/// # Examples
/// ```
/// use akami_core::FeatureMatrix;
///
/// let matrix = FeatureMatrix::from_rows("toy", vec![1.0, 2.0, 3.0, 4.0], 2)?;
/// assert_eq!(matrix.rows(), 2);
/// assert_eq!(matrix.dimension(), 2);
/// assert_eq!(matrix.row(1)?, &[3.0, 4.0]);
/// # Ok::<(), akami_core::MatrixError>(())
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct FeatureMatrix {
    name: String,
    rows: usize,
    dimension: usize,
    values: Vec<f64>,
}

impl FeatureMatrix {
    /// Creates a matrix from a contiguous row-major buffer.
    ///
    /// # Errors
    /// Returns [`MatrixError::ZeroDimension`] when `dimension` is zero and
    /// [`MatrixError::BufferLengthMismatch`] when the buffer does not divide
    /// evenly into rows of that dimension.
    pub fn from_rows(
        name: impl Into<String>,
        values: Vec<f64>,
        dimension: usize,
    ) -> Result<Self, MatrixError> {
        if dimension == 0 {
            return Err(MatrixError::ZeroDimension);
        }
        if values.len() % dimension != 0 {
            return Err(MatrixError::BufferLengthMismatch {
                len: values.len(),
                rows: values.len() / dimension,
                dimension,
                expected: (values.len() / dimension + 1) * dimension,
            });
        }
        let rows = values.len() / dimension;
        Ok(Self {
            name: name.into(),
            rows,
            dimension,
            values,
        })
    }

    /// Returns a human-readable name for diagnostics.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the number of samples.
    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Returns the dimensionality of each row.
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Returns the underlying row-major buffer.
    #[must_use]
    pub fn data(&self) -> &[f64] {
        &self.values
    }

    /// Returns one sample as a slice.
    ///
    /// # Errors
    /// Returns [`MatrixError::RowOutOfBounds`] when `index >= rows`.
    pub fn row(&self, index: usize) -> Result<&[f64], MatrixError> {
        if index >= self.rows {
            return Err(MatrixError::RowOutOfBounds {
                index,
                rows: self.rows,
            });
        }
        let start = index * self.dimension;
        Ok(&self.values[start..start + self.dimension])
    }
}

/// Symmetric precomputed pairwise distance matrix.
///
/// Only the values are stored; symmetry is the caller's contract and the
/// builder reads the upper triangle.
///
/// # Examples
/// ```
/// use akami_core::DistanceMatrix;
///
/// let matrix = DistanceMatrix::from_rows("toy", vec![
///     0.0, 1.0,
///     1.0, 0.0,
/// ])?;
/// assert_eq!(matrix.len(), 2);
/// assert_eq!(matrix.get(0, 1)?, 1.0);
/// # Ok::<(), akami_core::MatrixError>(())
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct DistanceMatrix {
    name: String,
    len: usize,
    values: Vec<f64>,
}

impl DistanceMatrix {
    /// Creates a distance matrix from a contiguous row-major square buffer.
    ///
    /// # Errors
    /// Returns [`MatrixError::NotSquare`] when the buffer length is not a
    /// perfect square.
    pub fn from_rows(name: impl Into<String>, values: Vec<f64>) -> Result<Self, MatrixError> {
        let len = values.len().isqrt();
        if len * len != values.len() {
            return Err(MatrixError::NotSquare {
                rows: len,
                cols: len + 1,
            });
        }
        Ok(Self {
            name: name.into(),
            len,
            values,
        })
    }

    /// Returns a human-readable name for diagnostics.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the number of samples the matrix covers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns whether the matrix covers no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the stored distance between two samples.
    ///
    /// # Errors
    /// Returns [`MatrixError::RowOutOfBounds`] when either index is outside
    /// the matrix.
    pub fn get(&self, i: usize, j: usize) -> Result<f64, MatrixError> {
        for index in [i, j] {
            if index >= self.len {
                return Err(MatrixError::RowOutOfBounds {
                    index,
                    rows: self.len,
                });
            }
        }
        Ok(self.values[i * self.len + j])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feature_matrix_rejects_ragged_buffer() {
        let err = FeatureMatrix::from_rows("bad", vec![1.0, 2.0, 3.0], 2)
            .expect_err("ragged buffer must be rejected");
        assert!(matches!(err, MatrixError::BufferLengthMismatch { .. }));
    }

    #[test]
    fn feature_matrix_rejects_zero_dimension() {
        let err = FeatureMatrix::from_rows("bad", vec![], 0)
            .expect_err("zero dimension must be rejected");
        assert_eq!(err, MatrixError::ZeroDimension);
    }

    #[test]
    fn distance_matrix_rejects_non_square_buffer() {
        let err = DistanceMatrix::from_rows("bad", vec![0.0, 1.0, 1.0])
            .expect_err("non-square buffer must be rejected");
        assert!(matches!(err, MatrixError::NotSquare { .. }));
    }

    #[test]
    fn row_access_is_bounds_checked() {
        let matrix =
            FeatureMatrix::from_rows("toy", vec![1.0, 2.0], 1).expect("valid matrix");
        let err = matrix.row(2).expect_err("row must be bounds checked");
        assert_eq!(err, MatrixError::RowOutOfBounds { index: 2, rows: 2 });
    }
}
