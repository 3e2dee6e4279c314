//! Ward sufficient statistics.
//!
//! Per-node member counts and feature sums, accumulated in `f64` so large
//! merges do not lose precision. The Ward merge cost for a candidate pair is
//! computed from the stored sums in O(dimension) without materialising
//! centroid vectors.

/// Member counts and feature sums for every node in the merge tree.
#[derive(Clone, Debug)]
pub(crate) struct WardMoments {
    dimension: usize,
    counts: Vec<f64>,
    // Flattened n_nodes x dimension feature sums.
    sums: Vec<f64>,
}

impl WardMoments {
    /// Allocates moments for `n_nodes` slots and seeds the first `n_leaves`
    /// rows from the sample matrix.
    pub(crate) fn from_samples(data: &[f64], n_leaves: usize, dimension: usize) -> Self {
        let n_nodes = 2 * n_leaves - 1;
        let mut counts = vec![0.0; n_nodes];
        let mut sums = vec![0.0; n_nodes * dimension];
        for leaf in 0..n_leaves {
            counts[leaf] = 1.0;
            let row = &data[leaf * dimension..(leaf + 1) * dimension];
            sums[leaf * dimension..(leaf + 1) * dimension].copy_from_slice(row);
        }
        Self {
            dimension,
            counts,
            sums,
        }
    }

    /// Ward merge cost for the pair `(x, y)`:
    /// `||S_x/n_x - S_y/n_y||^2 * n_x * n_y / (n_x + n_y)`.
    pub(crate) fn cost(&self, x: usize, y: usize) -> f64 {
        let n_x = self.counts[x];
        let n_y = self.counts[y];
        let row_x = &self.sums[x * self.dimension..(x + 1) * self.dimension];
        let row_y = &self.sums[y * self.dimension..(y + 1) * self.dimension];
        let mut squared = 0.0f64;
        for (&sx, &sy) in row_x.iter().zip(row_y.iter()) {
            let diff = sx / n_x - sy / n_y;
            squared += diff * diff;
        }
        squared * n_x * n_y / (n_x + n_y)
    }

    /// Records the merge of `x` and `y` into `z`:
    /// `n_z = n_x + n_y`, `S_z = S_x + S_y`.
    pub(crate) fn merge(&mut self, x: usize, y: usize, z: usize) {
        self.counts[z] = self.counts[x] + self.counts[y];
        for dim in 0..self.dimension {
            self.sums[z * self.dimension + dim] =
                self.sums[x * self.dimension + dim] + self.sums[y * self.dimension + dim];
        }
    }
}
