//! Spatial weights.
//!
//! A [`SpatialWeights`] object stores, for each observation, the indices and
//! weights of its neighbours. The representation stays sparse: the spatial
//! lag `Wy` is computed from the adjacency lists, and a dense matrix is only
//! materialized on demand for the maximum likelihood estimators and the
//! residual diagnostics.

mod builders;

pub use builders::Contiguity;

use faer::{Col, Mat};
use thiserror::Error;

/// Errors from constructing or applying spatial weights.
#[derive(Debug, Error)]
pub enum WeightsError {
    #[error("neighbor index {index} out of range for {n} observations")]
    IndexOutOfRange { index: usize, n: usize },

    #[error("observation {0} lists itself as a neighbor")]
    SelfNeighbor(usize),

    #[error("neighbor and weight lists differ in shape at observation {0}")]
    ShapeMismatch(usize),

    #[error("weights are of order {order} but the data has {data} observations")]
    OrderMismatch { order: usize, data: usize },

    #[error("k must satisfy 1 <= k < n, got k={k} for n={n}")]
    InvalidK { k: usize, n: usize },

    #[error("lattice dimensions must be positive, got {rows}x{cols}")]
    EmptyLattice { rows: usize, cols: usize },
}

/// Row-oriented spatial weights.
#[derive(Debug, Clone)]
pub struct SpatialWeights {
    neighbors: Vec<Vec<usize>>,
    weights: Vec<Vec<f64>>,
    row_standardized: bool,
}

impl SpatialWeights {
    /// Binary weights from adjacency lists.
    pub fn from_neighbors(neighbors: Vec<Vec<usize>>) -> Result<Self, WeightsError> {
        let weights = neighbors.iter().map(|ns| vec![1.0; ns.len()]).collect();
        Self::from_neighbor_weights(neighbors, weights)
    }

    /// Weights from adjacency lists with explicit values.
    pub fn from_neighbor_weights(
        neighbors: Vec<Vec<usize>>,
        weights: Vec<Vec<f64>>,
    ) -> Result<Self, WeightsError> {
        let n = neighbors.len();
        if weights.len() != n {
            return Err(WeightsError::ShapeMismatch(0));
        }
        for (i, (ns, ws)) in neighbors.iter().zip(weights.iter()).enumerate() {
            if ns.len() != ws.len() {
                return Err(WeightsError::ShapeMismatch(i));
            }
            for &j in ns {
                if j >= n {
                    return Err(WeightsError::IndexOutOfRange { index: j, n });
                }
                if j == i {
                    return Err(WeightsError::SelfNeighbor(i));
                }
            }
        }
        Ok(Self {
            neighbors,
            weights,
            row_standardized: false,
        })
    }

    /// Number of observations.
    pub fn n(&self) -> usize {
        self.neighbors.len()
    }

    /// Neighbour indices of observation `i`.
    pub fn neighbors_of(&self, i: usize) -> &[usize] {
        &self.neighbors[i]
    }

    /// Weights of observation `i`'s neighbours.
    pub fn weights_of(&self, i: usize) -> &[f64] {
        &self.weights[i]
    }

    /// Neighbour counts per observation.
    pub fn cardinalities(&self) -> Vec<usize> {
        self.neighbors.iter().map(|ns| ns.len()).collect()
    }

    /// Observations with no neighbours.
    pub fn islands(&self) -> Vec<usize> {
        self.neighbors
            .iter()
            .enumerate()
            .filter(|(_, ns)| ns.is_empty())
            .map(|(i, _)| i)
            .collect()
    }

    /// Scale each row to sum to one. Islands stay zero.
    pub fn row_standardize(&mut self) {
        for ws in &mut self.weights {
            let sum: f64 = ws.iter().sum();
            if sum > 0.0 {
                for w in ws.iter_mut() {
                    *w /= sum;
                }
            }
        }
        self.row_standardized = true;
    }

    /// Whether `row_standardize` has been applied.
    pub fn is_row_standardized(&self) -> bool {
        self.row_standardized
    }

    /// Spatial lag `Wy`.
    pub fn lag(&self, y: &Col<f64>) -> Result<Col<f64>, WeightsError> {
        let n = self.n();
        if y.nrows() != n {
            return Err(WeightsError::OrderMismatch {
                order: n,
                data: y.nrows(),
            });
        }
        let mut lagged = Col::zeros(n);
        for i in 0..n {
            let mut sum = 0.0;
            for (&j, &w) in self.neighbors[i].iter().zip(self.weights[i].iter()) {
                sum += w * y[j];
            }
            lagged[i] = sum;
        }
        Ok(lagged)
    }

    /// Column-wise spatial lag `WX`.
    pub fn lag_matrix(&self, x: &Mat<f64>) -> Result<Mat<f64>, WeightsError> {
        let n = self.n();
        if x.nrows() != n {
            return Err(WeightsError::OrderMismatch {
                order: n,
                data: x.nrows(),
            });
        }
        let p = x.ncols();
        let mut lagged = Mat::zeros(n, p);
        for i in 0..n {
            for (&j, &w) in self.neighbors[i].iter().zip(self.weights[i].iter()) {
                for c in 0..p {
                    lagged[(i, c)] += w * x[(j, c)];
                }
            }
        }
        Ok(lagged)
    }

    /// Dense n x n weight matrix.
    pub fn full(&self) -> Mat<f64> {
        let n = self.n();
        let mut w = Mat::zeros(n, n);
        for i in 0..n {
            for (&j, &wij) in self.neighbors[i].iter().zip(self.weights[i].iter()) {
                w[(i, j)] = wij;
            }
        }
        w
    }

    /// Sum of all weights: s0 = sum_ij w_ij.
    pub fn s0(&self) -> f64 {
        self.weights.iter().flatten().sum()
    }

    /// s1 = 1/2 sum_ij (w_ij + w_ji)².
    pub fn s1(&self) -> f64 {
        let w = self.full();
        let n = self.n();
        let mut s1 = 0.0;
        for i in 0..n {
            for j in 0..n {
                s1 += (w[(i, j)] + w[(j, i)]).powi(2);
            }
        }
        s1 / 2.0
    }

    /// s2 = sum_i (row_sum_i + col_sum_i)².
    pub fn s2(&self) -> f64 {
        let w = self.full();
        let n = self.n();
        let mut s2 = 0.0;
        for i in 0..n {
            let mut row_sum = 0.0;
            let mut col_sum = 0.0;
            for j in 0..n {
                row_sum += w[(i, j)];
                col_sum += w[(j, i)];
            }
            s2 += (row_sum + col_sum).powi(2);
        }
        s2
    }
}
