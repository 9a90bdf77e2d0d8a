//! Common test utilities and data generators.

#![allow(dead_code)]

use faer::{Col, Mat};
use spatialstats::{Contiguity, SpatialWeights};

/// Deterministic pseudo-random stream in [-1, 1).
pub fn next_rand(state: &mut u64) -> f64 {
    *state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
    ((*state >> 33) as f64) / (u32::MAX as f64) * 2.0 - 1.0
}

/// Generate simple linear data: y = x * beta + intercept + noise
pub fn generate_linear_data(
    n_samples: usize,
    n_features: usize,
    intercept: f64,
    noise_std: f64,
    seed: u64,
) -> (Mat<f64>, Col<f64>, Col<f64>) {
    let mut rng_state = seed;

    let mut x = Mat::zeros(n_samples, n_features);
    let mut y = Col::zeros(n_samples);
    let mut true_coefficients = Col::zeros(n_features);

    for j in 0..n_features {
        true_coefficients[j] = (j + 1) as f64;
    }

    for i in 0..n_samples {
        let mut yi = intercept;
        for j in 0..n_features {
            x[(i, j)] = next_rand(&mut rng_state);
            yi += x[(i, j)] * true_coefficients[j];
        }
        yi += noise_std * next_rand(&mut rng_state);
        y[i] = yi;
    }

    (x, y, true_coefficients)
}

/// A row-standardized rook lattice with side*side observations.
pub fn lattice_weights(side: usize) -> SpatialWeights {
    let mut w = SpatialWeights::lattice(side, side, Contiguity::Rook).expect("lattice weights");
    w.row_standardize();
    w
}

/// Generate data with a spatial lag in the response:
/// y = (I - rho W)^{-1} (X beta + intercept + noise).
///
/// The reduced form is applied by fixed-point iteration, which converges
/// for |rho| < 1 with row-standardized weights.
pub fn generate_lag_data(
    side: usize,
    rho: f64,
    intercept: f64,
    noise_std: f64,
    seed: u64,
) -> (Mat<f64>, Col<f64>, SpatialWeights) {
    let w = lattice_weights(side);
    let n = side * side;
    let mut rng_state = seed;

    let mut x = Mat::zeros(n, 1);
    let mut signal = Col::zeros(n);
    for i in 0..n {
        x[(i, 0)] = next_rand(&mut rng_state) * 5.0;
        signal[i] = intercept + 2.0 * x[(i, 0)] + noise_std * next_rand(&mut rng_state);
    }

    let mut y = signal.clone();
    for _ in 0..200 {
        let wy = w.lag(&y).expect("lag");
        for i in 0..n {
            y[i] = signal[i] + rho * wy[i];
        }
    }

    (x, y, w)
}

/// Values with three well separated clusters, shuffled deterministically.
pub fn clustered_values(per_cluster: usize, seed: u64) -> Vec<f64> {
    let mut rng_state = seed;
    let centers = [0.0, 50.0, 200.0];
    let mut values = Vec::with_capacity(per_cluster * centers.len());
    for &center in &centers {
        for _ in 0..per_cluster {
            values.push(center + next_rand(&mut rng_state));
        }
    }
    // Deterministic shuffle
    let n = values.len();
    for i in (1..n).rev() {
        let j = (next_rand(&mut rng_state).abs() * (i + 1) as f64) as usize % (i + 1);
        values.swap(i, j);
    }
    values
}
