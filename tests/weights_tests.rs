//! Integration tests for spatial weights construction and operations.

mod common;

use approx::assert_relative_eq;
use faer::Col;
use spatialstats::prelude::*;

#[test]
fn test_lattice_rook_cardinalities() {
    let w = SpatialWeights::lattice(3, 3, Contiguity::Rook).expect("lattice");

    assert_eq!(w.n(), 9);
    // Corner, edge, interior
    assert_eq!(w.neighbors_of(0).len(), 2);
    assert_eq!(w.neighbors_of(1).len(), 3);
    assert_eq!(w.neighbors_of(4).len(), 4);
    assert!(w.islands().is_empty());
}

#[test]
fn test_lattice_queen_adds_diagonals() {
    let rook = SpatialWeights::lattice(3, 3, Contiguity::Rook).expect("lattice");
    let queen = SpatialWeights::lattice(3, 3, Contiguity::Queen).expect("lattice");

    // Center cell gains the four diagonal neighbors
    assert_eq!(rook.neighbors_of(4).len(), 4);
    assert_eq!(queen.neighbors_of(4).len(), 8);
}

#[test]
fn test_row_standardization() {
    let mut w = SpatialWeights::lattice(4, 4, Contiguity::Rook).expect("lattice");
    assert!(!w.is_row_standardized());
    w.row_standardize();
    assert!(w.is_row_standardized());

    for i in 0..w.n() {
        let row_sum: f64 = w.weights_of(i).iter().sum();
        assert_relative_eq!(row_sum, 1.0, epsilon = 1e-12);
    }
    // s0 equals n after row standardization
    assert_relative_eq!(w.s0(), 16.0, epsilon = 1e-12);
}

#[test]
fn test_spatial_lag_averages_neighbors() {
    let mut w = SpatialWeights::lattice(3, 3, Contiguity::Rook).expect("lattice");
    w.row_standardize();

    let y = Col::from_fn(9, |i| i as f64);
    let wy = w.lag(&y).expect("lag");

    // Center cell 4 has neighbors 1, 3, 5, 7 with mean 4
    assert_relative_eq!(wy[4], 4.0, epsilon = 1e-12);
    // Corner cell 0 has neighbors 1 and 3 with mean 2
    assert_relative_eq!(wy[0], 2.0, epsilon = 1e-12);
}

#[test]
fn test_lag_rejects_wrong_length() {
    let w = SpatialWeights::lattice(3, 3, Contiguity::Rook).expect("lattice");
    let y = Col::from_fn(5, |i| i as f64);
    assert!(matches!(
        w.lag(&y),
        Err(WeightsError::OrderMismatch { .. })
    ));
}

#[test]
fn test_knn_weights() {
    let points = [
        (0.0, 0.0),
        (1.0, 0.0),
        (2.0, 0.0),
        (10.0, 0.0),
        (11.0, 0.0),
        (12.0, 0.0),
    ];
    let w = SpatialWeights::knn(&points, 2).expect("knn");

    assert_eq!(w.n(), 6);
    // Nearest two to point 0 are points 1 and 2
    let mut n0 = w.neighbors_of(0).to_vec();
    n0.sort_unstable();
    assert_eq!(n0, vec![1, 2]);
    // Nearest two to point 3 are points 4 and 5, not the far cluster
    let mut n3 = w.neighbors_of(3).to_vec();
    n3.sort_unstable();
    assert_eq!(n3, vec![4, 5]);
}

#[test]
fn test_knn_invalid_k() {
    let points = [(0.0, 0.0), (1.0, 0.0)];
    assert!(matches!(
        SpatialWeights::knn(&points, 2),
        Err(WeightsError::InvalidK { .. })
    ));
}

#[test]
fn test_from_neighbors_rejects_self_neighbor() {
    let neighbors = vec![vec![0], vec![0]];
    assert!(matches!(
        SpatialWeights::from_neighbors(neighbors),
        Err(WeightsError::SelfNeighbor(_))
    ));
}

#[test]
fn test_full_matrix_symmetry_binary() {
    let w = SpatialWeights::lattice(4, 4, Contiguity::Queen).expect("lattice");
    let dense = w.full();

    for i in 0..16 {
        for j in 0..16 {
            assert_relative_eq!(dense[(i, j)], dense[(j, i)], epsilon = 1e-12);
        }
    }
}
