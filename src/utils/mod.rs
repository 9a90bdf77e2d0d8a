//! Shared matrix and order-statistics helpers.

mod matrix;
mod stats;

pub use matrix::{
    all_finite_col, all_finite_mat, build_design_matrix, detect_constant_columns,
    log_abs_determinant, matrix_inverse_qr, solve_least_squares, symmetric_eigenvalues, trace,
};
pub use stats::{
    abs_deviation_about_median, mean, median, median_sorted, quantile_sorted, std_dev,
};
