//! Matrix helpers shared by solvers and diagnostics.

use faer::{Col, Mat};

/// Build a design matrix, optionally prepending a column of ones.
pub fn build_design_matrix(x: &Mat<f64>, with_intercept: bool) -> Mat<f64> {
    let n = x.nrows();
    let p = x.ncols();
    if with_intercept {
        Mat::from_fn(n, p + 1, |i, j| if j == 0 { 1.0 } else { x[(i, j - 1)] })
    } else {
        x.to_owned()
    }
}

/// Detect columns with zero variance.
pub fn detect_constant_columns(x: &Mat<f64>, tolerance: f64) -> Vec<bool> {
    let n_rows = x.nrows();
    let n_cols = x.ncols();
    if n_rows == 0 {
        return vec![true; n_cols];
    }
    let mut constant = vec![false; n_cols];
    for j in 0..n_cols {
        let first = x[(0, j)];
        constant[j] = (1..n_rows).all(|i| (x[(i, j)] - first).abs() < tolerance);
    }
    constant
}

/// Check that every entry of a matrix is finite.
pub fn all_finite_mat(x: &Mat<f64>) -> bool {
    for j in 0..x.ncols() {
        for i in 0..x.nrows() {
            if !x[(i, j)].is_finite() {
                return false;
            }
        }
    }
    true
}

/// Check that every entry of a column is finite.
pub fn all_finite_col(y: &Col<f64>) -> bool {
    y.iter().all(|v| v.is_finite())
}

/// Least-squares solution via column-pivoted QR.
///
/// Rank-deficient designs are handled by pivoting: coefficients of columns
/// beyond the numerical rank are set to NaN and flagged as aliased.
pub fn solve_least_squares(
    design: &Mat<f64>,
    y: &Col<f64>,
    rank_tolerance: f64,
) -> (Col<f64>, Vec<bool>, usize) {
    let n = design.nrows();
    let p = design.ncols();

    let qr = design.col_piv_qr();
    let q = qr.compute_Q();
    let r = qr.R();
    let perm = qr.P();

    // perm_inv[j] = position original column j was pivoted to
    let perm_arr = perm.arrays().0;
    let mut perm_inv: Vec<usize> = vec![0; p];
    perm_inv[..p].copy_from_slice(&perm_arr[..p]);

    // Numerical rank from the R diagonal
    let mut rank = 0;
    for i in 0..p.min(n) {
        if r[(i, i)].abs() > rank_tolerance {
            rank += 1;
        } else {
            break;
        }
    }

    let mut aliased = vec![false; p];
    let mut coefficients = Col::zeros(p);

    if rank == 0 {
        for j in 0..p {
            coefficients[j] = f64::NAN;
            aliased[j] = true;
        }
        return (coefficients, aliased, 0);
    }

    for j in 0..p {
        if perm_inv[j] >= rank {
            aliased[j] = true;
        }
    }

    // Back-substitute R * beta = Q' * y over the non-aliased block
    let qty = q.transpose() * y;
    let mut beta_reduced = Col::zeros(rank);
    for i in (0..rank).rev() {
        let mut sum = qty[i];
        for j in (i + 1)..rank {
            sum -= r[(i, j)] * beta_reduced[j];
        }
        beta_reduced[i] = sum / r[(i, i)];
    }

    for j in 0..p {
        if aliased[j] {
            coefficients[j] = f64::NAN;
        } else {
            coefficients[j] = beta_reduced[perm_inv[j]];
        }
    }

    (coefficients, aliased, rank)
}

/// General square-matrix inverse using QR with back-substitution.
///
/// Returns an error when any diagonal of R falls below tolerance.
pub fn matrix_inverse_qr(matrix: &Mat<f64>) -> Result<Mat<f64>, &'static str> {
    let n = matrix.nrows();
    if n != matrix.ncols() {
        return Err("matrix is not square");
    }

    let qr = matrix.qr();
    let q = qr.compute_Q();
    let r = qr.R();

    for i in 0..n {
        if r[(i, i)].abs() < 1e-12 {
            return Err("matrix is singular");
        }
    }

    // Solve R * X = Q' column by column
    let qt = q.transpose().to_owned();
    let mut inv = Mat::zeros(n, n);
    for col in 0..n {
        for i in (0..n).rev() {
            let mut sum = qt[(i, col)];
            for j in (i + 1)..n {
                sum -= r[(i, j)] * inv[(j, col)];
            }
            inv[(i, col)] = sum / r[(i, i)];
        }
    }

    Ok(inv)
}

/// log|det(A)| via QR: |det(A)| equals the product of the |r_ii|.
///
/// Returns None when the matrix is numerically singular.
pub fn log_abs_determinant(matrix: &Mat<f64>) -> Option<f64> {
    let n = matrix.nrows();
    let qr = matrix.qr();
    let r = qr.R();
    let mut log_det = 0.0;
    for i in 0..n {
        let d = r[(i, i)].abs();
        if d < 1e-300 {
            return None;
        }
        log_det += d.ln();
    }
    Some(log_det)
}

/// Trace of a square matrix.
pub fn trace(matrix: &Mat<f64>) -> f64 {
    (0..matrix.nrows().min(matrix.ncols()))
        .map(|i| matrix[(i, i)])
        .sum()
}

/// Eigenvalues of a symmetric matrix by cyclic Jacobi rotations.
///
/// Intended for the small p x p cross-product matrices that show up in
/// collinearity diagnostics.
pub fn symmetric_eigenvalues(matrix: &Mat<f64>, sweeps: usize) -> Vec<f64> {
    let n = matrix.nrows();
    let mut a = matrix.to_owned();

    for _ in 0..sweeps {
        let mut off_diagonal = 0.0;
        for p in 0..n {
            for q in (p + 1)..n {
                off_diagonal += a[(p, q)].abs();
            }
        }
        if off_diagonal < 1e-14 {
            break;
        }
        for p in 0..n {
            for q in (p + 1)..n {
                if a[(p, q)].abs() < 1e-300 {
                    continue;
                }
                let theta = (a[(q, q)] - a[(p, p)]) / (2.0 * a[(p, q)]);
                let t = if theta >= 0.0 {
                    1.0 / (theta + (1.0 + theta * theta).sqrt())
                } else {
                    -1.0 / (-theta + (1.0 + theta * theta).sqrt())
                };
                let c = 1.0 / (1.0 + t * t).sqrt();
                let s = t * c;
                for k in 0..n {
                    let akp = a[(k, p)];
                    let akq = a[(k, q)];
                    a[(k, p)] = c * akp - s * akq;
                    a[(k, q)] = s * akp + c * akq;
                }
                for k in 0..n {
                    let apk = a[(p, k)];
                    let aqk = a[(q, k)];
                    a[(p, k)] = c * apk - s * aqk;
                    a[(q, k)] = s * apk + c * aqk;
                }
            }
        }
    }

    (0..n).map(|i| a[(i, i)]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_design_matrix() {
        let x = Mat::from_fn(3, 2, |i, j| (i * 2 + j) as f64);
        let d = build_design_matrix(&x, true);
        assert_eq!(d.ncols(), 3);
        for i in 0..3 {
            assert_eq!(d[(i, 0)], 1.0);
            assert_eq!(d[(i, 1)], x[(i, 0)]);
            assert_eq!(d[(i, 2)], x[(i, 1)]);
        }
    }

    #[test]
    fn test_solve_least_squares_exact() {
        // y = 1 + 2*x
        let design = Mat::from_fn(5, 2, |i, j| if j == 0 { 1.0 } else { i as f64 });
        let y = Col::from_fn(5, |i| 1.0 + 2.0 * i as f64);

        let (beta, aliased, rank) = solve_least_squares(&design, &y, 1e-10);
        assert_eq!(rank, 2);
        assert!(!aliased[0] && !aliased[1]);
        assert!((beta[0] - 1.0).abs() < 1e-10);
        assert!((beta[1] - 2.0).abs() < 1e-10);
    }

    #[test]
    fn test_solve_least_squares_collinear() {
        // Third column is twice the second
        let design = Mat::from_fn(6, 3, |i, j| match j {
            0 => 1.0,
            1 => i as f64,
            _ => 2.0 * i as f64,
        });
        let y = Col::from_fn(6, |i| 1.0 + 3.0 * i as f64);

        let (beta, aliased, rank) = solve_least_squares(&design, &y, 1e-10);
        assert_eq!(rank, 2);
        assert_eq!(aliased.iter().filter(|&&a| a).count(), 1);
        assert_eq!(beta.iter().filter(|v| v.is_nan()).count(), 1);
    }

    #[test]
    fn test_matrix_inverse_qr() {
        let mut m = Mat::zeros(2, 2);
        m[(0, 0)] = 4.0;
        m[(0, 1)] = 7.0;
        m[(1, 0)] = 2.0;
        m[(1, 1)] = 6.0;

        let inv = matrix_inverse_qr(&m).expect("invertible");
        // det = 10; inverse = [0.6, -0.7; -0.2, 0.4]
        assert!((inv[(0, 0)] - 0.6).abs() < 1e-10);
        assert!((inv[(0, 1)] + 0.7).abs() < 1e-10);
        assert!((inv[(1, 0)] + 0.2).abs() < 1e-10);
        assert!((inv[(1, 1)] - 0.4).abs() < 1e-10);
    }

    #[test]
    fn test_log_abs_determinant() {
        let mut m = Mat::zeros(2, 2);
        m[(0, 0)] = 3.0;
        m[(1, 1)] = 5.0;
        let ld = log_abs_determinant(&m).expect("non-singular");
        assert!((ld - 15.0_f64.ln()).abs() < 1e-10);
    }

    #[test]
    fn test_symmetric_eigenvalues() {
        // Eigenvalues of [[2, 1], [1, 2]] are 1 and 3
        let mut m = Mat::zeros(2, 2);
        m[(0, 0)] = 2.0;
        m[(0, 1)] = 1.0;
        m[(1, 0)] = 1.0;
        m[(1, 1)] = 2.0;

        let mut ev = symmetric_eigenvalues(&m, 30);
        ev.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert!((ev[0] - 1.0).abs() < 1e-8);
        assert!((ev[1] - 3.0).abs() < 1e-8);
    }
}
