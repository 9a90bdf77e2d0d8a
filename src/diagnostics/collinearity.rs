//! Multicollinearity diagnostics for the design matrix.

use crate::utils::{
    build_design_matrix, detect_constant_columns, solve_least_squares, symmetric_eigenvalues,
};
use faer::{Col, Mat};

/// Multicollinearity condition index of the design matrix.
///
/// Columns (including the intercept) are scaled to unit length before
/// forming X'X; the index is the square root of the ratio of the extreme
/// eigenvalues. Values above 30 conventionally indicate strong
/// multicollinearity.
pub fn condition_index(x: &Mat<f64>, with_intercept: bool) -> f64 {
    let design = build_design_matrix(x, with_intercept);
    let n = design.nrows();
    let p = design.ncols();

    // Unit-length column scaling
    let mut norms = vec![0.0; p];
    for j in 0..p {
        let mut s = 0.0;
        for i in 0..n {
            s += design[(i, j)] * design[(i, j)];
        }
        norms[j] = s.sqrt();
    }
    let scaled = Mat::from_fn(n, p, |i, j| {
        if norms[j] > 0.0 {
            design[(i, j)] / norms[j]
        } else {
            0.0
        }
    });

    let xtx = scaled.transpose() * &scaled;
    let eigenvalues = symmetric_eigenvalues(&xtx, 50);

    let mut max_ev = f64::NEG_INFINITY;
    let mut min_ev = f64::INFINITY;
    for &ev in &eigenvalues {
        if ev > max_ev {
            max_ev = ev;
        }
        if ev < min_ev {
            min_ev = ev;
        }
    }
    if min_ev <= 0.0 {
        return f64::INFINITY;
    }
    (max_ev / min_ev).sqrt()
}

/// Variance inflation factors, one per explanatory variable.
///
/// Each VIF is 1/(1-R²) from the regression of that variable on the
/// others. A perfectly collinear column yields an infinite VIF.
pub fn variance_inflation_factors(x: &Mat<f64>, tolerance: f64) -> Vec<f64> {
    let n = x.nrows();
    let p = x.ncols();
    if p < 2 {
        return vec![1.0; p];
    }

    // A zero-variance column has no well-defined VIF
    let constant = detect_constant_columns(x, 1e-12);

    let mut vifs = Vec::with_capacity(p);
    for j in 0..p {
        if constant[j] {
            vifs.push(f64::NAN);
            continue;
        }
        let others = Mat::from_fn(n, p - 1, |i, c| {
            let src = if c < j { c } else { c + 1 };
            x[(i, src)]
        });
        let target = Col::from_fn(n, |i| x[(i, j)]);

        let design = build_design_matrix(&others, true);
        let (beta, _, _) = solve_least_squares(&design, &target, tolerance);

        let mean = target.iter().sum::<f64>() / n as f64;
        let mut rss = 0.0;
        let mut tss = 0.0;
        for i in 0..n {
            let mut pred = 0.0;
            for c in 0..design.ncols() {
                let b = beta[c];
                if !b.is_nan() {
                    pred += design[(i, c)] * b;
                }
            }
            rss += (target[i] - pred).powi(2);
            tss += (target[i] - mean).powi(2);
        }

        if tss <= 0.0 {
            vifs.push(f64::NAN);
        } else {
            let r2 = 1.0 - rss / tss;
            if r2 >= 1.0 {
                vifs.push(f64::INFINITY);
            } else {
                vifs.push(1.0 / (1.0 - r2));
            }
        }
    }
    vifs
}
