//! Scalar search and correlation helpers for the likelihood estimators.

use super::traits::RegressionError;
use faer::Col;

const INV_PHI: f64 = 0.618_033_988_749_894_8;

/// Maximize a unimodal function over [lo, hi] by golden-section search.
///
/// Returns the abscissa and value of the maximum, or `ConvergenceFailed`
/// when the interval has not shrunk below `tolerance` within the iteration
/// cap.
pub(crate) fn golden_section_maximize<F>(
    f: F,
    lo: f64,
    hi: f64,
    tolerance: f64,
    max_iterations: usize,
) -> Result<(f64, f64), RegressionError>
where
    F: Fn(f64) -> f64,
{
    let mut a = lo;
    let mut b = hi;
    let mut c = b - INV_PHI * (b - a);
    let mut d = a + INV_PHI * (b - a);
    let mut fc = f(c);
    let mut fd = f(d);

    for _ in 0..max_iterations {
        if (b - a).abs() <= tolerance {
            let x = (a + b) / 2.0;
            return Ok((x, f(x)));
        }
        if fc > fd {
            b = d;
            d = c;
            fd = fc;
            c = b - INV_PHI * (b - a);
            fc = f(c);
        } else {
            a = c;
            c = d;
            fc = fd;
            d = a + INV_PHI * (b - a);
            fd = f(d);
        }
    }

    Err(RegressionError::ConvergenceFailed {
        iterations: max_iterations,
    })
}

/// Squared Pearson correlation between two vectors; the pseudo-R² reported
/// by the spatial estimators.
pub(crate) fn squared_correlation(a: &Col<f64>, b: &Col<f64>) -> f64 {
    let n = a.nrows();
    if n == 0 || b.nrows() != n {
        return f64::NAN;
    }
    let mean_a = a.iter().sum::<f64>() / n as f64;
    let mean_b = b.iter().sum::<f64>() / n as f64;
    let mut cov = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for i in 0..n {
        let da = a[i] - mean_a;
        let db = b[i] - mean_b;
        cov += da * db;
        var_a += da * da;
        var_b += db * db;
    }
    if var_a <= 0.0 || var_b <= 0.0 {
        return f64::NAN;
    }
    (cov * cov) / (var_a * var_b)
}
