//! Heteroskedasticity tests on regression residuals.

use super::TestResult;
use crate::core::RegressionResult;
use crate::utils::{build_design_matrix, solve_least_squares};
use faer::{Col, Mat};
use statrs::distribution::{ChiSquared, ContinuousCDF};

fn chi2_upper_tail(statistic: f64, df: f64) -> f64 {
    if !statistic.is_finite() || df <= 0.0 {
        return f64::NAN;
    }
    match ChiSquared::new(df) {
        Ok(d) => 1.0 - d.cdf(statistic),
        Err(_) => f64::NAN,
    }
}

/// R-squared of an auxiliary regression of `target` on `x` plus intercept.
fn auxiliary_r_squared(x: &Mat<f64>, target: &Col<f64>, tolerance: f64) -> Option<f64> {
    let n = x.nrows();
    let design = build_design_matrix(x, true);
    let (beta, _, _) = solve_least_squares(&design, target, tolerance);

    let mean = target.iter().sum::<f64>() / n as f64;
    let mut rss = 0.0;
    let mut tss = 0.0;
    for i in 0..n {
        let mut pred = 0.0;
        for j in 0..design.ncols() {
            let b = beta[j];
            if !b.is_nan() {
                pred += design[(i, j)] * b;
            }
        }
        rss += (target[i] - pred).powi(2);
        tss += (target[i] - mean).powi(2);
    }
    if tss <= 0.0 {
        return None;
    }
    Some(1.0 - rss / tss)
}

/// Breusch-Pagan test for heteroskedasticity.
///
/// Regresses scaled squared residuals on the explanatory variables. With
/// `koenker` set, the studentized (Koenker-Bassett) variant is used, which
/// is robust to non-normality of the residuals.
pub fn breusch_pagan(x: &Mat<f64>, result: &RegressionResult, koenker: bool) -> TestResult {
    let e = &result.residuals;
    let n = e.nrows();
    let n_f = n as f64;
    let df = x.ncols() as f64;

    let sigma2 = e.iter().map(|&v| v * v).sum::<f64>() / n_f;
    if sigma2 <= 0.0 {
        return TestResult {
            statistic: f64::NAN,
            df,
            p_value: f64::NAN,
        };
    }

    let statistic = if koenker {
        // nR² of e² regressed on X
        let target = Col::from_fn(n, |i| e[i] * e[i]);
        match auxiliary_r_squared(x, &target, result.rank_tolerance) {
            Some(r2) => n_f * r2,
            None => f64::NAN,
        }
    } else {
        // Half the explained sum of squares of g = e²/sigma²
        let target = Col::from_fn(n, |i| e[i] * e[i] / sigma2);
        let g_mean = target.iter().sum::<f64>() / n_f;
        let tss: f64 = target.iter().map(|&g| (g - g_mean).powi(2)).sum();
        match auxiliary_r_squared(x, &target, result.rank_tolerance) {
            Some(r2) => 0.5 * r2 * tss,
            None => f64::NAN,
        }
    };

    TestResult {
        statistic,
        df,
        p_value: chi2_upper_tail(statistic, df),
    }
}

/// Koenker-Bassett studentized variant of the Breusch-Pagan test.
pub fn koenker_bassett(x: &Mat<f64>, result: &RegressionResult) -> TestResult {
    breusch_pagan(x, result, true)
}

/// White test for heteroskedasticity of unknown form.
///
/// The auxiliary regression includes the explanatory variables, their
/// squares, and all pairwise cross products.
pub fn white(x: &Mat<f64>, result: &RegressionResult) -> TestResult {
    let e = &result.residuals;
    let n = x.nrows();
    let p = x.ncols();

    // X, X², and cross products
    let n_aux = p + p + p * (p - 1) / 2;
    let mut aux = Mat::zeros(n, n_aux);
    for j in 0..p {
        for i in 0..n {
            aux[(i, j)] = x[(i, j)];
            aux[(i, p + j)] = x[(i, j)] * x[(i, j)];
        }
    }
    let mut col = 2 * p;
    for a in 0..p {
        for b in (a + 1)..p {
            for i in 0..n {
                aux[(i, col)] = x[(i, a)] * x[(i, b)];
            }
            col += 1;
        }
    }

    let target = Col::from_fn(n, |i| e[i] * e[i]);
    let df = n_aux as f64;
    let statistic = match auxiliary_r_squared(&aux, &target, result.rank_tolerance) {
        Some(r2) => n as f64 * r2,
        None => f64::NAN,
    };

    TestResult {
        statistic,
        df,
        p_value: chi2_upper_tail(statistic, df),
    }
}
