//! Spatial dependence diagnostics on OLS residuals.
//!
//! Moran's I on the residuals (Cliff-Ord moments) plus the Lagrange
//! multiplier battery of Anselin: LM error, LM lag, their robust forms,
//! and the joint SARMA test.

use super::TestResult;
use crate::core::RegressionResult;
use crate::solvers::RegressionError;
use crate::utils::{build_design_matrix, matrix_inverse_qr, trace};
use crate::weights::{SpatialWeights, WeightsError};
use faer::{Col, Mat};
use statrs::distribution::{ChiSquared, ContinuousCDF, Normal};

fn chi2_upper_tail(statistic: f64, df: f64) -> f64 {
    if !statistic.is_finite() {
        return f64::NAN;
    }
    match ChiSquared::new(df) {
        Ok(d) => 1.0 - d.cdf(statistic),
        Err(_) => f64::NAN,
    }
}

/// Moran's I on regression residuals with a normal approximation.
#[derive(Debug, Clone, Copy)]
pub struct MoranResult {
    /// The Moran's I statistic.
    pub i: f64,
    /// Expected value under the null of no spatial autocorrelation.
    pub expected: f64,
    /// Variance under the null, accounting for the regression structure.
    pub variance: f64,
    /// Standardized statistic.
    pub z_value: f64,
    /// Two-sided p-value from the normal approximation.
    pub p_value: f64,
}

/// Moran's I test on the residuals of a fitted regression.
///
/// The moments follow Cliff and Ord for regression residuals: the
/// expectation and variance depend on the annihilator matrix
/// M = I - X(X'X)⁻¹X' of the design.
pub fn morans_i_residuals(
    x: &Mat<f64>,
    result: &RegressionResult,
    weights: &SpatialWeights,
    with_intercept: bool,
) -> Result<MoranResult, RegressionError> {
    let e = &result.residuals;
    let n = e.nrows();
    if weights.n() != n {
        return Err(RegressionError::InvalidWeights(
            WeightsError::OrderMismatch {
                order: weights.n(),
                data: n,
            },
        ));
    }

    let design = build_design_matrix(x, with_intercept);
    let k = design.ncols();
    let w = weights.full();
    let s0 = weights.s0();

    let we = weights.lag(e)?;
    let ee: f64 = e.iter().map(|&v| v * v).sum();
    let ewe: f64 = (0..n).map(|i| e[i] * we[i]).sum();
    if ee <= 0.0 || s0 <= 0.0 {
        return Err(RegressionError::NumericalError(
            "degenerate residuals or weights in Moran's I".into(),
        ));
    }
    let i_stat = (n as f64 / s0) * ewe / ee;

    // M = I - X(X'X)^{-1}X'
    let xtx = design.transpose() * &design;
    let xtx_inv =
        matrix_inverse_qr(&xtx).map_err(|_| RegressionError::SingularMatrix)?;
    let hat = &design * &xtx_inv * design.transpose();
    let m = Mat::from_fn(n, n, |i, j| {
        let id = if i == j { 1.0 } else { 0.0 };
        id - hat[(i, j)]
    });

    let mw = &m * &w;
    let trace_mw = trace(&mw);
    let mwmw = &mw * &mw;
    let trace_mwmw = trace(&mwmw);
    // tr(MW M W') with M symmetric idempotent
    let mwt = &m * w.transpose();
    let cross = &mw * &mwt;
    let trace_cross = trace(&cross);

    let nk = (n - k) as f64;
    let expected = (n as f64 / s0) * trace_mw / nk;
    let scale = (n as f64 / s0).powi(2);
    let variance =
        scale * (trace_cross + trace_mwmw + trace_mw * trace_mw) / (nk * (nk + 2.0))
            - expected * expected;

    if variance <= 0.0 {
        return Err(RegressionError::NumericalError(
            "non-positive Moran's I variance".into(),
        ));
    }

    let z_value = (i_stat - expected) / variance.sqrt();
    let p_value = match Normal::new(0.0, 1.0) {
        Ok(d) => 2.0 * (1.0 - d.cdf(z_value.abs())),
        Err(_) => f64::NAN,
    };

    Ok(MoranResult {
        i: i_stat,
        expected,
        variance,
        z_value,
        p_value,
    })
}

/// The Lagrange multiplier battery for spatial dependence.
#[derive(Debug, Clone, Copy)]
pub struct LmTests {
    /// LM test against spatial error dependence, chi-squared(1).
    pub lm_error: TestResult,
    /// LM test against a spatial lag, chi-squared(1).
    pub lm_lag: TestResult,
    /// LM error robust to local lag misspecification.
    pub robust_lm_error: TestResult,
    /// LM lag robust to local error misspecification.
    pub robust_lm_lag: TestResult,
    /// Joint SARMA test, chi-squared(2).
    pub sarma: TestResult,
}

/// Compute the Anselin LM diagnostics from an OLS fit.
///
/// All five statistics share the cross products e'We/s² and e'Wy/s² and
/// the trace term tr(W'W + WW); the robust variants correct each test
/// for the presence of the other alternative.
pub fn lm_tests(
    x: &Mat<f64>,
    y: &Col<f64>,
    result: &RegressionResult,
    weights: &SpatialWeights,
    with_intercept: bool,
) -> Result<LmTests, RegressionError> {
    let e = &result.residuals;
    let n = e.nrows();
    if weights.n() != n {
        return Err(RegressionError::InvalidWeights(
            WeightsError::OrderMismatch {
                order: weights.n(),
                data: n,
            },
        ));
    }

    let design = build_design_matrix(x, with_intercept);
    let w = weights.full();

    let s2 = e.iter().map(|&v| v * v).sum::<f64>() / n as f64;
    if s2 <= 0.0 {
        return Err(RegressionError::NumericalError(
            "degenerate residuals in LM tests".into(),
        ));
    }

    // t = tr(W'W + WW)
    let mut t = 0.0;
    for i in 0..n {
        for j in 0..n {
            t += w[(i, j)] * w[(i, j)] + w[(i, j)] * w[(j, i)];
        }
    }

    let we = weights.lag(e)?;
    let wy = weights.lag(y)?;
    let d: f64 = (0..n).map(|i| e[i] * we[i]).sum::<f64>() / s2;
    let c: f64 = (0..n).map(|i| e[i] * wy[i]).sum::<f64>() / s2;

    // nJ = (WXb)'M(WXb)/s² + t, with Xb the OLS prediction
    let xb = Col::from_fn(n, |i| y[i] - e[i]);
    let wxb = weights.lag(&xb)?;
    let xtx = design.transpose() * &design;
    let xtx_inv =
        matrix_inverse_qr(&xtx).map_err(|_| RegressionError::SingularMatrix)?;
    let xt_wxb = design.transpose() * &wxb;
    let coef = &xtx_inv * &xt_wxb;
    let proj = &design * &coef;
    let m_wxb: f64 = (0..n).map(|i| wxb[i] * (wxb[i] - proj[i])).sum();
    let nj = m_wxb / s2 + t;

    let lm_error_stat = d * d / t;
    let lm_lag_stat = c * c / nj;
    let robust_error_stat = {
        let num = d - t * c / nj;
        num * num / (t * (1.0 - t / nj))
    };
    let robust_lag_stat = {
        let num = c - d;
        num * num / (nj - t)
    };
    let sarma_stat = robust_lag_stat + lm_error_stat;

    let one_df = |statistic: f64| TestResult {
        statistic,
        df: 1.0,
        p_value: chi2_upper_tail(statistic, 1.0),
    };

    Ok(LmTests {
        lm_error: one_df(lm_error_stat),
        lm_lag: one_df(lm_lag_stat),
        robust_lm_error: one_df(robust_error_stat),
        robust_lm_lag: one_df(robust_lag_stat),
        sarma: TestResult {
            statistic: sarma_stat,
            df: 2.0,
            p_value: chi2_upper_tail(sarma_stat, 2.0),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solvers::{FittedRegressor, OlsRegressor, Regressor};
    use crate::weights::Contiguity;

    fn lattice_fit() -> (Mat<f64>, Col<f64>, SpatialWeights, RegressionResult) {
        let mut w = SpatialWeights::lattice(6, 6, Contiguity::Rook).expect("lattice");
        w.row_standardize();
        let n = 36;
        let x = Mat::from_fn(n, 1, |i, _| ((i * 5) % 17) as f64);
        let y = Col::from_fn(n, |i| {
            let noise = match i % 4 {
                0 => 0.6,
                1 => -0.4,
                2 => 0.2,
                _ => -0.4,
            };
            2.0 + 0.7 * x[(i, 0)] + noise
        });
        let fitted = OlsRegressor::new().fit(&x, &y).expect("fit succeeds");
        (x, y, w, fitted.result().clone())
    }

    #[test]
    fn test_morans_i_in_range() {
        let (x, _, w, result) = lattice_fit();
        let moran = morans_i_residuals(&x, &result, &w, true).expect("moran");
        assert!(moran.i.is_finite());
        assert!(moran.variance > 0.0);
        assert!(moran.p_value >= 0.0 && moran.p_value <= 1.0);
    }

    #[test]
    fn test_lm_battery_consistency() {
        let (x, y, w, result) = lattice_fit();
        let lm = lm_tests(&x, &y, &result, &w, true).expect("lm tests");
        assert!(lm.lm_error.statistic >= 0.0);
        assert!(lm.lm_lag.statistic >= 0.0);
        assert_eq!(lm.sarma.df, 2.0);
        // SARMA decomposes into robust lag plus plain error
        let recomposed = lm.robust_lm_lag.statistic + lm.lm_error.statistic;
        assert!((lm.sarma.statistic - recomposed).abs() < 1e-12);
    }

    #[test]
    fn test_lm_weights_mismatch() {
        let (x, y, _, result) = lattice_fit();
        let mut small = SpatialWeights::lattice(3, 3, Contiguity::Rook).expect("lattice");
        small.row_standardize();
        assert!(lm_tests(&x, &y, &result, &small, true).is_err());
    }
}
