//! Spatial lag model: y = rho*W*y + X*beta + e.
//!
//! Two estimators are provided. The generalized-moments estimator is a
//! spatial two-stage least squares with the lagged exogenous variables as
//! instruments. The maximum likelihood estimator concentrates the
//! likelihood in rho and searches it by golden section, with the
//! log-Jacobian ln|I - rho*W| evaluated through a QR factorization.

use crate::core::{InferenceKind, RegressionOptions, RegressionOptionsBuilder, RegressionResult};
use crate::solvers::search::{golden_section_maximize, squared_correlation};
use crate::solvers::traits::{FittedRegressor, RegressionError, Regressor};
use crate::solvers::tsls::{result_from_tsls, solve_tsls};
use crate::utils::{
    all_finite_col, all_finite_mat, build_design_matrix, log_abs_determinant, matrix_inverse_qr,
    solve_least_squares, trace,
};
use crate::weights::{SpatialWeights, WeightsError};
use faer::{Col, Mat};

/// Move the trailing parameter of a 2SLS result into the spatial slot.
fn move_last_to_spatial(result: RegressionResult) -> RegressionResult {
    let p1 = result.coefficients.nrows();
    let p = p1 - 1;
    let mut out = result.clone();

    out.coefficients = Col::from_fn(p, |j| result.coefficients[j]);
    out.aliased = result.aliased[..p].to_vec();
    out.spatial_coefficient = Some(result.coefficients[p]);

    let shrink = |c: &Option<Col<f64>>| c.as_ref().map(|v| Col::from_fn(p, |j| v[j]));
    out.std_errors = shrink(&result.std_errors);
    out.test_statistics = shrink(&result.test_statistics);
    out.p_values = shrink(&result.p_values);
    out.conf_interval_lower = shrink(&result.conf_interval_lower);
    out.conf_interval_upper = shrink(&result.conf_interval_upper);

    out.spatial_std_error = result.std_errors.as_ref().map(|v| v[p]);
    out.spatial_statistic = result.test_statistics.as_ref().map(|v| v[p]);
    out.spatial_p_value = result.p_values.as_ref().map(|v| v[p]);

    out
}

/// Stack spatially lagged copies of the exogenous variables as instruments:
/// [WX, W²X, ...] up to `lags`.
fn lag_instruments(
    weights: &SpatialWeights,
    x: &Mat<f64>,
    lags: usize,
) -> Result<Mat<f64>, WeightsError> {
    let n = x.nrows();
    let p = x.ncols();
    let mut q = Mat::zeros(n, p * lags);
    let mut current = x.to_owned();
    for l in 0..lags {
        current = weights.lag_matrix(&current)?;
        for j in 0..p {
            for i in 0..n {
                q[(i, l * p + j)] = current[(i, j)];
            }
        }
    }
    Ok(q)
}

/// Spatial lag model estimated by generalized moments (spatial two-stage
/// least squares). Wy is instrumented by the lagged exogenous variables.
#[derive(Debug, Clone)]
pub struct GmLagRegressor {
    options: RegressionOptions,
    weights: SpatialWeights,
}

impl GmLagRegressor {
    /// Create a new estimator over the given weights with default options.
    pub fn new(weights: SpatialWeights) -> Self {
        Self {
            options: RegressionOptions::default(),
            weights,
        }
    }

    /// Create a builder for configuring the estimator.
    pub fn builder(weights: SpatialWeights) -> GmLagRegressorBuilder {
        GmLagRegressorBuilder {
            builder: RegressionOptionsBuilder::default(),
            weights,
        }
    }

    /// Create a new estimator with explicit options.
    pub fn with_options(weights: SpatialWeights, options: RegressionOptions) -> Self {
        Self { options, weights }
    }
}

impl Regressor for GmLagRegressor {
    type Fitted = FittedGmLag;

    fn fit(&self, x: &Mat<f64>, y: &Col<f64>) -> Result<Self::Fitted, RegressionError> {
        let n = x.nrows();
        let p = x.ncols();

        if y.nrows() != n {
            return Err(RegressionError::DimensionMismatch {
                x_rows: n,
                y_len: y.nrows(),
            });
        }
        if self.weights.n() != n {
            return Err(RegressionError::InvalidWeights(
                WeightsError::OrderMismatch {
                    order: self.weights.n(),
                    data: n,
                },
            ));
        }
        if !all_finite_mat(x) || !all_finite_col(y) {
            return Err(RegressionError::NonFiniteData);
        }
        let n_params = p + 1 + usize::from(self.options.with_intercept);
        if n < n_params + 1 {
            return Err(RegressionError::InsufficientObservations {
                needed: n_params + 1,
                got: n,
            });
        }

        let wy = self.weights.lag(y)?;
        let yend = Mat::from_fn(n, 1, |i, _| wy[i]);
        let q = lag_instruments(&self.weights, x, self.options.instrument_lags)?;
        let design = build_design_matrix(x, self.options.with_intercept);

        let solution = solve_tsls(&design, &yend, &q, y)?;
        let offset = usize::from(self.options.with_intercept);
        let result = result_from_tsls(&solution, y, p + 1, offset, &self.options);

        Ok(FittedGmLag {
            result: move_last_to_spatial(result),
        })
    }
}

/// A fitted GM spatial lag model.
#[derive(Debug, Clone)]
pub struct FittedGmLag {
    result: RegressionResult,
}

impl FittedGmLag {
    /// The spatial autoregressive coefficient rho.
    pub fn rho(&self) -> f64 {
        self.result.spatial_coefficient.unwrap_or(f64::NAN)
    }
}

impl FittedRegressor for FittedGmLag {
    fn result(&self) -> &RegressionResult {
        &self.result
    }
}

/// Builder for `GmLagRegressor`.
#[derive(Debug, Clone)]
pub struct GmLagRegressorBuilder {
    builder: RegressionOptionsBuilder,
    weights: SpatialWeights,
}

impl GmLagRegressorBuilder {
    /// Set whether to include an intercept term.
    pub fn with_intercept(mut self, include: bool) -> Self {
        self.builder = self.builder.with_intercept(include);
        self
    }

    /// Set whether to compute inference statistics.
    pub fn compute_inference(mut self, compute: bool) -> Self {
        self.builder = self.builder.compute_inference(compute);
        self
    }

    /// Set the highest spatial-lag order used for the instruments.
    pub fn instrument_lags(mut self, lags: usize) -> Self {
        self.builder = self.builder.instrument_lags(lags);
        self
    }

    /// Set the confidence level for confidence intervals.
    pub fn confidence_level(mut self, level: f64) -> Self {
        self.builder = self.builder.confidence_level(level);
        self
    }

    /// Build the estimator.
    pub fn build(self) -> GmLagRegressor {
        GmLagRegressor::with_options(self.weights, self.builder.build_unchecked())
    }
}

/// Spatial lag model estimated by maximum likelihood.
#[derive(Debug, Clone)]
pub struct MlLagRegressor {
    options: RegressionOptions,
    weights: SpatialWeights,
}

impl MlLagRegressor {
    /// Create a new estimator over the given weights with default options.
    pub fn new(weights: SpatialWeights) -> Self {
        Self {
            options: RegressionOptions::default(),
            weights,
        }
    }

    /// Create a new estimator with explicit options.
    pub fn with_options(weights: SpatialWeights, options: RegressionOptions) -> Self {
        Self { options, weights }
    }
}

impl Regressor for MlLagRegressor {
    type Fitted = FittedMlLag;

    fn fit(&self, x: &Mat<f64>, y: &Col<f64>) -> Result<Self::Fitted, RegressionError> {
        let n = x.nrows();
        let p = x.ncols();

        if y.nrows() != n {
            return Err(RegressionError::DimensionMismatch {
                x_rows: n,
                y_len: y.nrows(),
            });
        }
        if self.weights.n() != n {
            return Err(RegressionError::InvalidWeights(
                WeightsError::OrderMismatch {
                    order: self.weights.n(),
                    data: n,
                },
            ));
        }
        if !all_finite_mat(x) || !all_finite_col(y) {
            return Err(RegressionError::NonFiniteData);
        }
        let kp = p + usize::from(self.options.with_intercept);
        if n < kp + 2 {
            return Err(RegressionError::InsufficientObservations {
                needed: kp + 2,
                got: n,
            });
        }

        let design = build_design_matrix(x, self.options.with_intercept);
        let tol = self.options.rank_tolerance;

        // Auxiliary regressions of y and Wy on X
        let (b0, aliased0, rank0) = solve_least_squares(&design, y, tol);
        if rank0 < design.ncols() || aliased0.iter().any(|&a| a) {
            return Err(RegressionError::SingularMatrix);
        }
        let wy = self.weights.lag(y)?;
        let (bl, _, _) = solve_least_squares(&design, &wy, tol);

        let e0 = Col::from_fn(n, |i| {
            let mut pred = 0.0;
            for j in 0..design.ncols() {
                pred += design[(i, j)] * b0[j];
            }
            y[i] - pred
        });
        let el = Col::from_fn(n, |i| {
            let mut pred = 0.0;
            for j in 0..design.ncols() {
                pred += design[(i, j)] * bl[j];
            }
            wy[i] - pred
        });

        let w_dense = self.weights.full();
        let n_f = n as f64;
        let two_pi_ln = (2.0 * std::f64::consts::PI).ln();

        // Concentrated log-likelihood in rho
        let concentrated = |rho: f64| -> f64 {
            let a = Mat::from_fn(n, n, |i, j| {
                let id = if i == j { 1.0 } else { 0.0 };
                id - rho * w_dense[(i, j)]
            });
            let Some(log_jacobian) = log_abs_determinant(&a) else {
                return f64::NEG_INFINITY;
            };
            let rss: f64 = (0..n).map(|i| (e0[i] - rho * el[i]).powi(2)).sum();
            let sig2 = rss / n_f;
            if !(sig2 > 0.0) {
                return f64::NEG_INFINITY;
            }
            -0.5 * n_f * (two_pi_ln + 1.0) - 0.5 * n_f * sig2.ln() + log_jacobian
        };

        let (lo, hi) = self.options.search_bounds;
        let (rho, log_likelihood) = golden_section_maximize(
            concentrated,
            lo,
            hi,
            self.options.search_tolerance,
            self.options.max_iterations,
        )?;

        let beta = Col::from_fn(design.ncols(), |j| b0[j] - rho * bl[j]);
        let xb = &design * &beta;
        let fitted_values = Col::from_fn(n, |i| rho * wy[i] + xb[i]);
        let residuals = Col::from_fn(n, |i| y[i] - fitted_values[i]);
        let sigma2 = residuals.iter().map(|&e| e * e).sum::<f64>() / n_f;

        let offset = usize::from(self.options.with_intercept);
        let mut result = RegressionResult::empty(p, n);
        result.coefficients = Col::from_fn(p, |j| beta[j + offset]);
        result.intercept = self.options.with_intercept.then(|| beta[0]);
        result.spatial_coefficient = Some(rho);
        result.residuals = residuals;
        result.fitted_values = fitted_values.clone();
        result.rank = design.ncols();
        result.n_parameters = kp + 1;
        result.rank_tolerance = tol;
        result.sigma2 = sigma2;
        result.r_squared = squared_correlation(y, &fitted_values);
        result.log_likelihood = log_likelihood;
        result.aic = -2.0 * log_likelihood + 2.0 * (kp + 1) as f64;
        result.bic = -2.0 * log_likelihood + (kp + 1) as f64 * n_f.ln();
        result.confidence_level = self.options.confidence_level;
        result.inference_kind = InferenceKind::Normal;

        if self.options.compute_inference {
            self.compute_inference(&design, &w_dense, &xb, rho, sigma2, &mut result);
        }

        Ok(FittedMlLag { result })
    }
}

impl MlLagRegressor {
    /// Asymptotic variance from the information matrix of (beta, rho, sigma²)
    /// evaluated at the ML estimates (Anselin 1988).
    fn compute_inference(
        &self,
        design: &Mat<f64>,
        w_dense: &Mat<f64>,
        xb: &Col<f64>,
        rho: f64,
        sigma2: f64,
        result: &mut RegressionResult,
    ) {
        let n = design.nrows();
        let kp = design.ncols();
        if !(sigma2 > 0.0) {
            return;
        }

        let a = Mat::from_fn(n, n, |i, j| {
            let id = if i == j { 1.0 } else { 0.0 };
            id - rho * w_dense[(i, j)]
        });
        let Ok(a_inv) = matrix_inverse_qr(&a) else {
            return;
        };
        let p_mat = w_dense * &a_inv;
        let tr1 = trace(&p_mat);
        let pp = &p_mat * &p_mat;
        let tr2 = trace(&pp);
        let mut tr3 = 0.0;
        for j in 0..n {
            for i in 0..n {
                tr3 += p_mat[(i, j)] * p_mat[(i, j)];
            }
        }

        // v = W (I - rho W)^{-1} X beta
        let v = &p_mat * xb;
        let vv: f64 = v.iter().map(|&e| e * e).sum();

        let dim = kp + 2;
        let mut info = Mat::zeros(dim, dim);
        let dtd = design.transpose() * design;
        for r in 0..kp {
            for c in 0..kp {
                info[(r, c)] = dtd[(r, c)] / sigma2;
            }
            let mut dv = 0.0;
            for i in 0..n {
                dv += design[(i, r)] * v[i];
            }
            info[(r, kp)] = dv / sigma2;
            info[(kp, r)] = dv / sigma2;
        }
        info[(kp, kp)] = tr2 + tr3 + vv / sigma2;
        info[(kp, kp + 1)] = tr1 / sigma2;
        info[(kp + 1, kp)] = tr1 / sigma2;
        info[(kp + 1, kp + 1)] = n as f64 / (2.0 * sigma2 * sigma2);

        let Ok(cov) = matrix_inverse_qr(&info) else {
            return;
        };

        let offset = usize::from(self.options.with_intercept);
        let p = result.coefficients.nrows();
        let se = Col::from_fn(p, |j| {
            let var = cov[(j + offset, j + offset)];
            if var >= 0.0 {
                var.sqrt()
            } else {
                f64::NAN
            }
        });

        let stats =
            crate::inference::CoefficientInference::test_statistics(&result.coefficients, &se);
        let p_vals = crate::inference::CoefficientInference::p_values(
            &stats,
            InferenceKind::Normal,
            0.0,
        );
        let (ci_lo, ci_hi) = crate::inference::CoefficientInference::confidence_intervals(
            &result.coefficients,
            &se,
            InferenceKind::Normal,
            0.0,
            self.options.confidence_level,
        );
        result.std_errors = Some(se);
        result.test_statistics = Some(stats);
        result.p_values = Some(p_vals);
        result.conf_interval_lower = Some(ci_lo);
        result.conf_interval_upper = Some(ci_hi);

        if let Some(intercept) = result.intercept {
            let var = cov[(0, 0)];
            if var >= 0.0 {
                let se_int = var.sqrt();
                let z = intercept / se_int;
                result.intercept_std_error = Some(se_int);
                result.intercept_statistic = Some(z);
                result.intercept_p_value =
                    Some(crate::inference::CoefficientInference::p_value(
                        z,
                        InferenceKind::Normal,
                        0.0,
                    ));
            }
        }

        let var_rho = cov[(kp, kp)];
        if var_rho >= 0.0 {
            let se_rho = var_rho.sqrt();
            let z = result.spatial_coefficient.unwrap_or(f64::NAN) / se_rho;
            result.spatial_std_error = Some(se_rho);
            result.spatial_statistic = Some(z);
            result.spatial_p_value = Some(crate::inference::CoefficientInference::p_value(
                z,
                InferenceKind::Normal,
                0.0,
            ));
        }
    }
}

/// A fitted ML spatial lag model.
#[derive(Debug, Clone)]
pub struct FittedMlLag {
    result: RegressionResult,
}

impl FittedMlLag {
    /// The spatial autoregressive coefficient rho.
    pub fn rho(&self) -> f64 {
        self.result.spatial_coefficient.unwrap_or(f64::NAN)
    }
}

impl FittedRegressor for FittedMlLag {
    fn result(&self) -> &RegressionResult {
        &self.result
    }
}
