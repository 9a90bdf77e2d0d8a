//! Spatial error model: y = X*beta + u, u = lambda*W*u + e.
//!
//! Estimated by maximum likelihood. The likelihood is concentrated in
//! lambda by spatially filtering both y and X, then searched by golden
//! section over the stationarity interval.

use crate::core::{InferenceKind, RegressionOptions, RegressionOptionsBuilder, RegressionResult};
use crate::inference::CoefficientInference;
use crate::solvers::search::{golden_section_maximize, squared_correlation};
use crate::solvers::traits::{FittedRegressor, RegressionError, Regressor};
use crate::utils::{
    all_finite_col, all_finite_mat, build_design_matrix, log_abs_determinant, matrix_inverse_qr,
    solve_least_squares, trace,
};
use crate::weights::{SpatialWeights, WeightsError};
use faer::{Col, Mat};

/// Spatial error model estimated by maximum likelihood.
#[derive(Debug, Clone)]
pub struct MlErrorRegressor {
    options: RegressionOptions,
    weights: SpatialWeights,
}

impl MlErrorRegressor {
    /// Create a new estimator over the given weights with default options.
    pub fn new(weights: SpatialWeights) -> Self {
        Self {
            options: RegressionOptions::default(),
            weights,
        }
    }

    /// Create a builder for configuring the estimator.
    pub fn builder(weights: SpatialWeights) -> MlErrorRegressorBuilder {
        MlErrorRegressorBuilder {
            builder: RegressionOptionsBuilder::default(),
            weights,
        }
    }

    /// Create a new estimator with explicit options.
    pub fn with_options(weights: SpatialWeights, options: RegressionOptions) -> Self {
        Self { options, weights }
    }
}

/// Solve the filtered least squares for a given lambda. Returns the
/// coefficient vector and the filtered residuals, or None when the
/// filtered design loses rank.
fn filtered_fit(
    design: &Mat<f64>,
    w_design: &Mat<f64>,
    y: &Col<f64>,
    wy: &Col<f64>,
    lambda: f64,
    tol: f64,
) -> Option<(Col<f64>, Col<f64>)> {
    let n = design.nrows();
    let kp = design.ncols();
    let ys = Col::from_fn(n, |i| y[i] - lambda * wy[i]);
    let ds = Mat::from_fn(n, kp, |i, j| design[(i, j)] - lambda * w_design[(i, j)]);

    let (beta, aliased, rank) = solve_least_squares(&ds, &ys, tol);
    if rank < kp || aliased.iter().any(|&a| a) {
        return None;
    }
    let es = Col::from_fn(n, |i| {
        let mut pred = 0.0;
        for j in 0..kp {
            pred += ds[(i, j)] * beta[j];
        }
        ys[i] - pred
    });
    Some((beta, es))
}

impl Regressor for MlErrorRegressor {
    type Fitted = FittedMlError;

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
        let wy = self.weights.lag(y)?;
        let w_design = self.weights.lag_matrix(&design)?;
        let w_dense = self.weights.full();

        let n_f = n as f64;
        let two_pi_ln = (2.0 * std::f64::consts::PI).ln();

        // Concentrated log-likelihood in lambda
        let concentrated = |lambda: f64| -> f64 {
            let Some((_, es)) = filtered_fit(&design, &w_design, y, &wy, lambda, tol) else {
                return f64::NEG_INFINITY;
            };
            let sig2 = es.iter().map(|&e| e * e).sum::<f64>() / n_f;
            if !(sig2 > 0.0) {
                return f64::NEG_INFINITY;
            }
            let b = Mat::from_fn(n, n, |i, j| {
                let id = if i == j { 1.0 } else { 0.0 };
                id - lambda * w_dense[(i, j)]
            });
            let Some(log_jacobian) = log_abs_determinant(&b) else {
                return f64::NEG_INFINITY;
            };
            -0.5 * n_f * (two_pi_ln + 1.0) - 0.5 * n_f * sig2.ln() + log_jacobian
        };

        let (lo, hi) = self.options.search_bounds;
        let (lambda, log_likelihood) = golden_section_maximize(
            concentrated,
            lo,
            hi,
            self.options.search_tolerance,
            self.options.max_iterations,
        )?;

        let (beta, es) = filtered_fit(&design, &w_design, y, &wy, lambda, tol)
            .ok_or(RegressionError::SingularMatrix)?;
        let sigma2 = es.iter().map(|&e| e * e).sum::<f64>() / n_f;

        // Fitted values and residuals on the unfiltered scale
        let fitted_values = {
            let xb = &design * &beta;
            Col::from_fn(n, |i| xb[i])
        };
        let residuals = Col::from_fn(n, |i| y[i] - fitted_values[i]);

        let offset = usize::from(self.options.with_intercept);
        let mut result = RegressionResult::empty(p, n);
        result.coefficients = Col::from_fn(p, |j| beta[j + offset]);
        result.intercept = self.options.with_intercept.then(|| beta[0]);
        result.spatial_coefficient = Some(lambda);
        result.residuals = residuals;
        result.fitted_values = fitted_values.clone();
        result.rank = kp;
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
            self.compute_inference(&design, &w_design, &w_dense, lambda, sigma2, &mut result);
        }

        Ok(FittedMlError { result })
    }
}

impl MlErrorRegressor {
    /// Asymptotic variance of beta from the filtered cross-products and of
    /// lambda from the (lambda, sigma²) block of the information matrix.
    fn compute_inference(
        &self,
        design: &Mat<f64>,
        w_design: &Mat<f64>,
        w_dense: &Mat<f64>,
        lambda: f64,
        sigma2: f64,
        result: &mut RegressionResult,
    ) {
        let n = design.nrows();
        let kp = design.ncols();
        if !(sigma2 > 0.0) {
            return;
        }

        let ds = Mat::from_fn(n, kp, |i, j| design[(i, j)] - lambda * w_design[(i, j)]);
        let dtd = ds.transpose() * &ds;
        let Ok(dtd_inv) = matrix_inverse_qr(&dtd) else {
            return;
        };

        let offset = usize::from(self.options.with_intercept);
        let p = result.coefficients.nrows();
        let se = Col::from_fn(p, |j| {
            let var = sigma2 * dtd_inv[(j + offset, j + offset)];
            if var >= 0.0 {
                var.sqrt()
            } else {
                f64::NAN
            }
        });

        let stats = CoefficientInference::test_statistics(&result.coefficients, &se);
        let p_vals = CoefficientInference::p_values(&stats, InferenceKind::Normal, 0.0);
        let (ci_lo, ci_hi) = CoefficientInference::confidence_intervals(
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
            let var = sigma2 * dtd_inv[(0, 0)];
            if var >= 0.0 {
                let se_int = var.sqrt();
                let z = intercept / se_int;
                result.intercept_std_error = Some(se_int);
                result.intercept_statistic = Some(z);
                result.intercept_p_value =
                    Some(CoefficientInference::p_value(z, InferenceKind::Normal, 0.0));
            }
        }

        // Lambda variance from the 2x2 information block in (lambda, sigma²)
        let b = Mat::from_fn(n, n, |i, j| {
            let id = if i == j { 1.0 } else { 0.0 };
            id - lambda * w_dense[(i, j)]
        });
        let Ok(b_inv) = matrix_inverse_qr(&b) else {
            return;
        };
        let p_mat = w_dense * &b_inv;
        let tr1 = trace(&p_mat);
        let pp = &p_mat * &p_mat;
        let tr2 = trace(&pp);
        let mut tr3 = 0.0;
        for j in 0..n {
            for i in 0..n {
                tr3 += p_mat[(i, j)] * p_mat[(i, j)];
            }
        }

        let mut info = Mat::zeros(2, 2);
        info[(0, 0)] = tr2 + tr3;
        info[(0, 1)] = tr1 / sigma2;
        info[(1, 0)] = tr1 / sigma2;
        info[(1, 1)] = n as f64 / (2.0 * sigma2 * sigma2);
        let Ok(info_inv) = matrix_inverse_qr(&info) else {
            return;
        };

        let var_lambda = info_inv[(0, 0)];
        if var_lambda >= 0.0 {
            let se_lambda = var_lambda.sqrt();
            let z = lambda / se_lambda;
            result.spatial_std_error = Some(se_lambda);
            result.spatial_statistic = Some(z);
            result.spatial_p_value =
                Some(CoefficientInference::p_value(z, InferenceKind::Normal, 0.0));
        }
    }
}

/// A fitted ML spatial error model.
#[derive(Debug, Clone)]
pub struct FittedMlError {
    result: RegressionResult,
}

impl FittedMlError {
    /// The spatial error coefficient lambda.
    pub fn lambda(&self) -> f64 {
        self.result.spatial_coefficient.unwrap_or(f64::NAN)
    }
}

impl FittedRegressor for FittedMlError {
    fn result(&self) -> &RegressionResult {
        &self.result
    }
}

/// Builder for `MlErrorRegressor`.
#[derive(Debug, Clone)]
pub struct MlErrorRegressorBuilder {
    builder: RegressionOptionsBuilder,
    weights: SpatialWeights,
}

impl MlErrorRegressorBuilder {
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

    /// Set the search interval for the spatial coefficient.
    pub fn search_bounds(mut self, lower: f64, upper: f64) -> Self {
        self.builder = self.builder.search_bounds(lower, upper);
        self
    }

    /// Set the confidence level for confidence intervals.
    pub fn confidence_level(mut self, level: f64) -> Self {
        self.builder = self.builder.confidence_level(level);
        self
    }

    /// Build the estimator.
    pub fn build(self) -> MlErrorRegressor {
        MlErrorRegressor::with_options(self.weights, self.builder.build_unchecked())
    }
}
