//! Two-stage least squares.

use crate::core::{InferenceKind, RegressionOptions, RegressionOptionsBuilder, RegressionResult};
use crate::inference::CoefficientInference;
use crate::solvers::search::squared_correlation;
use crate::solvers::traits::{FittedRegressor, RegressionError};
use crate::utils::{all_finite_col, all_finite_mat, build_design_matrix, matrix_inverse_qr};
use faer::{Col, Mat};

/// Internal 2SLS solution shared with the generalized-moments lag estimator.
pub(crate) struct TslsSolution {
    /// Parameters in design order: [intercept | exogenous | endogenous].
    pub beta: Col<f64>,
    /// sigma² (Ẑ'Z)⁻¹.
    pub covariance: Mat<f64>,
    pub fitted: Col<f64>,
    pub residuals: Col<f64>,
    pub sigma2: f64,
}

/// Solve a two-stage least squares system.
///
/// `design_x` already carries the constant column when requested; `yend`
/// holds the endogenous regressors and `q` the additional instruments.
pub(crate) fn solve_tsls(
    design_x: &Mat<f64>,
    yend: &Mat<f64>,
    q: &Mat<f64>,
    y: &Col<f64>,
) -> Result<TslsSolution, RegressionError> {
    let n = design_x.nrows();
    let kx = design_x.ncols();
    let kend = yend.ncols();
    let kq = q.ncols();

    if kq < kend {
        return Err(RegressionError::InsufficientInstruments {
            endogenous: kend,
            instruments: kq,
        });
    }

    // Z = [X | yend], H = [X | q]
    let pz = kx + kend;
    let ph = kx + kq;
    let z = Mat::from_fn(n, pz, |i, j| {
        if j < kx {
            design_x[(i, j)]
        } else {
            yend[(i, j - kx)]
        }
    });
    let h = Mat::from_fn(n, ph, |i, j| {
        if j < kx {
            design_x[(i, j)]
        } else {
            q[(i, j - kx)]
        }
    });

    let hth = h.transpose() * &h;
    let hth_inv = matrix_inverse_qr(&hth).map_err(|_| RegressionError::SingularMatrix)?;
    let htz = h.transpose() * &z;
    let proj = &hth_inv * &htz;
    let zhat = &h * &proj;

    // Ẑ'Z = Ẑ'Ẑ by idempotence of the projection
    let a = zhat.transpose() * &z;
    let a_inv = matrix_inverse_qr(&a).map_err(|_| RegressionError::SingularMatrix)?;
    let zhat_ty = zhat.transpose() * y;
    let beta = &a_inv * &zhat_ty;

    let fitted = &z * &beta;
    let residuals = Col::from_fn(n, |i| y[i] - fitted[i]);
    let sigma2 = residuals.iter().map(|&e| e * e).sum::<f64>() / n as f64;

    let covariance = Mat::from_fn(pz, pz, |i, j| sigma2 * a_inv[(i, j)]);

    Ok(TslsSolution {
        beta,
        covariance,
        fitted,
        residuals,
        sigma2,
    })
}

/// Populate a result from a 2SLS solution. The first `offset` design
/// positions (the intercept) are split off; the trailing `n_trailing`
/// parameters can then be moved into the spatial slot by the caller.
pub(crate) fn result_from_tsls(
    solution: &TslsSolution,
    y: &Col<f64>,
    n_coefficients: usize,
    offset: usize,
    options: &RegressionOptions,
) -> RegressionResult {
    let n = y.nrows();
    let pz = solution.beta.nrows();

    let mut result = RegressionResult::empty(n_coefficients, n);
    result.coefficients = Col::from_fn(n_coefficients, |j| solution.beta[j + offset]);
    result.intercept = (offset == 1).then(|| solution.beta[0]);
    result.residuals = solution.residuals.clone();
    result.fitted_values = solution.fitted.clone();
    result.rank = pz;
    result.n_parameters = pz;
    result.rank_tolerance = options.rank_tolerance;
    result.sigma2 = solution.sigma2;
    result.r_squared = squared_correlation(y, &solution.fitted);
    result.confidence_level = options.confidence_level;
    result.inference_kind = InferenceKind::Normal;

    if options.compute_inference {
        let se_all = CoefficientInference::standard_errors(&solution.covariance, &vec![false; pz]);
        let se = Col::from_fn(n_coefficients, |j| se_all[j + offset]);
        let stats = CoefficientInference::test_statistics(&result.coefficients, &se);
        let p_vals = CoefficientInference::p_values(&stats, InferenceKind::Normal, 0.0);
        let (lo, hi) = CoefficientInference::confidence_intervals(
            &result.coefficients,
            &se,
            InferenceKind::Normal,
            0.0,
            options.confidence_level,
        );
        result.std_errors = Some(se);
        result.test_statistics = Some(stats);
        result.p_values = Some(p_vals);
        result.conf_interval_lower = Some(lo);
        result.conf_interval_upper = Some(hi);

        if offset == 1 {
            let intercept = solution.beta[0];
            let se_int = se_all[0];
            if se_int.is_finite() && se_int > 0.0 {
                let z_int = intercept / se_int;
                let crit = CoefficientInference::critical_value(
                    InferenceKind::Normal,
                    0.0,
                    options.confidence_level,
                );
                result.intercept_std_error = Some(se_int);
                result.intercept_statistic = Some(z_int);
                result.intercept_p_value = Some(CoefficientInference::p_value(
                    z_int,
                    InferenceKind::Normal,
                    0.0,
                ));
                result.intercept_conf_interval =
                    Some((intercept - crit * se_int, intercept + crit * se_int));
            }
        }
    }

    result
}

/// Two-stage least squares with explicit endogenous regressors and
/// instruments.
///
/// Estimates `y = Xβ + Yγ + ε` where the columns of `Y` are endogenous and
/// instrumented by `q`. Inference is asymptotic (z statistics).
#[derive(Debug, Clone)]
pub struct TslsRegressor {
    options: RegressionOptions,
}

impl TslsRegressor {
    /// Create a new 2SLS estimator with the given options.
    pub fn new(options: RegressionOptions) -> Self {
        Self { options }
    }

    /// Create a builder for configuring the estimator.
    pub fn builder() -> TslsRegressorBuilder {
        TslsRegressorBuilder::default()
    }

    /// Fit the model.
    ///
    /// # Arguments
    /// * `x` - Exogenous regressors (n, kx), without a constant column
    /// * `y` - Response of length n
    /// * `yend` - Endogenous regressors (n, kend)
    /// * `q` - Instruments for the endogenous regressors (n, kq), kq >= kend
    pub fn fit(
        &self,
        x: &Mat<f64>,
        y: &Col<f64>,
        yend: &Mat<f64>,
        q: &Mat<f64>,
    ) -> Result<FittedTsls, RegressionError> {
        let n = x.nrows();
        if y.nrows() != n || yend.nrows() != n || q.nrows() != n {
            return Err(RegressionError::DimensionMismatch {
                x_rows: n,
                y_len: y.nrows(),
            });
        }
        if !all_finite_mat(x)
            || !all_finite_col(y)
            || !all_finite_mat(yend)
            || !all_finite_mat(q)
        {
            return Err(RegressionError::NonFiniteData);
        }

        let design = build_design_matrix(x, self.options.with_intercept);
        let pz = design.ncols() + yend.ncols();
        if n < pz + 1 {
            return Err(RegressionError::InsufficientObservations {
                needed: pz + 1,
                got: n,
            });
        }

        let solution = solve_tsls(&design, yend, q, y)?;
        let offset = usize::from(self.options.with_intercept);
        let n_coefficients = x.ncols() + yend.ncols();
        let result = result_from_tsls(&solution, y, n_coefficients, offset, &self.options);

        Ok(FittedTsls {
            result,
            n_exogenous: x.ncols(),
        })
    }
}

/// A fitted 2SLS model.
///
/// Coefficients are ordered exogenous first, then endogenous.
#[derive(Debug, Clone)]
pub struct FittedTsls {
    result: RegressionResult,
    n_exogenous: usize,
}

impl FittedTsls {
    /// Number of exogenous regressors (excluding the intercept).
    pub fn n_exogenous(&self) -> usize {
        self.n_exogenous
    }

    /// Coefficient of endogenous regressor `j`.
    pub fn endogenous_coefficient(&self, j: usize) -> f64 {
        self.result.coefficients[self.n_exogenous + j]
    }

    /// Predictions on new data, given both regressor blocks.
    pub fn predict(&self, x: &Mat<f64>, yend: &Mat<f64>) -> Col<f64> {
        let n = x.nrows();
        let intercept = self.result.intercept.unwrap_or(0.0);
        Col::from_fn(n, |i| {
            let mut pred = intercept;
            for j in 0..self.n_exogenous {
                pred += x[(i, j)] * self.result.coefficients[j];
            }
            for j in 0..yend.ncols() {
                pred += yend[(i, j)] * self.result.coefficients[self.n_exogenous + j];
            }
            pred
        })
    }
}

impl FittedRegressor for FittedTsls {
    fn result(&self) -> &RegressionResult {
        &self.result
    }
}

/// Builder for `TslsRegressor`.
#[derive(Debug, Clone, Default)]
pub struct TslsRegressorBuilder {
    builder: RegressionOptionsBuilder,
}

impl TslsRegressorBuilder {
    /// Create a new builder with default options.
    pub fn new() -> Self {
        Self::default()
    }

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

    /// Set the confidence level for confidence intervals.
    pub fn confidence_level(mut self, level: f64) -> Self {
        self.builder = self.builder.confidence_level(level);
        self
    }

    /// Build the 2SLS estimator.
    pub fn build(self) -> TslsRegressor {
        TslsRegressor::new(self.builder.build_unchecked())
    }
}
