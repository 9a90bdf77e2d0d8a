//! Ordinary least squares.

use crate::core::{InferenceKind, RegressionOptions, RegressionOptionsBuilder, RegressionResult};
use crate::inference::CoefficientInference;
use crate::solvers::traits::{FittedRegressor, RegressionError, Regressor};
use crate::utils::{
    all_finite_col, all_finite_mat, build_design_matrix, matrix_inverse_qr, solve_least_squares,
};
use faer::{Col, Mat};
use statrs::distribution::{ContinuousCDF, FisherSnedecor};

/// Ordinary least squares estimator.
///
/// Uses QR decomposition with column pivoting, so rank-deficient designs fit
/// with the collinear coefficients set to NaN and flagged as aliased.
///
/// # Example
///
/// ```rust,ignore
/// use spatialstats::solvers::{FittedRegressor, OlsRegressor, Regressor};
/// use faer::{Col, Mat};
///
/// let fitted = OlsRegressor::builder()
///     .with_intercept(true)
///     .build()
///     .fit(&x, &y)?;
/// println!("R² = {}", fitted.r_squared());
/// ```
#[derive(Debug, Clone)]
pub struct OlsRegressor {
    options: RegressionOptions,
}

impl OlsRegressor {
    /// Create a new OLS estimator with default options.
    pub fn new() -> Self {
        Self {
            options: RegressionOptions::default(),
        }
    }

    /// Create a new OLS estimator with explicit options.
    pub fn with_options(options: RegressionOptions) -> Self {
        Self { options }
    }

    /// Create a builder for configuring the estimator.
    pub fn builder() -> OlsRegressorBuilder {
        OlsRegressorBuilder::default()
    }
}

impl Default for OlsRegressor {
    fn default() -> Self {
        Self::new()
    }
}

impl Regressor for OlsRegressor {
    type Fitted = FittedOls;

    fn fit(&self, x: &Mat<f64>, y: &Col<f64>) -> Result<Self::Fitted, RegressionError> {
        let n = x.nrows();
        let p = x.ncols();

        if y.nrows() != n {
            return Err(RegressionError::DimensionMismatch {
                x_rows: n,
                y_len: y.nrows(),
            });
        }
        if !all_finite_mat(x) || !all_finite_col(y) {
            return Err(RegressionError::NonFiniteData);
        }
        if n < 2 {
            return Err(RegressionError::InsufficientObservations { needed: 2, got: n });
        }
        let n_params_max = if self.options.with_intercept { p + 1 } else { p };
        if n < n_params_max {
            return Err(RegressionError::InsufficientObservations {
                needed: n_params_max,
                got: n,
            });
        }

        let design = build_design_matrix(x, self.options.with_intercept);
        let (beta, aliased_design, rank) =
            solve_least_squares(&design, y, self.options.rank_tolerance);
        if rank == 0 {
            return Err(RegressionError::SingularMatrix);
        }

        // Fitted values and residuals, skipping aliased columns
        let total = design.ncols();
        let mut fitted_values = Col::zeros(n);
        let mut residuals = Col::zeros(n);
        for i in 0..n {
            let mut pred = 0.0;
            for j in 0..total {
                if !aliased_design[j] {
                    pred += design[(i, j)] * beta[j];
                }
            }
            fitted_values[i] = pred;
            residuals[i] = y[i] - pred;
        }

        let offset = usize::from(self.options.with_intercept);
        let intercept = if self.options.with_intercept && !aliased_design[0] {
            Some(beta[0])
        } else {
            None
        };

        let mut result = RegressionResult::empty(p, n);
        result.coefficients = Col::from_fn(p, |j| beta[j + offset]);
        result.aliased = aliased_design[offset..].to_vec();
        result.intercept = intercept;
        result.residuals = residuals;
        result.fitted_values = fitted_values;
        result.rank = rank;
        result.n_parameters = rank;
        result.rank_tolerance = self.options.rank_tolerance;
        result.confidence_level = self.options.confidence_level;
        result.inference_kind = InferenceKind::StudentT;

        self.compute_statistics(y, &mut result);

        if self.options.compute_inference {
            self.compute_inference(&design, &aliased_design, &mut result);
        }

        Ok(FittedOls {
            options: self.options.clone(),
            result,
        })
    }
}

impl OlsRegressor {
    fn compute_statistics(&self, y: &Col<f64>, result: &mut RegressionResult) {
        let n = y.nrows();
        let n_f = n as f64;
        let rank = result.rank;

        let y_mean: f64 = y.iter().sum::<f64>() / n_f;
        let tss: f64 = y.iter().map(|&yi| (yi - y_mean).powi(2)).sum();
        let rss: f64 = result.residuals.iter().map(|&r| r.powi(2)).sum();

        result.r_squared = if tss > 0.0 {
            (1.0 - rss / tss).clamp(0.0, 1.0)
        } else if rss < 1e-10 {
            1.0
        } else {
            0.0
        };

        let df_total = n_f - 1.0;
        let df_resid = n_f - rank as f64;
        result.adj_r_squared = if df_resid > 0.0 && df_total > 0.0 {
            1.0 - (1.0 - result.r_squared) * df_total / df_resid
        } else {
            f64::NAN
        };

        result.sigma2 = if df_resid > 0.0 { rss / df_resid } else { f64::NAN };

        let has_intercept = result.intercept.is_some();
        let df_model = (rank - usize::from(has_intercept)) as f64;
        let ess = tss - rss;
        result.f_statistic =
            if df_model > 0.0 && df_resid > 0.0 && result.sigma2.is_finite() && result.sigma2 > 0.0
            {
                (ess / df_model) / result.sigma2
            } else {
                f64::NAN
            };
        result.f_pvalue = if result.f_statistic.is_finite() {
            FisherSnedecor::new(df_model, df_resid)
                .map(|d| 1.0 - d.cdf(result.f_statistic))
                .unwrap_or(f64::NAN)
        } else {
            f64::NAN
        };

        result.log_likelihood = if rss > 0.0 {
            -0.5 * n_f * (1.0 + (2.0 * std::f64::consts::PI).ln() + (rss / n_f).ln())
        } else {
            f64::NAN
        };
        let k = rank as f64;
        result.aic = -2.0 * result.log_likelihood + 2.0 * k;
        result.bic = -2.0 * result.log_likelihood + k * n_f.ln();
    }

    /// Standard errors, t statistics, p-values, and confidence intervals
    /// from the reduced (non-aliased) design.
    fn compute_inference(
        &self,
        design: &Mat<f64>,
        aliased_design: &[bool],
        result: &mut RegressionResult,
    ) {
        let df = result.residual_df() as f64;
        if df <= 0.0 || !result.sigma2.is_finite() {
            return;
        }

        let n = design.nrows();
        let active: Vec<usize> = aliased_design
            .iter()
            .enumerate()
            .filter(|(_, &a)| !a)
            .map(|(j, _)| j)
            .collect();
        let reduced = Mat::from_fn(n, active.len(), |i, j| design[(i, active[j])]);
        let xtx = reduced.transpose() * &reduced;
        let Ok(xtx_inv) = matrix_inverse_qr(&xtx) else {
            return;
        };

        // Scatter the covariance diagonal back to design positions
        let total = design.ncols();
        let mut se_design = Col::zeros(total);
        for j in 0..total {
            se_design[j] = f64::NAN;
        }
        for (r, &j) in active.iter().enumerate() {
            let var = result.sigma2 * xtx_inv[(r, r)];
            se_design[j] = if var >= 0.0 { var.sqrt() } else { f64::NAN };
        }

        let offset = usize::from(self.options.with_intercept);
        let p = result.coefficients.nrows();
        let se = Col::from_fn(p, |j| se_design[j + offset]);

        let stats = CoefficientInference::test_statistics(&result.coefficients, &se);
        let p_vals = CoefficientInference::p_values(&stats, InferenceKind::StudentT, df);
        let (ci_lower, ci_upper) = CoefficientInference::confidence_intervals(
            &result.coefficients,
            &se,
            InferenceKind::StudentT,
            df,
            self.options.confidence_level,
        );

        result.std_errors = Some(se);
        result.test_statistics = Some(stats);
        result.p_values = Some(p_vals);
        result.conf_interval_lower = Some(ci_lower);
        result.conf_interval_upper = Some(ci_upper);

        if let Some(intercept) = result.intercept {
            let se_int = se_design[0];
            if se_int.is_finite() && se_int > 0.0 {
                let t_int = intercept / se_int;
                let p_int = CoefficientInference::p_value(t_int, InferenceKind::StudentT, df);
                let crit = CoefficientInference::critical_value(
                    InferenceKind::StudentT,
                    df,
                    self.options.confidence_level,
                );
                result.intercept_std_error = Some(se_int);
                result.intercept_statistic = Some(t_int);
                result.intercept_p_value = Some(p_int);
                result.intercept_conf_interval =
                    Some((intercept - crit * se_int, intercept + crit * se_int));
            }
        }
    }
}

/// A fitted OLS model.
#[derive(Debug, Clone)]
pub struct FittedOls {
    options: RegressionOptions,
    result: RegressionResult,
}

impl FittedOls {
    /// Options used to fit this model.
    pub fn options(&self) -> &RegressionOptions {
        &self.options
    }

    /// Predictions on new data.
    pub fn predict(&self, x: &Mat<f64>) -> Col<f64> {
        let n = x.nrows();
        let p = x.ncols().min(self.result.coefficients.nrows());
        let intercept = self.result.intercept.unwrap_or(0.0);

        Col::from_fn(n, |i| {
            let mut pred = intercept;
            for j in 0..p {
                if !self.result.aliased[j] && !self.result.coefficients[j].is_nan() {
                    pred += x[(i, j)] * self.result.coefficients[j];
                }
            }
            pred
        })
    }
}

impl FittedRegressor for FittedOls {
    fn result(&self) -> &RegressionResult {
        &self.result
    }
}

/// Builder for `OlsRegressor`.
#[derive(Debug, Clone, Default)]
pub struct OlsRegressorBuilder {
    builder: RegressionOptionsBuilder,
}

impl OlsRegressorBuilder {
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

    /// Set the rank tolerance for QR decomposition.
    pub fn rank_tolerance(mut self, tol: f64) -> Self {
        self.builder = self.builder.rank_tolerance(tol);
        self
    }

    /// Build the OLS estimator.
    pub fn build(self) -> OlsRegressor {
        OlsRegressor::with_options(self.builder.build_unchecked())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_fit() {
        let x = Mat::from_fn(5, 1, |i, _| i as f64);
        let y = Col::from_fn(5, |i| 2.0 + 3.0 * i as f64);

        let model = OlsRegressor::builder().with_intercept(true).build();
        let fitted = model.fit(&x, &y).expect("model should fit");

        assert!((fitted.coefficients()[0] - 3.0).abs() < 1e-10);
        assert!((fitted.intercept().expect("intercept exists") - 2.0).abs() < 1e-10);
    }

    #[test]
    fn test_predict() {
        let x = Mat::from_fn(5, 1, |i, _| i as f64);
        let y = Col::from_fn(5, |i| 2.0 + 3.0 * i as f64);

        let model = OlsRegressor::builder().with_intercept(true).build();
        let fitted = model.fit(&x, &y).expect("model should fit");

        let x_new = Mat::from_fn(2, 1, |i, _| (i + 10) as f64);
        let preds = fitted.predict(&x_new);

        assert!((preds[0] - 32.0).abs() < 1e-10);
        assert!((preds[1] - 35.0).abs() < 1e-10);
    }

    #[test]
    fn test_rejects_non_finite() {
        let x = Mat::from_fn(5, 1, |i, _| i as f64);
        let mut y = Col::from_fn(5, |i| i as f64);
        y[2] = f64::NAN;

        let model = OlsRegressor::builder().build();
        assert!(matches!(
            model.fit(&x, &y),
            Err(RegressionError::NonFiniteData)
        ));
    }
}
