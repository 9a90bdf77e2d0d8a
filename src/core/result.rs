//! Regression result structures.

use faer::Col;

/// Sampling distribution used for coefficient tests.
///
/// OLS reports Student-t statistics on the residual degrees of freedom; the
/// instrumental-variable and maximum likelihood estimators report asymptotic
/// z statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InferenceKind {
    #[default]
    StudentT,
    Normal,
}

/// Complete result from a regression fit.
#[derive(Debug, Clone)]
pub struct RegressionResult {
    // ========== Core Results ==========
    /// Estimated coefficients (excluding intercept and any spatial
    /// autoregressive coefficient). Aliased coefficients are NaN.
    pub coefficients: Col<f64>,

    /// Intercept term (if the model was fit with an intercept).
    pub intercept: Option<f64>,

    /// Spatial autoregressive coefficient: rho for lag models, lambda for
    /// error models. None for non-spatial fits.
    pub spatial_coefficient: Option<f64>,

    /// Residuals (y - fitted_values).
    pub residuals: Col<f64>,

    /// Fitted values on the training data.
    pub fitted_values: Col<f64>,

    // ========== Rank Information ==========
    /// Numerical rank of the design matrix.
    pub rank: usize,

    /// Number of estimated parameters, including intercept and spatial
    /// coefficient where present.
    pub n_parameters: usize,

    /// Number of observations.
    pub n_observations: usize,

    /// Which coefficients are aliased (perfectly collinear).
    pub aliased: Vec<bool>,

    /// Tolerance used for rank determination.
    pub rank_tolerance: f64,

    // ========== Fit Statistics ==========
    /// R² for OLS; pseudo-R² (squared correlation between y and fitted
    /// values) for the spatial estimators.
    pub r_squared: f64,

    /// Adjusted R² (NaN where it does not apply).
    pub adj_r_squared: f64,

    /// Error variance estimate.
    pub sigma2: f64,

    /// F-statistic for overall significance (OLS only, NaN otherwise).
    pub f_statistic: f64,

    /// P-value for the F-statistic.
    pub f_pvalue: f64,

    /// Log-likelihood (Gaussian for OLS, profile likelihood at the optimum
    /// for the ML estimators; NaN for GM fits).
    pub log_likelihood: f64,

    /// Akaike Information Criterion.
    pub aic: f64,

    /// Bayesian Information Criterion.
    pub bic: f64,

    // ========== Inference Statistics (Optional) ==========
    /// Distribution used for the coefficient tests below.
    pub inference_kind: InferenceKind,

    /// Standard errors of coefficients.
    pub std_errors: Option<Col<f64>>,

    /// Standard error of the intercept.
    pub intercept_std_error: Option<f64>,

    /// Standard error of the spatial coefficient.
    pub spatial_std_error: Option<f64>,

    /// t (or z) statistics for coefficients.
    pub test_statistics: Option<Col<f64>>,

    /// t (or z) statistic for the intercept.
    pub intercept_statistic: Option<f64>,

    /// z statistic for the spatial coefficient.
    pub spatial_statistic: Option<f64>,

    /// P-values for coefficient significance tests.
    pub p_values: Option<Col<f64>>,

    /// P-value for the intercept.
    pub intercept_p_value: Option<f64>,

    /// P-value for the spatial coefficient.
    pub spatial_p_value: Option<f64>,

    /// Lower bounds of coefficient confidence intervals.
    pub conf_interval_lower: Option<Col<f64>>,

    /// Upper bounds of coefficient confidence intervals.
    pub conf_interval_upper: Option<Col<f64>>,

    /// Intercept confidence interval (lower, upper).
    pub intercept_conf_interval: Option<(f64, f64)>,

    /// Confidence level used for intervals.
    pub confidence_level: f64,
}

impl RegressionResult {
    /// Create a new empty result (used internally by solvers).
    pub(crate) fn empty(n_features: usize, n_observations: usize) -> Self {
        Self {
            coefficients: Col::zeros(n_features),
            intercept: None,
            spatial_coefficient: None,
            residuals: Col::zeros(n_observations),
            fitted_values: Col::zeros(n_observations),
            rank: 0,
            n_parameters: 0,
            n_observations,
            aliased: vec![false; n_features],
            rank_tolerance: 1e-10,
            r_squared: f64::NAN,
            adj_r_squared: f64::NAN,
            sigma2: f64::NAN,
            f_statistic: f64::NAN,
            f_pvalue: f64::NAN,
            log_likelihood: f64::NAN,
            aic: f64::NAN,
            bic: f64::NAN,
            inference_kind: InferenceKind::StudentT,
            std_errors: None,
            intercept_std_error: None,
            spatial_std_error: None,
            test_statistics: None,
            intercept_statistic: None,
            spatial_statistic: None,
            p_values: None,
            intercept_p_value: None,
            spatial_p_value: None,
            conf_interval_lower: None,
            conf_interval_upper: None,
            intercept_conf_interval: None,
            confidence_level: 0.95,
        }
    }

    /// Residual degrees of freedom (n - p).
    pub fn residual_df(&self) -> usize {
        self.n_observations.saturating_sub(self.n_parameters)
    }

    /// Model degrees of freedom (p - 1 with an intercept, else p).
    pub fn model_df(&self) -> usize {
        if self.intercept.is_some() {
            self.n_parameters.saturating_sub(1)
        } else {
            self.n_parameters
        }
    }

    /// Count of non-aliased coefficients.
    pub fn n_active_coefficients(&self) -> usize {
        self.aliased.iter().filter(|&&a| !a).count()
    }

    /// Check if any coefficients are aliased.
    pub fn has_aliased(&self) -> bool {
        self.aliased.iter().any(|&a| a)
    }

    /// Coefficient value, None for aliased or out-of-range indices.
    pub fn get_coefficient(&self, index: usize) -> Option<f64> {
        if index < self.coefficients.nrows() && !self.aliased[index] {
            Some(self.coefficients[index])
        } else {
            None
        }
    }

    /// Residual sum of squares.
    pub fn rss(&self) -> f64 {
        self.residuals.iter().map(|&r| r.powi(2)).sum()
    }

    /// Total sum of squares of the response.
    pub fn tss(&self) -> f64 {
        let n = self.n_observations as f64;
        let y_mean = self
            .residuals
            .iter()
            .zip(self.fitted_values.iter())
            .map(|(&r, &f)| r + f)
            .sum::<f64>()
            / n;
        self.residuals
            .iter()
            .zip(self.fitted_values.iter())
            .map(|(&r, &f)| (r + f - y_mean).powi(2))
            .sum()
    }

    /// Explained sum of squares (TSS - RSS).
    pub fn ess(&self) -> f64 {
        self.tss() - self.rss()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_result() {
        let result = RegressionResult::empty(3, 10);
        assert_eq!(result.coefficients.nrows(), 3);
        assert_eq!(result.n_observations, 10);
        assert_eq!(result.residual_df(), 10);
        assert!(result.spatial_coefficient.is_none());
    }

    #[test]
    fn test_degrees_of_freedom() {
        let mut result = RegressionResult::empty(3, 100);
        result.n_parameters = 4;
        result.intercept = Some(1.0);

        assert_eq!(result.residual_df(), 96);
        assert_eq!(result.model_df(), 3);
    }

    #[test]
    fn test_aliased_accounting() {
        let mut result = RegressionResult::empty(3, 10);
        assert!(!result.has_aliased());

        result.aliased[1] = true;
        assert!(result.has_aliased());
        assert_eq!(result.n_active_coefficients(), 2);
        assert_eq!(result.get_coefficient(1), None);
    }

    #[test]
    fn test_sums_of_squares() {
        let mut result = RegressionResult::empty(1, 4);
        // y = [1, 2, 3, 4] fitted perfectly except a 0.1 miss on the last
        result.fitted_values = Col::from_fn(4, |i| (i + 1) as f64);
        result.residuals = Col::from_fn(4, |i| if i == 3 { 0.1 } else { 0.0 });

        assert!((result.rss() - 0.01).abs() < 1e-12);
        assert!(result.tss() > result.rss());
        assert!((result.ess() - (result.tss() - result.rss())).abs() < 1e-12);
    }
}
