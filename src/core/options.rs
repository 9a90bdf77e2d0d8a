//! Estimator options and configuration.

use thiserror::Error;

/// Configuration shared by the regression estimators.
#[derive(Debug, Clone)]
pub struct RegressionOptions {
    /// Whether to include an intercept term (default: true).
    pub with_intercept: bool,
    /// Whether to compute standard errors and inference statistics (default: true).
    pub compute_inference: bool,
    /// Confidence level for confidence intervals (default: 0.95).
    pub confidence_level: f64,
    /// Rank tolerance for QR decomposition.
    pub rank_tolerance: f64,
    /// Highest spatial-lag order used when building instruments for the
    /// generalized-moments lag estimator (default: 2, i.e. WX and W²X).
    pub instrument_lags: usize,
    /// Search interval for the autoregressive coefficient in the maximum
    /// likelihood estimators. Must lie inside (-1, 1) for row-standardized
    /// weights.
    pub search_bounds: (f64, f64),
    /// Interval tolerance for the golden-section search.
    pub search_tolerance: f64,
    /// Iteration cap for the golden-section search.
    pub max_iterations: usize,
}

impl Default for RegressionOptions {
    fn default() -> Self {
        Self {
            with_intercept: true,
            compute_inference: true,
            confidence_level: 0.95,
            rank_tolerance: 1e-10,
            instrument_lags: 2,
            search_bounds: (-0.99, 0.99),
            search_tolerance: 1e-8,
            max_iterations: 200,
        }
    }
}

/// Errors from validating estimator options.
#[derive(Debug, Error)]
pub enum OptionsError {
    #[error("confidence_level must be in (0, 1), got {0}")]
    InvalidConfidenceLevel(f64),
    #[error("rank_tolerance must be positive, got {0}")]
    InvalidRankTolerance(f64),
    #[error("instrument_lags must be at least 1, got {0}")]
    InvalidInstrumentLags(usize),
    #[error("search bounds must satisfy -1 < lower < upper < 1, got ({0}, {1})")]
    InvalidSearchBounds(f64, f64),
    #[error("search_tolerance must be positive, got {0}")]
    InvalidSearchTolerance(f64),
    #[error("max_iterations must be at least 1, got {0}")]
    InvalidMaxIterations(usize),
}

impl RegressionOptions {
    /// Create a new builder.
    pub fn builder() -> RegressionOptionsBuilder {
        RegressionOptionsBuilder::default()
    }

    /// Validate option values.
    pub fn validate(&self) -> Result<(), OptionsError> {
        if !(self.confidence_level > 0.0 && self.confidence_level < 1.0) {
            return Err(OptionsError::InvalidConfidenceLevel(self.confidence_level));
        }
        if !(self.rank_tolerance > 0.0) {
            return Err(OptionsError::InvalidRankTolerance(self.rank_tolerance));
        }
        if self.instrument_lags < 1 {
            return Err(OptionsError::InvalidInstrumentLags(self.instrument_lags));
        }
        let (lo, hi) = self.search_bounds;
        if !(lo > -1.0 && lo < hi && hi < 1.0) {
            return Err(OptionsError::InvalidSearchBounds(lo, hi));
        }
        if !(self.search_tolerance > 0.0) {
            return Err(OptionsError::InvalidSearchTolerance(self.search_tolerance));
        }
        if self.max_iterations < 1 {
            return Err(OptionsError::InvalidMaxIterations(self.max_iterations));
        }
        Ok(())
    }
}

/// Builder for `RegressionOptions`.
#[derive(Debug, Clone, Default)]
pub struct RegressionOptionsBuilder {
    options: RegressionOptions,
}

impl RegressionOptionsBuilder {
    /// Set whether to include an intercept term.
    pub fn with_intercept(mut self, include: bool) -> Self {
        self.options.with_intercept = include;
        self
    }

    /// Set whether to compute inference statistics.
    pub fn compute_inference(mut self, compute: bool) -> Self {
        self.options.compute_inference = compute;
        self
    }

    /// Set the confidence level for confidence intervals.
    pub fn confidence_level(mut self, level: f64) -> Self {
        self.options.confidence_level = level;
        self
    }

    /// Set the rank tolerance for QR decomposition.
    pub fn rank_tolerance(mut self, tol: f64) -> Self {
        self.options.rank_tolerance = tol;
        self
    }

    /// Set the highest spatial-lag order for GM instruments.
    pub fn instrument_lags(mut self, lags: usize) -> Self {
        self.options.instrument_lags = lags;
        self
    }

    /// Set the autoregressive-coefficient search interval.
    pub fn search_bounds(mut self, lower: f64, upper: f64) -> Self {
        self.options.search_bounds = (lower, upper);
        self
    }

    /// Set the golden-section interval tolerance.
    pub fn search_tolerance(mut self, tol: f64) -> Self {
        self.options.search_tolerance = tol;
        self
    }

    /// Set the golden-section iteration cap.
    pub fn max_iterations(mut self, iterations: usize) -> Self {
        self.options.max_iterations = iterations;
        self
    }

    /// Validate and build the options.
    pub fn build(self) -> Result<RegressionOptions, OptionsError> {
        self.options.validate()?;
        Ok(self.options)
    }

    /// Build without validation.
    pub fn build_unchecked(self) -> RegressionOptions {
        self.options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options_validate() {
        assert!(RegressionOptions::default().validate().is_ok());
    }

    #[test]
    fn test_builder_rejects_bad_confidence() {
        let result = RegressionOptions::builder().confidence_level(1.5).build();
        assert!(matches!(
            result,
            Err(OptionsError::InvalidConfidenceLevel(_))
        ));
    }

    #[test]
    fn test_builder_rejects_bad_bounds() {
        let result = RegressionOptions::builder().search_bounds(0.5, -0.5).build();
        assert!(matches!(result, Err(OptionsError::InvalidSearchBounds(..))));
    }

    #[test]
    fn test_builder_sets_fields() {
        let options = RegressionOptions::builder()
            .with_intercept(false)
            .instrument_lags(3)
            .build()
            .expect("valid options");
        assert!(!options.with_intercept);
        assert_eq!(options.instrument_lags, 3);
    }
}
