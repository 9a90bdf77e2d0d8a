//! Core traits for the regression estimators.

use crate::core::{OptionsError, RegressionResult};
use crate::weights::WeightsError;
use faer::{Col, Mat};
use thiserror::Error;

/// Errors that can occur during estimation.
#[derive(Debug, Error)]
pub enum RegressionError {
    #[error("dimension mismatch: X has {x_rows} rows but y has {y_len} elements")]
    DimensionMismatch { x_rows: usize, y_len: usize },

    #[error("insufficient observations: need at least {needed}, got {got}")]
    InsufficientObservations { needed: usize, got: usize },

    #[error("input contains non-finite values")]
    NonFiniteData,

    #[error("design matrix is singular or nearly singular")]
    SingularMatrix,

    #[error("{endogenous} endogenous variables but only {instruments} instruments")]
    InsufficientInstruments {
        endogenous: usize,
        instruments: usize,
    },

    #[error("likelihood search failed to converge after {iterations} iterations")]
    ConvergenceFailed { iterations: usize },

    #[error("invalid options: {0}")]
    InvalidOptions(#[from] OptionsError),

    #[error("invalid weights: {0}")]
    InvalidWeights(#[from] WeightsError),

    #[error("numerical error: {0}")]
    NumericalError(String),
}

/// An estimator that can be fit to a design matrix and response.
///
/// Estimators that need more inputs than (X, y), such as two-stage least
/// squares with explicit instruments, expose an inherent `fit` instead.
pub trait Regressor {
    /// The type of the fitted model.
    type Fitted: FittedRegressor;

    /// Fit the model.
    ///
    /// # Arguments
    /// * `x` - Design matrix of shape (n_samples, n_features), without a
    ///   constant column; the intercept is controlled by the options
    /// * `y` - Response vector of length n_samples
    fn fit(&self, x: &Mat<f64>, y: &Col<f64>) -> Result<Self::Fitted, RegressionError>;
}

/// A fitted model exposing its estimation results.
pub trait FittedRegressor {
    /// Access the full result (coefficients, statistics, inference).
    fn result(&self) -> &RegressionResult;

    /// Coefficients of the exogenous regressors (convenience method).
    fn coefficients(&self) -> &Col<f64> {
        &self.result().coefficients
    }

    /// Intercept, if the model was fit with one.
    fn intercept(&self) -> Option<f64> {
        self.result().intercept
    }

    /// Spatial autoregressive coefficient (rho or lambda), if any.
    fn spatial_coefficient(&self) -> Option<f64> {
        self.result().spatial_coefficient
    }

    /// R² (pseudo-R² for the spatial estimators).
    fn r_squared(&self) -> f64 {
        self.result().r_squared
    }

    /// Log-likelihood of the fit.
    fn log_likelihood(&self) -> f64 {
        self.result().log_likelihood
    }
}
