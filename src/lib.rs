//! Spatial statistics: regression with spatial diagnostics and choropleth
//! map classification.
//!
//! The regression side provides OLS and two-stage least squares along with
//! spatial lag and spatial error estimators driven by a spatial weights
//! structure, with full inference (standard errors, test statistics,
//! p-values, confidence intervals) and a diagnostics battery (normality,
//! heteroskedasticity, multicollinearity, spatial dependence).
//!
//! The classification side provides the common choropleth schemes
//! (quantiles, equal interval, Fisher-Jenks, natural breaks, box plot and
//! friends) behind a single [`Scheme`] trait, plus goodness-of-fit
//! measures and an automatic search over schemes and class counts.
//!
//! # Example
//!
//! ```rust,ignore
//! use spatialstats::prelude::*;
//!
//! // Fit a spatial lag model by maximum likelihood
//! let mut weights = SpatialWeights::lattice(10, 10, Contiguity::Queen)?;
//! weights.row_standardize();
//! let fitted = MlLagRegressor::new(weights).fit(&x, &y)?;
//! println!("rho = {}", fitted.rho());
//!
//! // Classify a variable for mapping
//! let classes = FisherJenks::new(5).classify(&values)?;
//! println!("bins = {:?}", classes.bins());
//! ```
//!
//! [`Scheme`]: crate::classify::Scheme

pub mod classify;
pub mod core;
pub mod diagnostics;
pub mod inference;
pub mod solvers;
pub mod utils;
pub mod weights;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::classify::{
        BoxPlot, Classification, ClassifyError, EqualInterval, FisherJenks, HeadTailBreaks,
        JenksCaspall, KClassifiers, MaxP, MaximumBreaks, NaturalBreaks, Percentiles, Quantiles,
        Scheme, StdMean, UserDefined,
    };
    pub use crate::core::{
        InferenceKind, RegressionOptions, RegressionOptionsBuilder, RegressionResult,
    };
    pub use crate::diagnostics::{
        breusch_pagan, condition_index, jarque_bera, koenker_bassett, lm_tests,
        morans_i_residuals, variance_inflation_factors, white, LmTests, MoranResult, TestResult,
    };
    pub use crate::solvers::{
        FittedGmLag, FittedMlError, FittedMlLag, FittedOls, FittedRegressor, FittedTsls,
        GmLagRegressor, MlErrorRegressor, MlLagRegressor, OlsRegressor, RegressionError,
        Regressor, TslsRegressor,
    };
    pub use crate::weights::{Contiguity, SpatialWeights, WeightsError};
}

pub use crate::classify::{Classification, ClassifyError, Scheme};
pub use crate::core::{RegressionOptions, RegressionOptionsBuilder, RegressionResult};
pub use crate::solvers::{FittedRegressor, RegressionError, Regressor};
pub use crate::weights::{Contiguity, SpatialWeights, WeightsError};
