//! Regression estimators.
//!
//! OLS and two-stage least squares for aspatial models, plus spatial lag
//! and spatial error estimators that take a [`SpatialWeights`] structure.
//!
//! [`SpatialWeights`]: crate::weights::SpatialWeights

mod error;
mod lag;
mod ols;
mod search;
mod traits;
mod tsls;

pub use error::{FittedMlError, MlErrorRegressor, MlErrorRegressorBuilder};
pub use lag::{FittedGmLag, FittedMlLag, GmLagRegressor, GmLagRegressorBuilder, MlLagRegressor};
pub use ols::{FittedOls, OlsRegressor, OlsRegressorBuilder};
pub use traits::{FittedRegressor, RegressionError, Regressor};
pub use tsls::{FittedTsls, TslsRegressor, TslsRegressorBuilder};
