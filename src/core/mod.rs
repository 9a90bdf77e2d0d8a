//! Core types for the regression estimators.

mod options;
mod result;

pub use options::{OptionsError, RegressionOptions, RegressionOptionsBuilder};
pub use result::{InferenceKind, RegressionResult};
