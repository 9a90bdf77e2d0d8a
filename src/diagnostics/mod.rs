//! Regression diagnostics.
//!
//! Normality and heteroskedasticity tests on residuals, multicollinearity
//! measures on the design matrix, and spatial dependence diagnostics
//! (Moran's I on residuals and the Lagrange multiplier battery).

mod collinearity;
mod heteroskedasticity;
mod normality;
mod spatial;

pub use collinearity::{condition_index, variance_inflation_factors};
pub use heteroskedasticity::{breusch_pagan, koenker_bassett, white};
pub use normality::jarque_bera;
pub use spatial::{lm_tests, morans_i_residuals, LmTests, MoranResult};

/// A scalar test with its reference distribution's degrees of freedom.
#[derive(Debug, Clone, Copy)]
pub struct TestResult {
    /// The test statistic.
    pub statistic: f64,
    /// Degrees of freedom of the reference chi-squared distribution.
    pub df: f64,
    /// Upper-tail p-value.
    pub p_value: f64,
}
