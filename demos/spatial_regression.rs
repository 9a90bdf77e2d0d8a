//! Fit OLS on lattice data, run the spatial diagnostics battery, then
//! refit with the estimator the diagnostics point to.
//!
//! Run with: cargo run --example spatial_regression

use faer::{Col, Mat};
use spatialstats::prelude::*;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A 10x10 rook lattice with row-standardized weights
    let mut weights = SpatialWeights::lattice(10, 10, Contiguity::Rook)?;
    weights.row_standardize();
    let n = 100;

    // Synthetic response with a spatial lag: y = 0.5 Wy + 1 + 2x + e
    let mut state = 12345u64;
    let mut rand = move || {
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
        ((state >> 33) as f64) / (u32::MAX as f64) * 2.0 - 1.0
    };
    let x = Mat::from_fn(n, 1, |_, _| rand() * 4.0);
    let signal = Col::from_fn(n, |i| 1.0 + 2.0 * x[(i, 0)] + 0.2 * rand());
    let mut y = signal.clone();
    for _ in 0..200 {
        let wy = weights.lag(&y)?;
        for i in 0..n {
            y[i] = signal[i] + 0.5 * wy[i];
        }
    }

    // Start from OLS
    let ols = OlsRegressor::new().fit(&x, &y)?;
    let result = ols.result();
    println!("OLS: beta = {:.4}, R² = {:.4}", result.coefficients[0], result.r_squared);

    // Residual diagnostics
    let jb = jarque_bera(result);
    println!("Jarque-Bera: {:.4} (p = {:.4})", jb.statistic, jb.p_value);
    let bp = breusch_pagan(&x, result, false);
    println!("Breusch-Pagan: {:.4} (p = {:.4})", bp.statistic, bp.p_value);

    // Spatial dependence diagnostics
    let moran = morans_i_residuals(&x, result, &weights, true)?;
    println!("Moran's I on residuals: {:.4} (z = {:.2})", moran.i, moran.z_value);
    let lm = lm_tests(&x, &y, result, &weights, true)?;
    println!("LM lag:   {:.4} (p = {:.4})", lm.lm_lag.statistic, lm.lm_lag.p_value);
    println!("LM error: {:.4} (p = {:.4})", lm.lm_error.statistic, lm.lm_error.p_value);

    // The lag test rejects: refit with the spatial lag estimators
    let ml = MlLagRegressor::new(weights.clone()).fit(&x, &y)?;
    println!(
        "ML lag: rho = {:.4} (se {:.4}), beta = {:.4}, AIC = {:.2}",
        ml.rho(),
        ml.result().spatial_std_error.unwrap_or(f64::NAN),
        ml.coefficients()[0],
        ml.result().aic,
    );

    let gm = GmLagRegressor::new(weights).fit(&x, &y)?;
    println!("GM lag: rho = {:.4}, beta = {:.4}", gm.rho(), gm.coefficients()[0]);

    Ok(())
}
