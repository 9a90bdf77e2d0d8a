//! Integration tests for the regression diagnostics battery.

mod common;

use common::*;
use faer::{Col, Mat};
use spatialstats::prelude::*;

#[test]
fn test_jarque_bera_on_clean_fit() {
    let (x, y, _) = generate_linear_data(200, 2, 1.0, 0.1, 19);
    let fitted = OlsRegressor::new().fit(&x, &y).expect("fit succeeds");

    let jb = jarque_bera(fitted.result());
    assert!(jb.statistic >= 0.0);
    assert_eq!(jb.df, 2.0);
    // Uniform-ish noise is not normal but also not wildly skewed
    assert!(jb.p_value >= 0.0 && jb.p_value <= 1.0);
}

#[test]
fn test_breusch_pagan_homoskedastic() {
    let (x, y, _) = generate_linear_data(200, 2, 1.0, 0.5, 37);
    let fitted = OlsRegressor::new().fit(&x, &y).expect("fit succeeds");

    let bp = breusch_pagan(&x, fitted.result(), false);
    let kb = koenker_bassett(&x, fitted.result());
    assert_eq!(bp.df, 2.0);
    // No heteroskedasticity built in: tests should not reject strongly
    assert!(bp.p_value > 0.01);
    assert!(kb.p_value > 0.01);
}

#[test]
fn test_breusch_pagan_heteroskedastic() {
    let n = 200;
    let mut rng_state = 5u64;
    let x = Mat::from_fn(n, 1, |i, _| (i + 1) as f64 / 10.0);
    let y = Col::from_fn(n, |i| {
        2.0 + 1.0 * x[(i, 0)] + x[(i, 0)] * next_rand(&mut rng_state)
    });
    let fitted = OlsRegressor::new().fit(&x, &y).expect("fit succeeds");

    let kb = koenker_bassett(&x, fitted.result());
    assert!(kb.p_value < 0.05);
}

#[test]
fn test_white_test_df() {
    let (x, y, _) = generate_linear_data(150, 2, 0.0, 0.3, 83);
    let fitted = OlsRegressor::new().fit(&x, &y).expect("fit succeeds");

    // Two regressors: 2 levels + 2 squares + 1 cross product
    let w = white(&x, fitted.result());
    assert_eq!(w.df, 5.0);
    assert!(w.statistic >= 0.0);
}

#[test]
fn test_condition_index_and_vif() {
    let n = 100;
    let mut rng_state = 9u64;
    let mut x = Mat::zeros(n, 3);
    for i in 0..n {
        x[(i, 0)] = next_rand(&mut rng_state);
        x[(i, 1)] = next_rand(&mut rng_state);
        // Third column nearly a combination of the first two
        x[(i, 2)] = x[(i, 0)] + x[(i, 1)] + 0.001 * next_rand(&mut rng_state);
    }

    let ci = condition_index(&x, true);
    assert!(ci > 30.0);

    let vifs = variance_inflation_factors(&x, 1e-10);
    assert_eq!(vifs.len(), 3);
    assert!(vifs[2] > 100.0);
}

#[test]
fn test_morans_i_detects_lag_residuals() {
    // Fit OLS to data with a true spatial lag: residuals stay correlated
    let (x, y, w) = generate_lag_data(10, 0.6, 1.0, 0.1, 47);
    let fitted = OlsRegressor::new().fit(&x, &y).expect("fit succeeds");

    let moran = morans_i_residuals(&x, fitted.result(), &w, true).expect("moran");
    assert!(moran.z_value > 2.0);
    assert!(moran.p_value < 0.05);
}

#[test]
fn test_lm_battery_prefers_lag() {
    let (x, y, w) = generate_lag_data(10, 0.6, 1.0, 0.1, 59);
    let fitted = OlsRegressor::new().fit(&x, &y).expect("fit succeeds");

    let lm = lm_tests(&x, &y, fitted.result(), &w, true).expect("lm tests");
    // True model is a lag: the lag test rejects
    assert!(lm.lm_lag.p_value < 0.05);
    assert!(lm.sarma.p_value < 0.05);
    assert!(lm.robust_lm_lag.statistic >= 0.0);
    assert!(lm.robust_lm_error.statistic >= 0.0);
}

#[test]
fn test_lm_battery_no_dependence() {
    let (x, y, _) = generate_linear_data(100, 1, 1.0, 0.3, 67);
    let w = lattice_weights(10);
    let fitted = OlsRegressor::new().fit(&x, &y).expect("fit succeeds");

    let lm = lm_tests(&x, &y, fitted.result(), &w, true).expect("lm tests");
    // Independent noise: no strong rejection expected
    assert!(lm.lm_error.p_value > 0.001);
    assert!(lm.lm_lag.p_value > 0.001);
}
