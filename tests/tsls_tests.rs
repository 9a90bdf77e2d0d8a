//! Integration tests for two-stage least squares.

mod common;

use approx::assert_relative_eq;
use common::*;
use faer::{Col, Mat};
use spatialstats::prelude::*;

#[test]
fn test_tsls_matches_ols_with_exogenous_instrument() {
    // When the "endogenous" variable is instrumented by itself, 2SLS
    // collapses to OLS
    let (x, y, _) = generate_linear_data(100, 1, 1.0, 0.05, 11);
    let mut rng_state = 77u64;
    let yend = Mat::from_fn(100, 1, |i, _| x[(i, 0)] + 0.5 * next_rand(&mut rng_state));
    let q = yend.clone();

    let mut full_x = Mat::zeros(100, 2);
    for i in 0..100 {
        full_x[(i, 0)] = x[(i, 0)];
        full_x[(i, 1)] = yend[(i, 0)];
    }
    let ols = OlsRegressor::new().fit(&full_x, &y).expect("ols fit");
    let tsls = TslsRegressor::new(RegressionOptions::default())
        .fit(&x, &y, &yend, &q)
        .expect("tsls fit");

    assert_relative_eq!(
        tsls.coefficients()[0],
        ols.coefficients()[0],
        epsilon = 1e-8
    );
    assert_relative_eq!(
        tsls.endogenous_coefficient(0),
        ols.coefficients()[1],
        epsilon = 1e-8
    );
}

#[test]
fn test_tsls_order_condition() {
    let (x, y, _) = generate_linear_data(50, 1, 0.0, 0.1, 5);
    let yend = Mat::from_fn(50, 2, |i, j| x[(i, 0)] * (j + 1) as f64);
    let q = Mat::from_fn(50, 1, |i, _| x[(i, 0)].powi(2));

    assert!(matches!(
        TslsRegressor::new(RegressionOptions::default()).fit(&x, &y, &yend, &q),
        Err(RegressionError::InsufficientInstruments { .. })
    ));
}

#[test]
fn test_tsls_inference_uses_normal() {
    let (x, y, _) = generate_linear_data(150, 1, 1.0, 0.1, 23);
    let mut rng_state = 31u64;
    let yend = Mat::from_fn(150, 1, |i, _| {
        y[i] * 0.1 + next_rand(&mut rng_state)
    });
    let q = Mat::from_fn(150, 1, |i, _| x[(i, 0)].powi(2));

    let fitted = TslsRegressor::builder()
        .compute_inference(true)
        .build()
        .fit(&x, &y, &yend, &q)
        .expect("tsls fit");
    let result = fitted.result();

    assert_eq!(result.inference_kind, InferenceKind::Normal);
    assert!(result.std_errors.is_some());
    assert!(result.r_squared.is_finite());
}

#[test]
fn test_tsls_predict_shape() {
    let (x, y, _) = generate_linear_data(60, 1, 0.5, 0.05, 13);
    let mut rng_state = 3u64;
    let yend = Mat::from_fn(60, 1, |i, _| x[(i, 0)] + 0.1 * next_rand(&mut rng_state));
    let q = yend.clone();

    let fitted = TslsRegressor::new(RegressionOptions::default())
        .fit(&x, &y, &yend, &q)
        .expect("tsls fit");
    let predictions = fitted.predict(&x, &yend);
    assert_eq!(predictions.nrows(), 60);
    let residual: f64 = (0..60).map(|i| (predictions[i] - y[i]).powi(2)).sum();
    assert!(residual / 60.0 < 0.1);
}

#[test]
fn test_tsls_dimension_mismatch() {
    let x = Mat::from_fn(20, 1, |i, _| i as f64);
    let y = Col::from_fn(15, |i| i as f64);
    let yend = Mat::from_fn(20, 1, |i, _| i as f64);
    let q = yend.clone();

    assert!(matches!(
        TslsRegressor::new(RegressionOptions::default()).fit(&x, &y, &yend, &q),
        Err(RegressionError::DimensionMismatch { .. })
    ));
}
