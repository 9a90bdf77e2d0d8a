//! Integration tests for ordinary least squares.

mod common;

use approx::assert_relative_eq;
use common::*;
use faer::{Col, Mat};
use spatialstats::prelude::*;

#[test]
fn test_ols_recovers_coefficients() {
    let (x, y, true_coefficients) = generate_linear_data(200, 3, 1.5, 0.01, 42);

    let fitted = OlsRegressor::new().fit(&x, &y).expect("fit succeeds");
    let result = fitted.result();

    for j in 0..3 {
        assert_relative_eq!(
            result.coefficients[j],
            true_coefficients[j],
            epsilon = 0.05
        );
    }
    assert_relative_eq!(result.intercept.expect("intercept"), 1.5, epsilon = 0.05);
    assert!(result.r_squared > 0.99);
}

#[test]
fn test_ols_without_intercept() {
    let (x, y, _) = generate_linear_data(100, 2, 0.0, 0.01, 7);

    let fitted = OlsRegressor::builder()
        .with_intercept(false)
        .build()
        .fit(&x, &y)
        .expect("fit succeeds");

    assert!(fitted.result().intercept.is_none());
    assert_relative_eq!(fitted.coefficients()[0], 1.0, epsilon = 0.05);
    assert_relative_eq!(fitted.coefficients()[1], 2.0, epsilon = 0.05);
}

#[test]
fn test_ols_collinear_column_aliased() {
    let n = 50;
    let mut x = Mat::zeros(n, 2);
    let mut y = Col::zeros(n);
    for i in 0..n {
        x[(i, 0)] = i as f64;
        x[(i, 1)] = 3.0 * i as f64;
        y[i] = 1.0 + 2.0 * x[(i, 0)];
    }

    let fitted = OlsRegressor::new().fit(&x, &y).expect("fit succeeds");
    let result = fitted.result();

    assert_eq!(result.aliased.iter().filter(|&&a| a).count(), 1);
    let aliased_idx = result.aliased.iter().position(|&a| a).expect("one aliased");
    assert!(result.coefficients[aliased_idx].is_nan());
}

#[test]
fn test_ols_inference_fields() {
    let (x, y, _) = generate_linear_data(120, 2, 0.5, 0.1, 99);

    let fitted = OlsRegressor::builder()
        .compute_inference(true)
        .confidence_level(0.95)
        .build()
        .fit(&x, &y)
        .expect("fit succeeds");
    let result = fitted.result();

    let se = result.std_errors.as_ref().expect("std errors");
    let stats = result.test_statistics.as_ref().expect("t statistics");
    let p = result.p_values.as_ref().expect("p values");
    let lo = result.conf_interval_lower.as_ref().expect("ci lower");
    let hi = result.conf_interval_upper.as_ref().expect("ci upper");

    for j in 0..2 {
        assert!(se[j] > 0.0);
        assert!(stats[j].is_finite());
        assert!(p[j] >= 0.0 && p[j] <= 1.0);
        assert!(lo[j] < result.coefficients[j]);
        assert!(hi[j] > result.coefficients[j]);
    }
    // Strong signal, tiny noise: coefficients clearly significant
    assert!(p[0] < 1e-6);
    assert!(result.f_statistic > 100.0);
}

#[test]
fn test_ols_predict() {
    let (x, y, _) = generate_linear_data(80, 2, 2.0, 0.01, 3);
    let fitted = OlsRegressor::new().fit(&x, &y).expect("fit succeeds");

    let predictions = fitted.predict(&x);
    for i in 0..x.nrows() {
        assert_relative_eq!(predictions[i], y[i], epsilon = 0.2);
    }
}

#[test]
fn test_ols_insufficient_observations() {
    let x = Mat::from_fn(2, 3, |i, j| (i + j) as f64);
    let y = Col::from_fn(2, |i| i as f64);

    assert!(matches!(
        OlsRegressor::new().fit(&x, &y),
        Err(RegressionError::InsufficientObservations { .. })
    ));
}

#[test]
fn test_ols_non_finite_data() {
    let mut x = Mat::from_fn(10, 1, |i, _| i as f64);
    let y = Col::from_fn(10, |i| i as f64);
    x[(3, 0)] = f64::NAN;

    assert!(matches!(
        OlsRegressor::new().fit(&x, &y),
        Err(RegressionError::NonFiniteData)
    ));
}
