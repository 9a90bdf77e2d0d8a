//! Normality test on regression residuals.

use super::TestResult;
use crate::core::RegressionResult;
use statrs::distribution::{ChiSquared, ContinuousCDF};

/// Jarque-Bera test for normality of the residuals.
///
/// Combines skewness and excess kurtosis into a statistic that is
/// chi-squared with 2 degrees of freedom under the null of normality.
pub fn jarque_bera(result: &RegressionResult) -> TestResult {
    let e = &result.residuals;
    let n = e.nrows() as f64;

    let mean = e.iter().sum::<f64>() / n;
    let m2 = e.iter().map(|&v| (v - mean).powi(2)).sum::<f64>() / n;
    let m3 = e.iter().map(|&v| (v - mean).powi(3)).sum::<f64>() / n;
    let m4 = e.iter().map(|&v| (v - mean).powi(4)).sum::<f64>() / n;

    if m2 <= 0.0 {
        return TestResult {
            statistic: f64::NAN,
            df: 2.0,
            p_value: f64::NAN,
        };
    }

    let skewness = m3 / m2.powf(1.5);
    let kurtosis = m4 / (m2 * m2);
    let statistic = n / 6.0 * (skewness * skewness + (kurtosis - 3.0).powi(2) / 4.0);

    let p_value = match ChiSquared::new(2.0) {
        Ok(d) => 1.0 - d.cdf(statistic),
        Err(_) => f64::NAN,
    };

    TestResult {
        statistic,
        df: 2.0,
        p_value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solvers::{FittedRegressor, OlsRegressor, Regressor};
    use faer::{Col, Mat};

    #[test]
    fn test_jarque_bera_symmetric_residuals() {
        // Residuals that alternate in sign are symmetric: low JB statistic
        let n = 40;
        let x = Mat::from_fn(n, 1, |i, _| i as f64);
        let y = Col::from_fn(n, |i| {
            let noise = if i % 2 == 0 { 0.5 } else { -0.5 };
            1.0 + 2.0 * i as f64 + noise
        });

        let fitted = OlsRegressor::new().fit(&x, &y).expect("fit succeeds");
        let jb = jarque_bera(fitted.result());
        assert!(jb.statistic.is_finite());
        assert!(jb.p_value >= 0.0 && jb.p_value <= 1.0);
    }
}
