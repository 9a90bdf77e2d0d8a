//! Coefficient inference calculations.

use crate::core::InferenceKind;
use faer::{Col, Mat};
use statrs::distribution::{ContinuousCDF, Normal, StudentsT};

/// Computes inference statistics for regression coefficients.
pub struct CoefficientInference;

impl CoefficientInference {
    /// Standard errors from the diagonal of a parameter covariance matrix.
    ///
    /// `covariance` is ordered like the design matrix; aliased positions get
    /// NaN.
    pub fn standard_errors(covariance: &Mat<f64>, aliased: &[bool]) -> Col<f64> {
        let p = covariance.nrows();
        let mut se = Col::zeros(p);
        for j in 0..p {
            if aliased.get(j).copied().unwrap_or(false) {
                se[j] = f64::NAN;
            } else {
                let var = covariance[(j, j)];
                se[j] = if var >= 0.0 { var.sqrt() } else { f64::NAN };
            }
        }
        se
    }

    /// Test statistics: coefficient over its standard error.
    pub fn test_statistics(coefficients: &Col<f64>, std_errors: &Col<f64>) -> Col<f64> {
        let p = coefficients.nrows();
        let mut stats = Col::zeros(p);
        for j in 0..p {
            if std_errors[j].is_nan() || std_errors[j] == 0.0 {
                stats[j] = f64::NAN;
            } else {
                stats[j] = coefficients[j] / std_errors[j];
            }
        }
        stats
    }

    /// Two-tailed p-values under the given sampling distribution.
    ///
    /// `df` is only consulted for Student-t inference.
    pub fn p_values(statistics: &Col<f64>, kind: InferenceKind, df: f64) -> Col<f64> {
        let p = statistics.nrows();
        let mut p_vals = Col::zeros(p);
        for j in 0..p {
            p_vals[j] = Self::p_value(statistics[j], kind, df);
        }
        p_vals
    }

    /// Two-tailed p-value for a single statistic.
    pub fn p_value(statistic: f64, kind: InferenceKind, df: f64) -> f64 {
        if !statistic.is_finite() {
            return f64::NAN;
        }
        match kind {
            InferenceKind::StudentT => {
                if df <= 0.0 {
                    return f64::NAN;
                }
                match StudentsT::new(0.0, 1.0, df) {
                    Ok(d) => 2.0 * (1.0 - d.cdf(statistic.abs())),
                    Err(_) => f64::NAN,
                }
            }
            InferenceKind::Normal => match Normal::new(0.0, 1.0) {
                Ok(d) => 2.0 * (1.0 - d.cdf(statistic.abs())),
                Err(_) => f64::NAN,
            },
        }
    }

    /// Critical value for a two-sided interval at the given confidence level.
    pub fn critical_value(kind: InferenceKind, df: f64, confidence_level: f64) -> f64 {
        let upper = 1.0 - (1.0 - confidence_level) / 2.0;
        match kind {
            InferenceKind::StudentT => {
                if df <= 0.0 {
                    return f64::NAN;
                }
                match StudentsT::new(0.0, 1.0, df) {
                    Ok(d) => d.inverse_cdf(upper),
                    Err(_) => f64::NAN,
                }
            }
            InferenceKind::Normal => match Normal::new(0.0, 1.0) {
                Ok(d) => d.inverse_cdf(upper),
                Err(_) => f64::NAN,
            },
        }
    }

    /// Confidence intervals for all coefficients.
    pub fn confidence_intervals(
        coefficients: &Col<f64>,
        std_errors: &Col<f64>,
        kind: InferenceKind,
        df: f64,
        confidence_level: f64,
    ) -> (Col<f64>, Col<f64>) {
        let p = coefficients.nrows();
        let mut lower = Col::zeros(p);
        let mut upper = Col::zeros(p);
        let crit = Self::critical_value(kind, df, confidence_level);

        for j in 0..p {
            if std_errors[j].is_nan() || !crit.is_finite() {
                lower[j] = f64::NAN;
                upper[j] = f64::NAN;
            } else {
                let margin = crit * std_errors[j];
                lower[j] = coefficients[j] - margin;
                upper[j] = coefficients[j] + margin;
            }
        }

        (lower, upper)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_errors_skip_aliased() {
        let mut cov = Mat::zeros(2, 2);
        cov[(0, 0)] = 4.0;
        cov[(1, 1)] = 9.0;

        let se = CoefficientInference::standard_errors(&cov, &[false, true]);
        assert!((se[0] - 2.0).abs() < 1e-12);
        assert!(se[1].is_nan());
    }

    #[test]
    fn test_test_statistics() {
        let coef = Col::from_fn(2, |i| (i + 1) as f64 * 2.0);
        let se = Col::from_fn(2, |_| 2.0);
        let stats = CoefficientInference::test_statistics(&coef, &se);
        assert!((stats[0] - 1.0).abs() < 1e-12);
        assert!((stats[1] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_normal_p_value_two_tailed() {
        // z = 1.96 has a two-tailed p of about 0.05
        let p = CoefficientInference::p_value(1.96, InferenceKind::Normal, 0.0);
        assert!((p - 0.05).abs() < 1e-3);
    }

    #[test]
    fn test_t_critical_wider_than_z() {
        let t = CoefficientInference::critical_value(InferenceKind::StudentT, 5.0, 0.95);
        let z = CoefficientInference::critical_value(InferenceKind::Normal, 0.0, 0.95);
        assert!(t > z);
    }

    #[test]
    fn test_confidence_intervals_symmetric() {
        let coef = Col::from_fn(1, |_| 3.0);
        let se = Col::from_fn(1, |_| 1.0);
        let (lo, hi) = CoefficientInference::confidence_intervals(
            &coef,
            &se,
            InferenceKind::Normal,
            0.0,
            0.95,
        );
        assert!(((3.0 - lo[0]) - (hi[0] - 3.0)).abs() < 1e-10);
        assert!((hi[0] - 3.0 - 1.959964).abs() < 1e-4);
    }
}
